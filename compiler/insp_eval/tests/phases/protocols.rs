//! Alternatives, decomposition and optional dereference.

use pretty_assertions::assert_eq;

use insp_diagnostic::ErrorCode;
use insp_eval::Value;

use crate::common::{compile_errors, run, run_err, run_int};

#[test]
fn closed_sum_dispatches_on_the_active_alternative() {
    let source = "
        fn describe(Number n) -> int {
            return n match { int: let i => i; double: let d => 100; };
        }
        fn main() -> int { return describe(Number(4)) + describe(Number(2.5)); }";
    assert_eq!(run_int(source), 104);
}

#[test]
fn constraints_select_the_first_satisfying_alternative() {
    let source = "
        fn main() -> int {
            Number n = Number(0.25);
            return n match { Integral: _ => 1; Floating: _ => 2; };
        }";
    assert_eq!(run_int(source), 2);
}

#[test]
fn closed_sum_without_a_viable_alternative_is_rejected() {
    let errors = compile_errors("fn main(Number n) -> bool { return n match bool: _; }");
    assert!(errors.contains(&ErrorCode::E3030), "{errors:?}");
}

#[test]
fn class_hierarchy_downcasts_through_pointers() {
    let source = "
        fn area(Shape* s) -> int {
            return *s match {
                Circle: let c => c.r * c.r * 3;
                Square: let q => q.side * q.side;
                _ => 0;
            };
        }
        fn main() -> int {
            Circle c = Circle(1, 2);
            Square q = Square(2, 3);
            Shape s = Shape(3);
            return area(&c) + area(&q) + area(&s);
        }";
    assert_eq!(run_int(source), 21);
}

#[test]
fn downcast_bindings_alias_the_object() {
    let source = "
        fn main() -> int {
            Circle c = Circle(1, 2);
            Shape* s = &c;
            if (*s match Circle: let k) { k.r = 9; }
            return c.r;
        }";
    assert_eq!(run_int(source), 9);
}

#[test]
fn constraints_need_a_closed_sum() {
    let errors = compile_errors("fn main(Shape s) -> bool { return s match Integral: _; }");
    assert!(errors.contains(&ErrorCode::E3031), "{errors:?}");
}

#[test]
fn boxes_use_try_cast() {
    let source = "
        fn describe(Box b) -> int {
            return b match { int: let i => i; double: _ => -2; _ => -1; };
        }
        fn main() -> int { return describe(Box(41)) + describe(Box(1.5)) + describe(Box()); }";
    assert_eq!(run_int(source), 38);
}

#[test]
fn aggregates_decompose_by_member() {
    let source = "
        fn main() -> int {
            Pair p = Pair(3, 4);
            return p match { [1, _] => -1; [let a, 4] => a * 10; _ => 0; };
        }";
    assert_eq!(run_int(source), 30);
}

#[test]
fn tuple_likes_decompose_through_get() {
    let source = "
        fn main() -> int {
            Entry e = Entry(3, true);
            if (e match [let k, true]) return k;
            return 0;
        }";
    assert_eq!(run_int(source), 3);
}

#[test]
fn arrays_decompose_by_index() {
    let source = "
        fn main() -> int {
            int[3] xs = [1, 2, 3];
            return xs match { [1, let m, 3] => m; _ => 0; };
        }";
    assert_eq!(run_int(source), 2);
}

#[test]
fn nested_binding_decomposition() {
    let source = "
        fn main() -> int {
            Pair[2] ps = [Pair(1, 2), Pair(3, 4)];
            if (ps match let [[a, b], [c, d]]) return a + b * c + d;
            return 0;
        }";
    assert_eq!(run_int(source), 11);
}

#[test]
fn arity_mismatch_is_rejected() {
    let errors = compile_errors("fn main(Pair p) -> bool { return p match [_, _, _]; }");
    assert!(errors.contains(&ErrorCode::E3040), "{errors:?}");
}

#[test]
fn decomposition_short_circuits_left_to_right() {
    let source = "
        fn probe(int v) -> int { print(v); return v; }
        fn check(Pair p) -> bool { return p match [1, probe(6)]; }
        fn main() -> int {
            bool a = check(Pair(5, 6));
            bool b = check(Pair(1, 6));
            return a match { true => 0; _ => b match { true => 2; _ => 1; }; };
        }";
    let outcome = run(source, "main", Vec::new());
    assert_eq!(outcome.result, Ok(Value::Int(2)));
    assert_eq!(outcome.output, ["6"]);
}

#[test]
fn bit_field_bindings_are_copies() {
    let source = "
        fn main() -> int {
            Flags flags = Flags(2, 1000);
            if (flags match [let lo, let hi]) {
                flags.lo = 7;
                flags.hi = 3000;
                return lo + hi;
            }
            return 0;
        }";
    assert_eq!(run_int(source), 3002);
}

#[test]
fn bit_fields_keep_their_width() {
    assert_eq!(
        run_int("fn main() -> int { Flags g = Flags(17, 0); g.lo = g.lo + 15; return g.lo; }"),
        0
    );
}

#[test]
fn optional_pattern_skips_null() {
    let source = "
        fn test(int* p) -> bool { return p match ? 5; }
        fn main() -> int {
            int v = 5;
            bool hit = test(&v);
            bool miss = test(nullptr);
            return hit match { true => miss match { true => 2; _ => 1; }; _ => 0; };
        }";
    assert_eq!(run_int(source), 1);
}

#[test]
fn optional_chains_dereference_every_level() {
    let source = "
        fn main() -> int {
            int v = 5;
            int* p = &v;
            int** pp = &p;
            if (pp match ?? let x) return x;
            return 0;
        }";
    assert_eq!(run_int(source), 5);
}

#[test]
fn optionals_dereference_to_their_payload() {
    let source = "
        fn main() -> int {
            MaybeInt m = MaybeInt(4);
            *m = *m + 1;
            return m match { ?5 => *m * 10; _ => 0; };
        }";
    assert_eq!(run_int(source), 50);
    assert_eq!(
        run_err("fn main() -> int { MaybeInt m = MaybeInt(); return *m; }"),
        ErrorCode::E6007
    );
}

#[test]
fn runtime_errors_surface_with_codes() {
    assert_eq!(
        run_err("fn main() -> int { int* p = nullptr; return *p; }"),
        ErrorCode::E6003
    );
    assert_eq!(
        run_err("fn main() -> int { int zero = 0; return 1 / zero; }"),
        ErrorCode::E6004
    );
    assert_eq!(
        run_err("fn main() -> int { int[2] xs = [1, 2]; return xs[2]; }"),
        ErrorCode::E6005
    );
}
