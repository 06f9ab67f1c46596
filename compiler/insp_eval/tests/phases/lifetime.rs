//! Storage of the holding variable and bindings.

use pretty_assertions::assert_eq;

use insp_diagnostic::ErrorCode;
use insp_eval::Value;

use crate::common::{compile_errors, run, run_err, run_int};

const PAIR: &str = "fn pair() -> Pair { return Pair(7, 1); }";
const SLOT: &str = "fn slot() -> Slot { return Slot(MaybeInt(7), 101); }";

#[test]
fn condition_match_extends_the_subject_to_the_statement() {
    let source = format!(
        "{PAIR}
        fn main() -> int {{
            if (pair() match [let b, 1]) return b;
            return 0;
        }}"
    );
    assert_eq!(run_int(&source), 7);
}

#[test]
fn parenthesized_condition_ends_with_the_full_expression() {
    let source = format!(
        "{PAIR}
        fn main() -> int {{
            if ((pair() match [let b, 1])) return b;
            return 0;
        }}"
    );
    assert_eq!(run_err(&source), ErrorCode::E6001);
}

#[test]
fn optional_binding_into_a_temporary_lives_through_the_branch() {
    let source = format!(
        "{SLOT}
        fn main() -> int {{
            if (slot() match [?let b, 101]) return b;
            return 0;
        }}"
    );
    assert_eq!(run_int(&source), 7);
}

#[test]
fn optional_binding_into_a_temporary_dangles_when_parenthesized() {
    let source = format!(
        "{SLOT}
        fn main() -> int {{
            if ((slot() match [?let b, 101])) return b;
            return 0;
        }}"
    );
    assert_eq!(run_err(&source), ErrorCode::E6001);
}

#[test]
fn empty_optional_fails_the_test() {
    let source = "
        fn main() -> int {
            if (Slot(MaybeInt(), 101) match [?let b, 101]) return b;
            return -1;
        }";
    assert_eq!(run_int(source), -1);
}

#[test]
fn bindings_are_not_visible_where_the_match_failed() {
    let else_branch = "
        fn main() -> int {
            Pair p = Pair(1, 2);
            if (p match [5, let y]) { return 0; } else { return y; }
        }";
    assert_eq!(compile_errors(else_branch), [ErrorCode::E2002]);

    let after_statement = "
        fn main() -> int {
            int x = 3;
            bool r = x match let y;
            return y;
        }";
    assert_eq!(compile_errors(after_statement), [ErrorCode::E2002]);
}

#[test]
fn while_condition_bindings_are_fresh_each_iteration() {
    let source = "
        fn main() -> int {
            int i = 0;
            int sum = 0;
            while (i match let n) {
                sum = sum + n;
                i = i + 1;
                if (i match 4) break;
            }
            return sum;
        }";
    assert_eq!(run_int(source), 6);
}

#[test]
fn alias_bindings_see_later_writes() {
    let source = "
        fn main() -> int {
            Pair p = Pair(1, 2);
            if (p match [let a, let b]) {
                p.first = 10;
                return a + b;
            }
            return 0;
        }";
    assert_eq!(run_int(source), 12);
}

#[test]
fn owned_subject_is_a_copy() {
    let source = "
        fn main() -> int {
            int x = 3;
            if ((x + 0) match let y) {
                x = 40;
                return y;
            }
            return 0;
        }";
    assert_eq!(run_int(source), 3);
}

#[test]
fn returned_reference_dangles_after_the_call() {
    let source = "
        fn leak() -> int* { int local = 1; return &local; }
        fn main() -> int { int* p = leak(); return *p; }";
    let outcome = run(source, "main", Vec::new());
    assert_eq!(outcome.result.map_err(|err| err.code()), Err(ErrorCode::E6001));
}

#[test]
fn arguments_are_passed_by_value() {
    let source = "
        fn bump(Pair p) -> int { p.first = 100; return p.first; }
        fn main() -> int {
            Pair q = Pair(1, 2);
            int b = bump(q);
            return b + q.first;
        }";
    let outcome = run(source, "main", Vec::new());
    assert_eq!(outcome.result, Ok(Value::Int(101)));
}
