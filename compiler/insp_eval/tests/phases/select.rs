//! Match-select: arm order, guards, fallthrough and arm actions.

use pretty_assertions::assert_eq;

use insp_diagnostic::ErrorCode;
use insp_eval::Value;
use insp_sema::{FallthroughPolicy, MatchOptions};

use crate::common::{compile_errors, run, run_err, run_int, run_with};

const CLASSIFY: &str = "
fn classify(int x) -> int {
    return x match {
        1 if false => 10;
        1 => 20;
        2 if (int doubled = x * 2) => doubled;
        _ => -1;
    };
}";

fn classify(x: i64) -> Value {
    run(CLASSIFY, "classify", vec![Value::Int(x)]).result.unwrap()
}

const DECOMPOSE: &str = "
fn decompose(int[2] v) -> int {
    return v match {
        [0, 0] => -1;
        [let x, 0] => x * 2;
        [0, let y] => y * 4;
        let [x, y] => x * y;
    };
}";

fn decompose(a: i64, b: i64) -> i64 {
    run_int(&format!(
        "{DECOMPOSE}
        fn main() -> int {{ int[2] v = [{a}, {b}]; return decompose(v); }}"
    ))
}

#[test]
fn decomposition_arms_are_tried_in_order() {
    assert_eq!(decompose(0, 0), -1);
    assert_eq!(decompose(1, 0), 2);
    assert_eq!(decompose(0, 5), 20);
    assert_eq!(decompose(2, 3), 6);
}

#[test]
fn failed_guard_falls_through_to_the_next_arm() {
    assert_eq!(classify(1), Value::Int(20));
}

#[test]
fn guard_declarations_are_visible_to_the_action() {
    assert_eq!(classify(2), Value::Int(4));
}

#[test]
fn final_wildcard_catches_the_rest() {
    assert_eq!(classify(7), Value::Int(-1));
}

#[test]
fn subject_is_evaluated_once() {
    let outcome = run(
        "fn next() -> int { print(3); return 3; }
         fn main() -> int {
             return next() match { 1 => 10; 2 => 20; 3 => 30; _ => 0; };
         }",
        "main",
        Vec::new(),
    );
    assert_eq!(outcome.result, Ok(Value::Int(30)));
    assert_eq!(outcome.output, ["3"]);
}

#[test]
fn arms_after_the_winner_are_not_evaluated() {
    let outcome = run(
        "fn probe(int v) -> int { print(v); return v; }
         fn main() -> int {
             return 2 match { probe(1) => 1; probe(2) => 2; probe(3) => 3; _ => 0; };
         }",
        "main",
        Vec::new(),
    );
    assert_eq!(outcome.result, Ok(Value::Int(2)));
    assert_eq!(outcome.output, ["1", "2"]);
}

#[test]
fn no_matching_arm_traps() {
    assert_eq!(
        run_err("fn main() -> int { int x = 3; return x match { 1 => 10; 2 => 20; }; }"),
        ErrorCode::E6020
    );
}

#[test]
fn unreachable_policy_reports_an_internal_error() {
    let outcome = run_with(
        "fn main() -> int { int x = 3; return x match { 1 => 10; }; }",
        "main",
        Vec::new(),
        MatchOptions::default().with_fallthrough(FallthroughPolicy::Unreachable),
    );
    assert_eq!(outcome.result.unwrap_err().code(), ErrorCode::E9001);
}

#[test]
fn result_types_unify_to_the_first_arm() {
    let source = "
        fn main() -> double {
            int x = 2;
            return x match { 1 => 0.5; 2 => 7; _ => 0.0; };
        }";
    assert_eq!(run(source, "main", Vec::new()).result, Ok(Value::Double(7.0)));
}

#[test]
fn explicit_result_type_converts_every_arm() {
    let source = "
        fn main() -> int {
            char c = 'b';
            long code = c match -> long { 'a' => 1; 'b' => true; _ => 0; };
            return code;
        }";
    assert_eq!(run_int(source), 1);
}

#[test]
fn conflicting_arm_types_are_rejected() {
    assert_eq!(
        compile_errors("fn main() -> int { return 1 match { 1 => 1; _ => nullptr; }; }"),
        [ErrorCode::E3060]
    );
}

#[test]
fn arms_may_break_out_of_the_enclosing_loop() {
    let source = "
        fn main() -> int {
            int n = 4;
            int total = 0;
            while (true) {
                n match { 0 => break; _ => total = total + n; };
                n = n - 1;
            }
            return total;
        }";
    assert_eq!(run_int(source), 10);
}

#[test]
fn arms_may_continue_the_enclosing_loop() {
    let source = "
        fn main() -> int {
            int n = 0;
            int odd = 0;
            while (n < 6) {
                n = n + 1;
                (n % 2) match { 0 => continue; _ => odd = odd + 1; };
            }
            return odd;
        }";
    assert_eq!(run_int(source), 3);
}

#[test]
fn arms_may_return_from_the_function() {
    let source = "
        fn sign(int x) -> int {
            x match { 0 => return 100; _ => print(x); };
            return x;
        }";
    assert_eq!(run(source, "sign", vec![Value::Int(0)]).result, Ok(Value::Int(100)));
    let outcome = run(source, "sign", vec![Value::Int(5)]);
    assert_eq!(outcome.result, Ok(Value::Int(5)));
    assert_eq!(outcome.output, ["5"]);
}

#[test]
fn constexpr_select_picks_the_constant_arm() {
    let source = "
        fn main() -> int {
            const int k = 3;
            return k match constexpr { 1 => 10; 3 => 30; _ => 0; };
        }";
    assert_eq!(run_int(source), 30);
}

#[test]
fn constexpr_select_needs_constant_arms() {
    assert_eq!(
        compile_errors(
            "fn main(int x) -> int { return x match constexpr { 1 => 1; _ => 0; }; }"
        ),
        [ErrorCode::E3080]
    );
}

#[test]
fn dependent_subjects_fail_at_run_time() {
    let source = "fn f(auto v) -> int { return v match { [let a, let b] => 1; _ => 0; }; }";
    let outcome = run(source, "f", vec![Value::Int(1)]);
    assert_eq!(outcome.result.unwrap_err().code(), ErrorCode::E6006);
}
