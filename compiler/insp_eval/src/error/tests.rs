use pretty_assertions::assert_eq;

use super::*;

const SPAN: Span = Span::new(10, 20);

#[test]
fn runtime_errors_carry_eval_codes() {
    let cases = [
        (EvalError::DanglingReference { span: SPAN }, ErrorCode::E6001),
        (EvalError::NullDereference { span: SPAN }, ErrorCode::E6003),
        (EvalError::DivisionByZero { span: SPAN }, ErrorCode::E6004),
        (EvalError::Deferred { span: SPAN }, ErrorCode::E6006),
        (EvalError::EmptyBox { span: SPAN }, ErrorCode::E6007),
        (EvalError::NoArmMatched { span: SPAN }, ErrorCode::E6020),
    ];
    for (err, code) in cases {
        assert_eq!(err.code(), code, "{err}");
        assert!(err.code().is_eval_error());
        assert_eq!(err.span(), Some(SPAN));
    }
}

#[test]
fn control_flow_is_not_a_user_error() {
    for err in [
        EvalError::Return(Value::Int(1)),
        EvalError::Break,
        EvalError::Continue,
    ] {
        assert!(err.is_control_flow());
        assert_eq!(err.code(), ErrorCode::E9001);
        assert_eq!(err.span(), None);
    }
    assert!(!EvalError::NoArmMatched { span: SPAN }.is_control_flow());
}

#[test]
fn dangling_reference_diagnostic_explains_parentheses() {
    let diag = EvalError::DanglingReference { span: SPAN }.into_diagnostic();
    assert_eq!(diag.code, ErrorCode::E6001);
    assert_eq!(diag.primary_span(), Some(SPAN));
    assert_eq!(diag.notes.len(), 1);
    assert!(diag.notes[0].contains("parentheses"));
}

#[test]
fn unknown_function_has_no_label() {
    let diag = EvalError::UnknownFunction {
        name: "main".to_string(),
    }
    .into_diagnostic();
    assert_eq!(diag.message, "unknown function `main`");
    assert!(diag.labels.is_empty());
}

#[test]
fn inactive_alternative_message_names_both_indices() {
    let err = EvalError::InactiveAlternative {
        requested: 0,
        active: 2,
        span: SPAN,
    };
    assert_eq!(
        err.to_string(),
        "alternative 0 is not active; the active alternative is 2"
    );
}
