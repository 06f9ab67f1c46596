use super::*;

#[test]
fn test_diagnostic_builder() {
    let diag = Diagnostic::error(ErrorCode::E3030)
        .with_message("no viable alternative")
        .with_label(Span::new(0, 5), "here")
        .with_secondary_label(Span::new(10, 12), "subject")
        .with_note("alternatives are tried in index order");

    assert_eq!(diag.code, ErrorCode::E3030);
    assert!(diag.is_error());
    assert_eq!(diag.labels.len(), 2);
    assert!(diag.labels[0].is_primary);
    assert!(!diag.labels[1].is_primary);
    assert_eq!(diag.primary_span(), Some(Span::new(0, 5)));
}

#[test]
fn test_warning_is_not_error() {
    let diag = Diagnostic::warning(ErrorCode::E3080).with_message("w");
    assert!(!diag.is_error());
    assert_eq!(diag.primary_span(), None);
}

#[test]
fn test_diagnostic_display() {
    let diag = Diagnostic::error(ErrorCode::E1001)
        .with_message("unexpected token")
        .with_label(Span::new(0, 5), "here")
        .with_note("context");

    let output = diag.to_string();
    assert!(output.starts_with("error [E1001]: unexpected token"));
    assert!(output.contains("--> 0..5: here"));
    assert!(output.contains("= note: context"));
}
