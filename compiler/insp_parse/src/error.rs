//! Parse error type.

use insp_diagnostic::{Diagnostic, ErrorCode};
use insp_ir::{Span, SpanError};

use crate::lexer::TokenKind;

/// A parse error with location and optional context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    /// Error code for searchability.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Location of the error.
    pub span: Span,
    /// What was being parsed, for "while parsing X" notes.
    pub context: Option<&'static str>,
}

impl ParseError {
    #[cold]
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        ParseError {
            code,
            message: message.into(),
            span,
            context: None,
        }
    }

    #[must_use]
    pub fn in_context(mut self, context: &'static str) -> Self {
        self.context.get_or_insert(context);
        self
    }

    #[cold]
    pub(crate) fn unexpected(found: &TokenKind, expected: &str, span: Span) -> Self {
        Self::new(
            ErrorCode::E1001,
            format!("expected {expected}, found {}", found.display_name()),
            span,
        )
    }

    #[cold]
    pub(crate) fn expected_expression(found: &TokenKind, span: Span) -> Self {
        Self::new(
            ErrorCode::E1002,
            format!("expected expression, found {}", found.display_name()),
            span,
        )
    }

    #[cold]
    pub(crate) fn unclosed(open: &'static str, span: Span) -> Self {
        Self::new(ErrorCode::E1003, format!("unclosed `{open}`"), span)
    }

    #[cold]
    pub(crate) fn expected_identifier(found: &TokenKind, span: Span) -> Self {
        Self::new(
            ErrorCode::E1004,
            format!("expected identifier, found {}", found.display_name()),
            span,
        )
    }

    #[cold]
    pub(crate) fn expected_type(found: &TokenKind, span: Span) -> Self {
        Self::new(
            ErrorCode::E1005,
            format!("expected type, found {}", found.display_name()),
            span,
        )
    }

    #[cold]
    pub(crate) fn invalid_pattern(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorCode::E1008, message, span)
    }

    #[cold]
    pub(crate) fn invalid_guard(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorCode::E1009, message, span)
    }

    #[cold]
    pub(crate) fn invalid_character(text: &str, span: Span) -> Self {
        Self::new(
            ErrorCode::E0002,
            format!("invalid character `{text}` in source"),
            span,
        )
    }

    #[cold]
    pub(crate) fn invalid_number(text: &str, span: Span) -> Self {
        Self::new(
            ErrorCode::E0003,
            format!("invalid number literal `{text}`"),
            span,
        )
    }

    #[cold]
    pub(crate) fn unterminated_char(span: Span) -> Self {
        Self::new(ErrorCode::E0004, "unterminated character literal", span)
    }

    #[cold]
    pub(crate) fn source_too_large(err: &SpanError) -> Self {
        Self::new(ErrorCode::E9001, err.to_string(), Span::DUMMY)
    }

    /// Convert to a diagnostic for reporting.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code)
            .with_message(&self.message)
            .with_label(self.span, "here");
        match self.context {
            Some(context) => diag.with_note(format!("while parsing {context}")),
            None => diag,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ParseError {}
