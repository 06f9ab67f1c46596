use insp_diagnostic::{Diagnostic, ErrorCode};
use insp_ir::Span;

/// Failure to lower a checked construct.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LowerError {
    /// Checking was deferred because the subject type is dependent; there
    /// are no conditions to branch on.
    #[error("cannot lower a match whose subject type is still dependent")]
    Deferred { span: Span },
}

impl LowerError {
    pub fn code(&self) -> ErrorCode {
        match self {
            LowerError::Deferred { .. } => ErrorCode::E3090,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            LowerError::Deferred { span } => *span,
        }
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::error(self.code())
            .with_message(self.to_string())
            .with_label(self.span(), "dependent match")
            .with_note("check the construct again once the subject type is known")
    }
}
