//! Match checking errors.
//!
//! Every error aborts checking of the enclosing construct. Nothing is
//! retried, so the first error is the only one reported per construct.

use insp_diagnostic::{Diagnostic, ErrorCode};
use insp_ir::Span;

use crate::HostError;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// The host rejected a subexpression (subject, expression pattern,
    /// action value).
    #[error("{0}")]
    Host(#[from] HostError),

    #[error("invalid initialization of a pattern declaration: {0}")]
    Binding(HostError),

    #[error("optional pattern nests {depth} levels; the limit is {limit}")]
    OptionalTooDeep { depth: u32, limit: u32, span: Span },

    #[error("`{ty}` is not usable as a destructuring type: {detail}")]
    ProtocolConfig {
        ty: String,
        detail: String,
        span: Span,
    },

    #[error("no alternative of `{subject}` matches `{discriminant}`")]
    NoViableAlternative {
        subject: String,
        discriminant: String,
        span: Span,
    },

    #[error("`{discriminant}` is a constraint, and `{subject}` has no closed set of alternatives")]
    PredicateWithoutType {
        subject: String,
        discriminant: String,
        span: Span,
    },

    #[error("cannot decompose `{subject}` into {arity} elements: {detail}")]
    NotDestructurable {
        subject: String,
        arity: usize,
        detail: String,
        span: Span,
    },

    #[error("guard is not convertible to `bool`: {0}")]
    GuardType(HostError),

    #[error("arm yields `{found}`, which does not agree with `{expected}`")]
    ResultConflict {
        expected: String,
        found: String,
        span: Span,
        /// Arm that fixed the deduced type, when there is one.
        baseline: Option<Span>,
    },

    #[error("invalid arm action: {0}")]
    Jump(HostError),

    #[error("arm of a `match constexpr` does not test a constant condition")]
    NonConstant { span: Span },
}

impl MatchError {
    pub fn code(&self) -> ErrorCode {
        match self {
            MatchError::Host(err) => err.code,
            MatchError::Binding(_) => ErrorCode::E3010,
            MatchError::OptionalTooDeep { .. } => ErrorCode::E3011,
            MatchError::ProtocolConfig { .. } => ErrorCode::E3020,
            MatchError::NoViableAlternative { .. } => ErrorCode::E3030,
            MatchError::PredicateWithoutType { .. } => ErrorCode::E3031,
            MatchError::NotDestructurable { .. } => ErrorCode::E3040,
            MatchError::GuardType(_) => ErrorCode::E3050,
            MatchError::ResultConflict { .. } => ErrorCode::E3060,
            MatchError::Jump(_) => ErrorCode::E3070,
            MatchError::NonConstant { .. } => ErrorCode::E3080,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            MatchError::Host(err)
            | MatchError::Binding(err)
            | MatchError::GuardType(err)
            | MatchError::Jump(err) => err.span,
            MatchError::OptionalTooDeep { span, .. }
            | MatchError::ProtocolConfig { span, .. }
            | MatchError::NoViableAlternative { span, .. }
            | MatchError::PredicateWithoutType { span, .. }
            | MatchError::NotDestructurable { span, .. }
            | MatchError::ResultConflict { span, .. }
            | MatchError::NonConstant { span } => *span,
        }
    }

    /// Convert to a diagnostic for reporting.
    pub fn into_diagnostic(self) -> Diagnostic {
        let diag = Diagnostic::error(self.code())
            .with_message(self.to_string())
            .with_label(self.span(), self.label());
        match self {
            MatchError::ResultConflict {
                baseline: Some(baseline),
                ..
            } => diag.with_secondary_label(baseline, "result type deduced from this arm"),
            MatchError::PredicateWithoutType { .. } => {
                diag.with_note("downcasting needs a concrete target type")
            }
            MatchError::NonConstant { .. } => {
                diag.with_note("every pattern and guard of a `match constexpr` must fold to a constant")
            }
            _ => diag,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            MatchError::Host(_) => "here",
            MatchError::Binding(_) => "declaration introduced here",
            MatchError::OptionalTooDeep { .. } => "optional chain",
            MatchError::ProtocolConfig { .. } | MatchError::NotDestructurable { .. } => {
                "pattern requires this protocol"
            }
            MatchError::NoViableAlternative { .. } | MatchError::PredicateWithoutType { .. } => {
                "alternative pattern"
            }
            MatchError::GuardType(_) => "guard",
            MatchError::ResultConflict { .. } => "conflicting arm",
            MatchError::Jump(_) => "action",
            MatchError::NonConstant { .. } => "non-constant arm",
        }
    }
}
