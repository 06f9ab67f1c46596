//! Runtime errors of the reference interpreter.
//!
//! `return`, `break` and `continue` travel as errors too: they unwind
//! through nested evaluation until the function call or loop that handles
//! them.

use insp_diagnostic::{Diagnostic, ErrorCode};
use insp_ir::Span;

use crate::eval::Value;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("read through a reference to an object whose lifetime has ended")]
    DanglingReference { span: Span },

    #[error("`{name}` is used before it was initialized")]
    Uninitialized { name: String, span: Span },

    #[error("null pointer dereference")]
    NullDereference { span: Span },

    #[error("division by zero")]
    DivisionByZero { span: Span },

    #[error("index {index} is out of bounds for length {len}")]
    IndexOutOfBounds { index: i64, len: usize, span: Span },

    #[error("alternative {requested} is not active; the active alternative is {active}")]
    InactiveAlternative {
        requested: u32,
        active: u32,
        span: Span,
    },

    #[error("access to the value of an empty box or optional")]
    EmptyBox { span: Span },

    #[error("match construct was never instantiated with a concrete subject type")]
    Deferred { span: Span },

    #[error("no arm of the match matched")]
    NoArmMatched { span: Span },

    #[error("unknown function `{name}`")]
    UnknownFunction { name: String },

    #[error("reached a path lowered as unreachable")]
    Unreachable { span: Span },

    #[error("internal error: {message}")]
    Internal { message: String, span: Span },

    // Control flow
    #[error("`return` escaped its function")]
    Return(Value),

    #[error("`break` escaped its loop")]
    Break,

    #[error("`continue` escaped its loop")]
    Continue,
}

impl EvalError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EvalError::DanglingReference { .. } => ErrorCode::E6001,
            EvalError::Uninitialized { .. } => ErrorCode::E6002,
            EvalError::NullDereference { .. } => ErrorCode::E6003,
            EvalError::DivisionByZero { .. } => ErrorCode::E6004,
            EvalError::IndexOutOfBounds { .. } => ErrorCode::E6005,
            EvalError::Deferred { .. } => ErrorCode::E6006,
            EvalError::InactiveAlternative { .. } | EvalError::EmptyBox { .. } => ErrorCode::E6007,
            EvalError::NoArmMatched { .. } => ErrorCode::E6020,
            EvalError::UnknownFunction { .. } => ErrorCode::E6030,
            EvalError::Unreachable { .. }
            | EvalError::Internal { .. }
            | EvalError::Return(_)
            | EvalError::Break
            | EvalError::Continue => ErrorCode::E9001,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            EvalError::DanglingReference { span }
            | EvalError::Uninitialized { span, .. }
            | EvalError::NullDereference { span }
            | EvalError::DivisionByZero { span }
            | EvalError::IndexOutOfBounds { span, .. }
            | EvalError::InactiveAlternative { span, .. }
            | EvalError::EmptyBox { span }
            | EvalError::Deferred { span }
            | EvalError::NoArmMatched { span }
            | EvalError::Unreachable { span }
            | EvalError::Internal { span, .. } => Some(*span),
            EvalError::UnknownFunction { .. }
            | EvalError::Return(_)
            | EvalError::Break
            | EvalError::Continue => None,
        }
    }

    /// Is this a `return`, `break` or `continue` in flight?
    pub fn is_control_flow(&self) -> bool {
        matches!(
            self,
            EvalError::Return(_) | EvalError::Break | EvalError::Continue
        )
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        let diag = Diagnostic::error(self.code()).with_message(self.to_string());
        let diag = match self.span() {
            Some(span) => diag.with_label(span, "while evaluating this"),
            None => diag,
        };
        match self {
            EvalError::DanglingReference { .. } => diag.with_note(
                "a match construct wrapped in parentheses does not extend the lifetime of its subject",
            ),
            EvalError::NoArmMatched { .. } => {
                diag.with_note("add a final `_` arm to make the match exhaustive")
            }
            _ => diag,
        }
    }
}

#[cfg(test)]
mod tests;
