//! Diagnostic system for rich error reporting.
//!
//! Every phase reports failures as a [`Diagnostic`]: a stable [`ErrorCode`],
//! a message, labeled spans and notes. Phases keep their own typed error
//! enums and convert at the boundary.

mod diagnostic;
mod error_code;
pub mod queue;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use queue::DiagnosticQueue;
