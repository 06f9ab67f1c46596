//! Reference host and interpreter for `inspect` pattern matching.
//!
//! The match checker and lowering in `insp_sema`/`insp_lower` are written
//! against an abstract host language. This crate supplies one: a small
//! C-like type system ([`TypeRegistry`]), a [`ReferenceHost`] that checks
//! surface statements and implements every `Host` callback, and an
//! [`Interpreter`] that runs the result with lifetime-accurate storage.
//!
//! Types cannot be declared in source; embedders register them on a
//! [`TypeRegistry`] before compiling.
//!
//! ```text
//! source ──parse──▶ ParsedModule ──ModuleChecker──▶ CheckedModule ──Interpreter──▶ Value
//! ```

use std::sync::Once;

use insp_diagnostic::Diagnostic;
use insp_ir::StringInterner;
use insp_sema::MatchOptions;

mod checker;
mod error;
mod eval;
mod host;
mod registry;
mod types;

pub use checker::{CheckedFunction, CheckedModule, ModuleChecker};
pub use error::EvalError;
pub use eval::{Interpreter, Place, Value};
pub use host::{DeclInfo, ReferenceHost, Storage};
pub use registry::{FieldDef, TupleDef, TypeRegistry, UserKind, UserType, VariantDef};
pub use types::{TypeFlags, TypeKind, TypePool, UserId};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=insp_eval=debug`.
/// With `INSP_DUMP_LOWERED=1` every lowered construct is logged under the
/// `insp_eval::lowered` target.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

/// Parse and check `source`.
///
/// Returns every diagnostic, sorted by position, if parsing or checking
/// failed.
pub fn compile(
    source: &str,
    interner: &StringInterner,
    types: TypeRegistry,
    options: MatchOptions,
) -> Result<CheckedModule, Vec<Diagnostic>> {
    let module = insp_parse::parse(source, interner).map_err(|err| vec![err.to_diagnostic()])?;
    let (checked, diagnostics) = ModuleChecker::new(module, interner, types, options).check();
    if diagnostics.has_errors() {
        return Err(diagnostics.into_sorted());
    }
    Ok(checked)
}
