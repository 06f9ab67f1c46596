//! Semantic checking of `match` constructs.
//!
//! Given a parsed match-test or match-select, this crate:
//!
//! 1. binds the subject once into a holding entity,
//! 2. walks each pattern against that subject, resolving which runtime
//!    protocol an alternative or decomposition uses,
//! 3. checks guards and arm actions and unifies the result type,
//! 4. decides how long the holding entity and bindings live.
//!
//! The output is a [`CheckedMatch`]: a tree of resolved nodes whose
//! [`Step`]s (declarations and boolean tests, in evaluation order) are what
//! decision lowering consumes.
//!
//! Types, declarations and expression construction belong to the embedding
//! language and are reached through the [`Probe`] and [`Host`] traits.
//! Candidate protocols are probed with read-only [`Probe`] calls; only the
//! winning candidate touches the host mutably.

mod binder;
mod check;
mod checked;
mod construct;
mod context;
mod error;
mod host;
mod lifetime;
mod options;
mod protocol;
mod result_type;

#[cfg(test)]
mod test_helpers;

pub use binder::Subject;
pub use checked::{
    CheckedAction, CheckedArm, CheckedElement, CheckedForm, CheckedGuard, CheckedMatch,
    CheckedNode, CheckedPattern, DecompositionProtocol, DowncastVia, Resolution, Step,
};
pub use construct::check_match;
pub use error::MatchError;
pub use host::{Discriminant, ExprInfo, Host, HostError, Probe, SizeProbe, ValueCategory};
pub use lifetime::{condition_match, LifetimePlan, LifetimeScope, MatchPosition};
pub use options::{FallthroughPolicy, MatchOptions};
pub use result_type::ResultTypeDeducer;
