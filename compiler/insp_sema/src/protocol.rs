//! Protocol resolution for alternative and decomposition patterns.
//!
//! Resolution is split in two phases. *Probing* asks only read-only
//! [`Probe`](crate::Probe) questions and yields a candidate; *committing*
//! builds the candidate's declarations and conditions through the
//! [`Host`](crate::Host). A rejected probe therefore creates nothing, and the
//! committed choice is never revisited.

mod alternative;
mod decomposition;

pub(crate) use alternative::check_alternative;
pub(crate) use decomposition::check_decomposition;

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
