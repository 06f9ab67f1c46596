//! Decision lowering.
//!
//! Turns a [`CheckedMatch`](insp_sema::CheckedMatch) into explicit control
//! flow: a handful of basic blocks whose instructions initialize
//! declarations, record the construct's result, and whose terminators branch
//! on the synthesized tests.
//!
//! Every `Test` step of a pattern becomes its own [`Terminator::Branch`], so
//! evaluation stops at the first failing test and later declarations of the
//! same attempt never exist. A match-test ends in a [`Instr::Flag`]; each
//! match-select arm falls through to the next arm's first block, and the
//! last one falls into a [`Terminator::NoMatch`] (or `Unreachable`, per
//! [`FallthroughPolicy`](insp_sema::FallthroughPolicy)).

mod builder;
mod error;
mod ir;
mod lower;

pub use builder::LowerBuilder;
pub use error::LowerError;
pub use ir::{Block, BlockId, Instr, LoweredMatch, Terminator};
pub use lower::lower_match;
