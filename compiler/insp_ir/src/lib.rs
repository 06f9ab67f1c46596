//! Intermediate representation shared by every Inspect compiler phase.
//!
//! - **Intern everything**: identifiers become [`Name`]s.
//! - **Flatten everything**: expressions, statements and patterns live in
//!   arenas and refer to each other through `u32` ids.
//! - **Opaque host handles**: [`TyId`], [`DeclId`] and [`ConstraintId`] are
//!   minted by whichever host owns the type system; the pattern compiler only
//!   passes them around.
//!
//! The pattern model ([`Pattern`], [`MatchExpr`]) is built once by the parser
//! and read by the checker and lowering; nothing mutates it afterwards.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

pub mod ast;
mod ids;
mod interner;
mod name;
mod parsed_type;
mod span;

pub use ast::{
    AccessStyle, Action, BinaryOp, Expr, ExprArena, ExprKind, ExprRange, Function, Guard, JumpKind,
    MatchArm, MatchExpr, MatchForm, MatchSelect, Param, ParsedModule, Pattern, PatternArena,
    PatternKind, PatternRange, Stmt, StmtArena, StmtKind, StmtRange, UnaryOp,
};
pub use ids::{ConstraintId, DeclId, ExprId, MatchId, PatternId, StmtId, TyId};
pub use interner::{InternError, StringInterner};
pub use name::Name;
pub use parsed_type::ParsedType;
pub use span::{Span, SpanError};

static_assert_size!(Span, 8);
static_assert_size!(Name, 4);
static_assert_size!(ExprId, 4);
