//! Flat syntax tree.
//!
//! - `expr`: expression nodes, including the forms the match checker
//!   synthesizes through its host
//! - `operators`: binary and unary operators
//! - `pattern`: the pattern grammar and the two match constructs
//! - `stmt`: statements, functions, modules
//! - `arena`: storage for all of the above

mod arena;
mod expr;
mod operators;
mod pattern;
mod stmt;

pub use arena::{ExprArena, ParsedModule, PatternArena, StmtArena};
pub use expr::{AccessStyle, Expr, ExprKind};
pub use operators::{BinaryOp, UnaryOp};
pub use pattern::{
    Action, Guard, JumpKind, MatchArm, MatchExpr, MatchForm, MatchSelect, Pattern, PatternKind,
};
pub use stmt::{Function, Param, Stmt, StmtKind};

/// Range into one of the arenas' flattened id lists.
macro_rules! define_range {
    ($($name:ident),* $(,)?) => { $(
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
        pub struct $name {
            pub start: u32,
            pub len: u16,
        }

        impl $name {
            pub const EMPTY: Self = Self { start: 0, len: 0 };

            #[inline]
            pub const fn new(start: u32, len: u16) -> Self {
                Self { start, len }
            }

            #[inline]
            pub const fn is_empty(&self) -> bool {
                self.len == 0
            }

            #[inline]
            pub const fn len(&self) -> usize {
                self.len as usize
            }

            #[inline]
            fn to_range(self) -> std::ops::Range<usize> {
                let start = self.start as usize;
                start..start + self.len as usize
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}({}..{})", stringify!($name), self.start, self.start + u32::from(self.len))
            }
        }
    )* };
}

define_range!(ExprRange, PatternRange, StmtRange);
