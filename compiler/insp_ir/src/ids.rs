//! Index newtypes.
//!
//! Syntax ids (`ExprId`, `StmtId`, `PatternId`, `MatchId`) index the parser's
//! arenas. Host ids (`TyId`, `DeclId`, `ConstraintId`) are minted by the host
//! that owns types and declarations; the pattern compiler treats them as
//! opaque tokens.

use std::fmt;

macro_rules! define_id {
    ($($(#[$meta:meta])* $name:ident;)*) => { $(
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create from a raw index.
            #[inline]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Get the raw `u32` value.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// Get the index as `usize` (for indexing into `Vec`s).
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            /// Id for the next element of a `Vec` of the given length.
            ///
            /// # Panics
            /// Panics if the arena outgrows `u32`.
            #[inline]
            pub fn from_len(len: usize) -> Self {
                Self(u32::try_from(len).unwrap_or_else(|_| {
                    panic!(concat!(stringify!($name), " space exhausted"))
                }))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    )* };
}

define_id! {
    /// Index into an [`ExprArena`](crate::ExprArena).
    ExprId;
    /// Index into a [`StmtArena`](crate::StmtArena).
    StmtId;
    /// Index into a [`PatternArena`](crate::PatternArena)'s pattern table.
    PatternId;
    /// Index into a [`PatternArena`](crate::PatternArena)'s match table.
    MatchId;
    /// Host type handle.
    TyId;
    /// Host declaration handle (holding entities, bindings, guard variables).
    DeclId;
    /// Host handle for a named type-constraint predicate.
    ConstraintId;
}
