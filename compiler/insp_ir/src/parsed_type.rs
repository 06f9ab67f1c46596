//! Types as written in source.
//!
//! The parser never resolves names; the host turns a `ParsedType` into a
//! [`TyId`](crate::TyId) (or a constraint) when the enclosing construct is
//! checked.

use crate::Name;

/// A type expression as written.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ParsedType {
    /// A named type or constraint: `int`, `Shape`, `Integral`.
    Named(Name),
    /// `T*`
    Pointer(Box<ParsedType>),
    /// `const T`
    Const(Box<ParsedType>),
    /// `T[N]`
    Array(Box<ParsedType>, u64),
    /// `auto` (deduced from the initializer).
    Auto,
}

impl ParsedType {
    /// Is this the deduced placeholder?
    pub fn is_auto(&self) -> bool {
        matches!(self, ParsedType::Auto)
    }

    /// The bare name when this is a plain named type.
    pub fn as_name(&self) -> Option<Name> {
        match self {
            ParsedType::Named(name) => Some(*name),
            _ => None,
        }
    }
}
