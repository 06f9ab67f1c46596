//! Lifetime of the holding entity and of pattern declarations.
//!
//! A match construct that is the entire, unparenthesized condition of an
//! `if` or `while` keeps its holding entity and bindings alive for the whole
//! statement, like a condition declaration. In any other position,
//! including a redundant pair of parentheses around the construct, they die
//! at the end of the full expression even when the match succeeded.

use insp_ir::{DeclId, ExprArena, ExprId, ExprKind, MatchId};

/// Where a match construct appears.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MatchPosition {
    /// The whole condition of an `if` or `while`.
    Condition,
    /// Anywhere else.
    Nested,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LifetimeScope {
    /// Destroyed at the end of the enclosing full expression.
    FullExpression,
    /// Destroyed when the enclosing `if`/`while` statement completes.
    Branch,
}

/// Which declarations a construct created and how long they live.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct LifetimePlan {
    pub scope: LifetimeScope,
    /// Holding entity first, then every pattern and guard declaration in
    /// creation order.
    pub decls: Vec<DeclId>,
}

impl LifetimePlan {
    pub fn new(position: MatchPosition, decls: Vec<DeclId>) -> Self {
        let scope = match position {
            MatchPosition::Condition => LifetimeScope::Branch,
            MatchPosition::Nested => LifetimeScope::FullExpression,
        };
        LifetimePlan { scope, decls }
    }

    pub fn is_extended(&self) -> bool {
        self.scope == LifetimeScope::Branch
    }
}

/// The match construct that forms the whole condition `cond`, if any.
///
/// `x match p` qualifies; `(x match p)`, `!(x match p)` and
/// `x match p && y` do not.
pub fn condition_match(exprs: &ExprArena, cond: ExprId) -> Option<MatchId> {
    match exprs.kind(cond) {
        ExprKind::Match(id) => Some(*id),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
