//! The pattern grammar and the two match constructs.
//!
//! ```text
//! match-test    ::= subject 'match' pattern ('if' guard)?
//! match-select  ::= subject 'match' 'constexpr'? ('->' type)? '{' arm+ '}'
//! arm           ::= pattern ('if' guard)? '=>' action ';'
//! ```
//!
//! Pattern nodes are written once by the parser. Checking produces a separate
//! annotated tree keyed by [`PatternId`]; these nodes stay untouched.

use crate::{ExprId, Name, ParsedType, PatternId, Span};

use super::PatternRange;

/// One node of the pattern grammar.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Pattern {
    pub kind: PatternKind,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum PatternKind {
    /// `_`
    Wildcard,
    /// Any expression; compared for equality with the subject.
    Expression(ExprId),
    /// `let name`. `decomposed` is set when the binding is a direct element
    /// of a decomposition and therefore names the element itself.
    Binding { name: Name, decomposed: bool },
    /// `( pattern )`. Never wraps an `Expression` pattern: `(expr)` parses as
    /// an expression pattern instead.
    Paren(PatternId),
    /// `?pattern`, `??pattern`, ...
    Optional { sub: PatternId, depth: u32 },
    /// `Type: pattern` or `Constraint: pattern`.
    Alternative {
        discriminant: ParsedType,
        sub: PatternId,
    },
    /// `[p0, p1, ...]`, or `let [a, b]` when `binding_only`.
    Decomposition {
        elements: PatternRange,
        binding_only: bool,
    },
}

impl PatternKind {
    /// Short name for diagnostics and tracing.
    pub fn describe(&self) -> &'static str {
        match self {
            PatternKind::Wildcard => "wildcard",
            PatternKind::Expression(_) => "expression pattern",
            PatternKind::Binding { .. } => "binding",
            PatternKind::Paren(_) => "parenthesized pattern",
            PatternKind::Optional { .. } => "optional pattern",
            PatternKind::Alternative { .. } => "alternative pattern",
            PatternKind::Decomposition { .. } => "decomposition",
        }
    }

    pub fn is_binding(&self) -> bool {
        matches!(self, PatternKind::Binding { .. })
    }
}

/// Guard attached to a match-test or an arm.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Guard {
    /// `if expr`
    Expr(ExprId),
    /// `if (T name = init)`: declares `name`, whose truth value is the guard.
    Decl {
        ty: ParsedType,
        name: Name,
        init: ExprId,
        span: Span,
    },
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum JumpKind {
    Return,
    Break,
    Continue,
}

impl JumpKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            JumpKind::Return => "return",
            JumpKind::Break => "break",
            JumpKind::Continue => "continue",
        }
    }
}

/// What an arm does once it is selected.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Action {
    /// `=> expr;` produces the value of the construct.
    Value(ExprId),
    /// `=> return expr;`, `=> break;`, `=> continue;` leave the construct.
    Jump {
        kind: JumpKind,
        value: Option<ExprId>,
        span: Span,
    },
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MatchArm {
    pub pattern: PatternId,
    pub guard: Option<Guard>,
    pub action: Action,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MatchSelect {
    pub is_constexpr: bool,
    /// Explicit `-> T`; deduced across arms when absent.
    pub result: Option<ParsedType>,
    pub arms: Vec<MatchArm>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum MatchForm {
    Test {
        pattern: PatternId,
        guard: Option<Guard>,
    },
    Select(MatchSelect),
}

/// A `subject match ...` construct.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MatchExpr {
    pub subject: ExprId,
    pub form: MatchForm,
    pub span: Span,
}
