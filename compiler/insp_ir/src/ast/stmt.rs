//! Statements and items of the host language.

use crate::{ExprId, Name, ParsedType, Span, StmtId};

use super::StmtRange;

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum StmtKind {
    /// `T name = init;` or `T name;`
    Local {
        ty: ParsedType,
        name: Name,
        init: Option<ExprId>,
    },
    Expr(ExprId),
    If {
        cond: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    },
    While {
        cond: ExprId,
        body: StmtId,
    },
    Return(Option<ExprId>),
    Break,
    Continue,
    Block(StmtRange),
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Param {
    pub ty: ParsedType,
    pub name: Name,
    pub span: Span,
}

/// `fn name(T a, U b) -> R { ... }`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Function {
    pub name: Name,
    pub params: Vec<Param>,
    pub ret: ParsedType,
    pub body: StmtId,
    pub span: Span,
}
