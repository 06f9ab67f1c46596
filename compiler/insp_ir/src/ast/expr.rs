//! Expression nodes.

use crate::{DeclId, ExprId, MatchId, Name, Span, TyId};

use super::{BinaryOp, ExprRange, UnaryOp};

/// Expression node.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

/// How a protocol accessor is reached: a member of the subject's type, or a
/// free function found through the subject's associated namespace.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AccessStyle {
    Member,
    Free,
}

/// Expression variants.
///
/// The first group is surface syntax produced by the parser. The second group
/// is never written by users: the match checker asks its host to build these
/// while resolving patterns, and the host's evaluator gives them meaning.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    /// Integer literal.
    Int(i64),
    /// Float literal (stored as bits for Hash).
    Float(u64),
    Bool(bool),
    Char(char),
    /// `nullptr`
    NullPtr,
    Ident(Name),
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    /// `target = value`
    Assign {
        target: ExprId,
        value: ExprId,
    },
    /// `callee(args)`, including constructor calls `Type(args)`.
    Call {
        callee: ExprId,
        args: ExprRange,
    },
    /// `base.field` or `base->field`.
    Field {
        base: ExprId,
        field: Name,
        arrow: bool,
    },
    /// `base[index]`
    Index {
        base: ExprId,
        index: ExprId,
    },
    /// `base.*member` or `base->*member`.
    MemberPtr {
        base: ExprId,
        member: ExprId,
        arrow: bool,
    },
    /// `[a, b, c]`
    ArrayLit(ExprRange),
    /// `(inner)`. Kept in the tree: whether a match construct is wrapped in
    /// parentheses decides the lifetime of its holding entity.
    Paren(ExprId),
    Match(MatchId),

    // Synthesized during match checking
    /// Reference to a host declaration.
    DeclRef(DeclId),
    /// Contextual conversion to `bool`.
    Truth(ExprId),
    /// Runtime discriminant of a closed sum: `subject.index()` or `index(subject)`.
    Discriminant {
        subject: ExprId,
        style: AccessStyle,
    },
    /// Indexed protocol element: `subject.get<I>()` or `get<I>(subject)`.
    Element {
        subject: ExprId,
        index: u32,
        style: AccessStyle,
    },
    /// The `index`-th data member of an aggregate.
    FieldAt {
        base: ExprId,
        index: u32,
    },
    /// Checked downcast of a pointer; yields null on failure.
    Downcast {
        operand: ExprId,
        target: TyId,
    },
    /// User `try_cast<target>(operand)` customization point.
    TryCast {
        operand: ExprId,
        target: TyId,
    },
    /// Implicit conversion to a unified result type.
    Convert {
        value: ExprId,
        to: TyId,
    },
    /// Placeholder after a parse error.
    Error,
}

impl ExprKind {
    /// Short name for diagnostics and tracing.
    pub fn describe(&self) -> &'static str {
        match self {
            ExprKind::Int(_) => "integer literal",
            ExprKind::Float(_) => "float literal",
            ExprKind::Bool(_) => "boolean literal",
            ExprKind::Char(_) => "character literal",
            ExprKind::NullPtr => "nullptr",
            ExprKind::Ident(_) => "identifier",
            ExprKind::Unary { .. } => "unary expression",
            ExprKind::Binary { .. } => "binary expression",
            ExprKind::Assign { .. } => "assignment",
            ExprKind::Call { .. } => "call",
            ExprKind::Field { .. } => "member access",
            ExprKind::Index { .. } => "subscript",
            ExprKind::MemberPtr { .. } => "member pointer access",
            ExprKind::ArrayLit(_) => "array literal",
            ExprKind::Paren(_) => "parenthesized expression",
            ExprKind::Match(_) => "match expression",
            ExprKind::DeclRef(_) => "declaration reference",
            ExprKind::Truth(_) => "boolean test",
            ExprKind::Discriminant { .. } => "discriminant",
            ExprKind::Element { .. } => "element access",
            ExprKind::FieldAt { .. } => "aggregate member",
            ExprKind::Downcast { .. } => "downcast",
            ExprKind::TryCast { .. } => "try_cast",
            ExprKind::Convert { .. } => "conversion",
            ExprKind::Error => "error",
        }
    }
}
