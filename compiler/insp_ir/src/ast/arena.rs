//! Arena storage for the flat syntax tree.
//!
//! Expressions are the only arena that grows after parsing: the host appends
//! the expressions it synthesizes while match constructs are checked. Patterns
//! and statements are frozen once the parser returns.

use crate::{ExprId, MatchId, PatternId, Span, StmtId};

use super::{
    Expr, ExprKind, ExprRange, Function, MatchExpr, Pattern, PatternKind, PatternRange, Stmt,
    StmtRange,
};

fn list_range<T>(list: &mut Vec<T>, items: impl IntoIterator<Item = T>) -> (u32, u16) {
    let start = list.len();
    list.extend(items);
    let len = list.len() - start;
    let start = u32::try_from(start).unwrap_or_else(|_| panic!("arena list overflow"));
    let len = u16::try_from(len).unwrap_or_else(|_| panic!("list of {len} elements too long"));
    (start, len)
}

/// Expression arena.
#[derive(Clone, Default, Debug)]
pub struct ExprArena {
    exprs: Vec<Expr>,
    lists: Vec<ExprId>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an expression.
    pub fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        let id = ExprId::from_len(self.exprs.len());
        self.exprs.push(Expr::new(kind, span));
        id
    }

    #[inline]
    pub fn get(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.exprs[id.index()].kind
    }

    #[inline]
    pub fn span(&self, id: ExprId) -> Span {
        self.exprs[id.index()].span
    }

    /// Store a list of expression ids and return its range.
    pub fn alloc_list(&mut self, ids: impl IntoIterator<Item = ExprId>) -> ExprRange {
        let (start, len) = list_range(&mut self.lists, ids);
        ExprRange::new(start, len)
    }

    pub fn list(&self, range: ExprRange) -> &[ExprId] {
        &self.lists[range.to_range()]
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}

/// Pattern and match-construct arena.
#[derive(Clone, Default, Debug)]
pub struct PatternArena {
    patterns: Vec<Pattern>,
    lists: Vec<PatternId>,
    matches: Vec<MatchExpr>,
}

impl PatternArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, kind: PatternKind, span: Span) -> PatternId {
        let id = PatternId::from_len(self.patterns.len());
        self.patterns.push(Pattern { kind, span });
        id
    }

    #[inline]
    pub fn get(&self, id: PatternId) -> &Pattern {
        &self.patterns[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: PatternId) -> &PatternKind {
        &self.patterns[id.index()].kind
    }

    pub fn alloc_list(&mut self, ids: impl IntoIterator<Item = PatternId>) -> PatternRange {
        let (start, len) = list_range(&mut self.lists, ids);
        PatternRange::new(start, len)
    }

    pub fn list(&self, range: PatternRange) -> &[PatternId] {
        &self.lists[range.to_range()]
    }

    pub fn alloc_match(&mut self, construct: MatchExpr) -> MatchId {
        let id = MatchId::from_len(self.matches.len());
        self.matches.push(construct);
        id
    }

    #[inline]
    pub fn match_expr(&self, id: MatchId) -> &MatchExpr {
        &self.matches[id.index()]
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }
}

/// Statement arena.
#[derive(Clone, Default, Debug)]
pub struct StmtArena {
    stmts: Vec<Stmt>,
    lists: Vec<StmtId>,
}

impl StmtArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId::from_len(self.stmts.len());
        self.stmts.push(stmt);
        id
    }

    #[inline]
    pub fn get(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    pub fn alloc_list(&mut self, ids: impl IntoIterator<Item = StmtId>) -> StmtRange {
        let (start, len) = list_range(&mut self.lists, ids);
        StmtRange::new(start, len)
    }

    pub fn list(&self, range: StmtRange) -> &[StmtId] {
        &self.lists[range.to_range()]
    }
}

/// Everything the parser produces for one source file.
#[derive(Clone, Default, Debug)]
pub struct ParsedModule {
    pub exprs: ExprArena,
    pub patterns: PatternArena,
    pub stmts: StmtArena,
    pub functions: Vec<Function>,
}
