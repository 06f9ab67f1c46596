//! Lowered match IR.
//!
//! A [`LoweredMatch`] is a tiny control-flow graph. Blocks hold
//! [`Instr`]s that run in order and end with exactly one [`Terminator`].
//! Expressions and declarations stay opaque host handles: the IR only says
//! *when* each one is evaluated.

use std::fmt;

use insp_ir::{DeclId, ExprId, JumpKind, MatchId, Span, TyId};
use insp_sema::{LifetimePlan, LifetimeScope};

/// Basic block ID within a [`LoweredMatch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct BlockId(u32);

impl BlockId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Instr {
    /// Create the declaration and evaluate its initializer.
    Init(DeclId),
    /// Set the result of a match-test.
    Flag(bool),
    /// Evaluate the expression into the result of a match-select.
    Store(ExprId),
    /// Evaluate the expression and discard its value.
    Eval(ExprId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Terminator {
    Jump(BlockId),
    /// Continue at `then_block` when `cond` is true, else at `else_block`.
    Branch {
        cond: ExprId,
        then_block: BlockId,
        else_block: BlockId,
    },
    /// The construct is complete; its result has been recorded.
    Finish,
    /// An arm action leaves the enclosing function or loop.
    Escape {
        kind: JumpKind,
        value: Option<ExprId>,
    },
    /// No arm of a match-select matched.
    NoMatch,
    /// Control never gets here.
    Unreachable,
}

impl Terminator {
    /// Blocks control may continue at.
    pub fn successors(&self) -> Vec<BlockId> {
        match *self {
            Terminator::Jump(target) => vec![target],
            Terminator::Branch {
                then_block,
                else_block,
                ..
            } => vec![then_block, else_block],
            Terminator::Finish
            | Terminator::Escape { .. }
            | Terminator::NoMatch
            | Terminator::Unreachable => Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Block {
    pub id: BlockId,
    pub body: Vec<Instr>,
    pub terminator: Terminator,
}

/// A lowered match-test or match-select.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoweredMatch {
    pub id: MatchId,
    /// `bool` for a match-test; the unified arm type for a select.
    pub result_ty: TyId,
    /// Blocks in creation order; `blocks[entry.index()]` is the entry.
    pub blocks: Vec<Block>,
    pub entry: BlockId,
    /// Declarations the construct may create, and when they die.
    pub lifetime: LifetimePlan,
    pub span: Span,
}

impl LoweredMatch {
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }

    /// Number of `Branch` terminators, i.e. runtime tests.
    pub fn test_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|block| matches!(block.terminator, Terminator::Branch { .. }))
            .count()
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instr::Init(decl) => write!(f, "init d{}", decl.raw()),
            Instr::Flag(value) => write!(f, "flag {value}"),
            Instr::Store(expr) => write!(f, "store e{}", expr.raw()),
            Instr::Eval(expr) => write!(f, "eval e{}", expr.raw()),
        }
    }
}

impl fmt::Display for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Terminator::Jump(target) => write!(f, "jump {target}"),
            Terminator::Branch {
                cond,
                then_block,
                else_block,
            } => write!(f, "branch e{} {then_block} {else_block}", cond.raw()),
            Terminator::Finish => f.write_str("finish"),
            Terminator::Escape { kind, value } => {
                f.write_str(kind.keyword())?;
                if let Some(value) = value {
                    write!(f, " e{}", value.raw())?;
                }
                Ok(())
            }
            Terminator::NoMatch => f.write_str("no_match"),
            Terminator::Unreachable => f.write_str("unreachable"),
        }
    }
}

impl fmt::Display for LoweredMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = match self.lifetime.scope {
            LifetimeScope::FullExpression => "full-expression",
            LifetimeScope::Branch => "branch",
        };
        write!(
            f,
            "match m{} -> t{} ({scope})",
            self.id.raw(),
            self.result_ty.raw()
        )?;
        for block in &self.blocks {
            write!(f, "\n{}:", block.id)?;
            for instr in &block.body {
                write!(f, "\n    {instr}")?;
            }
            write!(f, "\n    {}", block.terminator)?;
        }
        Ok(())
    }
}
