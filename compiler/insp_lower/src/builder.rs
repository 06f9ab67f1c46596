//! Block builder for lowered matches.
//!
//! Same shape as an LLVM `IRBuilder`: position at a block, emit
//! instructions, terminate. Blocks are numbered in creation order and the
//! entry block is always `bb0`.

use insp_ir::{DeclId, ExprId, JumpKind};

use crate::ir::{Block, BlockId, Instr, Terminator};

struct BlockBuilder {
    id: BlockId,
    body: Vec<Instr>,
    terminator: Option<Terminator>,
}

impl BlockBuilder {
    fn new(id: BlockId) -> Self {
        Self {
            id,
            body: Vec::new(),
            terminator: None,
        }
    }
}

/// Builder for the blocks of one match construct.
pub struct LowerBuilder {
    blocks: Vec<BlockBuilder>,
    current_block: BlockId,
}

impl Default for LowerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LowerBuilder {
    /// Create a builder positioned at a fresh entry block.
    pub fn new() -> Self {
        Self {
            blocks: vec![BlockBuilder::new(BlockId::new(0))],
            current_block: BlockId::new(0),
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "block indices never exceed u32"
    )]
    pub fn new_block(&mut self) -> BlockId {
        let id = BlockId::new(self.blocks.len() as u32);
        self.blocks.push(BlockBuilder::new(id));
        id
    }

    pub fn position_at(&mut self, block: BlockId) {
        debug_assert!(
            block.index() < self.blocks.len(),
            "{block} out of bounds (have {} blocks)",
            self.blocks.len(),
        );
        self.current_block = block;
    }

    #[inline]
    pub fn current_block(&self) -> BlockId {
        self.current_block
    }

    #[inline]
    pub fn entry_block(&self) -> BlockId {
        BlockId::new(0)
    }

    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.blocks[self.current_block.index()].terminator.is_some()
    }

    fn emit(&mut self, instr: Instr) {
        let block = &mut self.blocks[self.current_block.index()];
        debug_assert!(
            block.terminator.is_none(),
            "emitting into terminated block {}",
            block.id
        );
        block.body.push(instr);
    }

    pub fn emit_init(&mut self, decl: DeclId) {
        self.emit(Instr::Init(decl));
    }

    pub fn emit_flag(&mut self, value: bool) {
        self.emit(Instr::Flag(value));
    }

    pub fn emit_store(&mut self, value: ExprId) {
        self.emit(Instr::Store(value));
    }

    pub fn emit_eval(&mut self, value: ExprId) {
        self.emit(Instr::Eval(value));
    }

    fn terminate(&mut self, terminator: Terminator) {
        let block = &mut self.blocks[self.current_block.index()];
        debug_assert!(
            block.terminator.is_none(),
            "block {} already terminated",
            block.id
        );
        block.terminator = Some(terminator);
    }

    pub fn terminate_jump(&mut self, target: BlockId) {
        self.terminate(Terminator::Jump(target));
    }

    pub fn terminate_branch(&mut self, cond: ExprId, then_block: BlockId, else_block: BlockId) {
        self.terminate(Terminator::Branch {
            cond,
            then_block,
            else_block,
        });
    }

    pub fn terminate_finish(&mut self) {
        self.terminate(Terminator::Finish);
    }

    pub fn terminate_escape(&mut self, kind: JumpKind, value: Option<ExprId>) {
        self.terminate(Terminator::Escape { kind, value });
    }

    pub fn terminate_no_match(&mut self) {
        self.terminate(Terminator::NoMatch);
    }

    pub fn terminate_unreachable(&mut self) {
        self.terminate(Terminator::Unreachable);
    }

    /// Consume the builder. Unterminated blocks get `Unreachable` (with a
    /// tracing warning).
    pub fn finish(self) -> Vec<Block> {
        self.blocks
            .into_iter()
            .map(|block| {
                let terminator = block.terminator.unwrap_or_else(|| {
                    tracing::warn!(block = block.id.raw(), "unterminated block; adding Unreachable");
                    Terminator::Unreachable
                });
                Block {
                    id: block.id,
                    body: block.body,
                    terminator,
                }
            })
            .collect()
    }
}
