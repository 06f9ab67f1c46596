//! Explicit checking context threaded through every recursive call.

use insp_ir::{DeclId, PatternArena};

use crate::MatchOptions;

pub(crate) struct CheckCx<'a> {
    pub patterns: &'a PatternArena,
    pub options: &'a MatchOptions,
    /// Declarations created for this construct, in creation order.
    declared: Vec<DeclId>,
    deferred: bool,
}

impl<'a> CheckCx<'a> {
    pub fn new(patterns: &'a PatternArena, options: &'a MatchOptions) -> Self {
        CheckCx {
            patterns,
            options,
            declared: Vec::new(),
            deferred: false,
        }
    }

    pub fn record(&mut self, decl: DeclId) {
        self.declared.push(decl);
    }

    pub fn defer(&mut self) {
        self.deferred = true;
    }

    pub fn is_deferred(&self) -> bool {
        self.deferred
    }

    pub fn into_declared(self) -> Vec<DeclId> {
        self.declared
    }
}
