//! Checker and lowering configuration.

/// What happens when no arm of a match-select matches.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum FallthroughPolicy {
    /// Lower to a `NoMatch` terminator, which traps at run time.
    #[default]
    Trap,
    /// Lower to `Unreachable`; the backend may assume it never happens.
    Unreachable,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct MatchOptions {
    pub fallthrough: FallthroughPolicy,
    /// Deepest `?` chain accepted in a single optional pattern.
    pub max_optional_depth: u32,
}

impl MatchOptions {
    pub const DEFAULT_MAX_OPTIONAL_DEPTH: u32 = 8;

    #[must_use]
    pub fn with_fallthrough(mut self, fallthrough: FallthroughPolicy) -> Self {
        self.fallthrough = fallthrough;
        self
    }

    #[must_use]
    pub fn with_max_optional_depth(mut self, depth: u32) -> Self {
        self.max_optional_depth = depth;
        self
    }
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatchOptions {
            fallthrough: FallthroughPolicy::default(),
            max_optional_depth: Self::DEFAULT_MAX_OPTIONAL_DEPTH,
        }
    }
}
