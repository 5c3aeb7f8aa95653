/// Which moves are filtered for leaving the mover's own king attacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelfCheckPolicy {
    /// Only king moves are filtered. A pinned piece may still move away.
    #[default]
    KingOnly,
    /// Every move is filtered, so no move may expose the mover's king.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineConfig {
    pub self_check: SelfCheckPolicy,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_self_check(&mut self, policy: SelfCheckPolicy) {
        self.self_check = policy;
    }

    pub fn with_self_check(mut self, policy: SelfCheckPolicy) -> Self {
        self.set_self_check(policy);
        self
    }

    pub fn is_strict(&self) -> bool {
        self.self_check == SelfCheckPolicy::Strict
    }
}
