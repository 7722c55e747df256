//! Execution context of one routine invocation.

use std::collections::HashSet;

use crate::actor::ActorId;
use crate::world::Intents;

/// Which capabilities a routine may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Regular ticking.
    #[default]
    Normal,
    /// The `create` routine at spawn; loot capabilities are allowed.
    Create,
}

/// State of the routine currently running: whose routine it is, what it
/// has asked the actor to do so far and which unknown actors it has
/// already been warned about.
#[derive(Debug, Clone, Default)]
pub struct ThinkContext {
    /// Actor the routine belongs to.
    pub actor: ActorId,
    /// Accumulated intents.
    pub intents: Intents,
    /// Capability mode.
    pub mode: Mode,
    reported_missing: HashSet<ActorId>,
}

impl ThinkContext {
    /// Neutral context for `actor`.
    #[must_use]
    pub fn new(actor: ActorId, mode: Mode) -> Self {
        Self { actor, intents: Intents::default(), mode, reported_missing: HashSet::new() }
    }

    /// Record a reference to a missing actor. True the first time `id` is
    /// reported in this context.
    pub fn report_missing(&mut self, id: ActorId) -> bool {
        self.reported_missing.insert(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_actor_reported_once() {
        let mut ctx = ThinkContext::new(ActorId(2), Mode::Normal);
        assert!(ctx.report_missing(ActorId(40)));
        assert!(!ctx.report_missing(ActorId(40)));
        assert!(ctx.report_missing(ActorId(41)));
    }
}
