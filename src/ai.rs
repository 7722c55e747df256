//! Scripted pilot behavior.
//!
//! Every non-player actor may be bound to a *behavior profile*: a rhai
//! program compiled once and shared by all actors flying it. The
//! [`BehaviorHost`] owns the compiled profiles, the per-actor memory records
//! and the script engine, and runs exactly one routine at a time:
//!
//! ```text
//!   Simulation::tick ──▶ BehaviorHost::think(actor)
//!                              │
//!                              ├─ control()        when the timer expired or idle
//!                              ├─ <head task>()    when a task is queued
//!                              │      │
//!                              │      └─ capability calls ──▶ Bridge ──▶ &mut World
//!                              │
//!                              ├─ World::apply_intents
//!                              └─ dispatch queued notifications
//! ```
//!
//! Routines never see the world directly. For the duration of one call the
//! world is lent to a bridge shared with the registered capability
//! functions; a second loan while one is outstanding is refused, which is what
//! keeps invocations from nesting.

mod api;
mod bridge;
mod context;
mod memory;
mod profile;
mod scheduler;
mod task;

pub use context::{Mode, ThinkContext};
pub use memory::MemoryStore;
pub use profile::{Profile, ProfileId};
pub use scheduler::BehaviorHost;
pub use task::{Task, TaskPayload, TaskQueue};

/// Number of script timers per actor.
pub const TIMER_COUNT: usize = 2;

/// Behavior state carried by a scripted actor.
#[derive(Debug, Clone, PartialEq)]
pub struct Behavior {
    /// Bound profile.
    pub profile: ProfileId,
    /// Pending goals; the head is active.
    pub tasks: TaskQueue,
    /// Seconds until `control` must run again.
    pub control_timer: f64,
    /// Script timers set with `settimer`.
    pub timers: [f64; TIMER_COUNT],
}

impl Behavior {
    /// Fresh state: idle, with `control` due immediately.
    #[must_use]
    pub fn new(profile: ProfileId) -> Self {
        Self {
            profile,
            tasks: TaskQueue::default(),
            control_timer: 0.0,
            timers: [0.0; TIMER_COUNT],
        }
    }
}
