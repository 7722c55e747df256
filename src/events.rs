//! Effects the simulation asks its embedder to realise.
//!
//! Rendering, sound, mission hooks and commodity jettison all live outside
//! this crate. The simulation records what should happen as [`WorldEvent`]s;
//! an embedding application drains the log once per tick.

use serde::Serialize;

use crate::actor::{ActorId, HookKind};
use crate::geom::DVec2;

/// Sound cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    /// Ship blowing up.
    Explosion,
    /// Hyperspace engines charging.
    HyperspacePowerUp,
}

/// Something that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WorldEvent {
    /// A bolt or missile was launched.
    WeaponFired {
        /// Shooter.
        shooter: ActorId,
        /// Weapon or ammunition name.
        outfit: String,
    },
    /// A beam switched on.
    BeamStarted {
        /// Shooter.
        shooter: ActorId,
        /// Slot index.
        slot: usize,
    },
    /// A beam switched off.
    BeamStopped {
        /// Shooter.
        shooter: ActorId,
        /// Slot index.
        slot: usize,
    },
    /// A fighter left its bay.
    EscortLaunched {
        /// Carrier.
        carrier: ActorId,
        /// New escort.
        escort: ActorId,
    },
    /// A fighter returned to its bay.
    Docked {
        /// Fighter.
        escort: ActorId,
        /// Carrier.
        carrier: ActorId,
    },
    /// A sound should play.
    Sound {
        /// Source actor.
        actor: ActorId,
        /// Cue.
        cue: SoundCue,
    },
    /// A visual explosion; `radius > 0` marks a damaging blast.
    Explosion {
        /// Centre.
        pos: DVec2,
        /// Blast radius.
        radius: f64,
        /// Damage dealt at the centre.
        damage: f64,
    },
    /// Wreckage spawned.
    Debris {
        /// Centre.
        pos: DVec2,
        /// Mass of the wreck.
        mass: f64,
    },
    /// Cargo was dumped into space.
    CargoJettisoned {
        /// Former owner.
        actor: ActorId,
        /// Commodity.
        commodity: String,
        /// Tonnes.
        quantity: u32,
    },
    /// A directed message to the player.
    Message {
        /// Sender.
        from: ActorId,
        /// Recipient.
        to: ActorId,
        /// Text.
        text: String,
    },
    /// An open broadcast.
    Broadcast {
        /// Sender.
        from: ActorId,
        /// Text.
        text: String,
    },
    /// A distress call.
    Distress {
        /// Sender.
        from: ActorId,
        /// Sender's target at the time of the call.
        attacker: ActorId,
    },
    /// A registered hook should run.
    Hook {
        /// Actor the hook belongs to.
        actor: ActorId,
        /// Trigger.
        kind: HookKind,
        /// Embedder's hook id.
        hook_id: u32,
    },
    /// Actor was disabled.
    Disabled {
        /// Actor.
        actor: ActorId,
    },
    /// Actor was destroyed.
    Destroyed {
        /// Actor.
        actor: ActorId,
    },
    /// Actor left the system through hyperspace.
    Jumped {
        /// Actor.
        actor: ActorId,
    },
    /// Boarding finished.
    Boarded {
        /// Boarding actor.
        boarder: ActorId,
        /// Boarded actor.
        target: ActorId,
        /// Credits taken.
        credits: u64,
    },
    /// Fuel transfer finished.
    Refueled {
        /// Tanker.
        tanker: ActorId,
        /// Receiver.
        target: ActorId,
    },
}

/// Append-only log of world events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<WorldEvent>,
}

impl EventLog {
    /// Record an event.
    pub fn push(&mut self, event: WorldEvent) {
        self.events.push(event);
    }

    /// Events recorded since the last drain.
    #[must_use]
    pub fn events(&self) -> &[WorldEvent] {
        &self.events
    }

    /// Take all recorded events.
    pub fn drain(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// No events recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Count events matching a predicate.
    pub fn count(&self, mut pred: impl FnMut(&WorldEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}
