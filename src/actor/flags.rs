//! Actor condition flags.
//!
//! Mutually exclusive conditions are phase enums; orthogonal ones are plain
//! booleans grouped by concern.

use serde::Serialize;

/// Health state. Transitions only move forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum LifePhase {
    /// Fully operational.
    #[default]
    Healthy,
    /// Armour below the disable threshold; drifting and non-combative.
    Disabled,
    /// Destroyed and counting down to removal.
    Dead {
        /// Death sound already emitted.
        sound_played: bool,
        /// Final explosion already emitted.
        exploded: bool,
    },
}

impl LifePhase {
    /// Disabled or dead.
    #[must_use]
    pub const fn is_disabled(self) -> bool {
        !matches!(self, Self::Healthy)
    }

    /// Dead.
    #[must_use]
    pub const fn is_dead(self) -> bool {
        matches!(self, Self::Dead { .. })
    }
}

/// Hyperspace departure and arrival phases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum HyperspacePhase {
    /// Normal flight.
    #[default]
    Cruising,
    /// Braking and aligning for the jump.
    Preparing,
    /// Engines charging.
    SpinUp,
    /// Jumping; cannot be aborted.
    InTransit,
    /// Just arrived, still shedding jump velocity.
    Arriving,
}

impl HyperspacePhase {
    /// Preparing, spinning up or in transit.
    #[must_use]
    pub const fn is_departing(self) -> bool {
        matches!(self, Self::Preparing | Self::SpinUp | Self::InTransit)
    }
}

/// Stored attitude towards the player. Hostile/friendly/neutral is derived
/// from these two bits plus faction standing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stance {
    /// Forced hostile to the player.
    pub hostile: bool,
    /// Forced friendly to the player.
    pub friendly: bool,
    /// Bribed: ignores the player.
    pub bribed: bool,
}

/// Docking, boarding and refuelling state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Logistics {
    /// Boarding the current target.
    pub boarding: bool,
    /// Has been boarded already.
    pub boarded: bool,
    /// Wants to refuel its target.
    pub refueling: bool,
    /// Docked with its target and transferring fuel.
    pub refuel_boarding: bool,
}

/// All actor conditions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActorFlags {
    /// Health state.
    pub life: LifePhase,
    /// Hyperspace phase.
    pub hyperspace: HyperspacePhase,
    /// Attitude towards the player.
    pub stance: Stance,
    /// Boarding and refuelling.
    pub logistics: Logistics,
    /// Controlled by the player.
    pub player: bool,
    /// Engaged in combat.
    pub combat: bool,
    /// Afterburner engaged.
    pub afterburner: bool,
    /// Already sent a distress call that cost the player standing.
    pub distressed: bool,
    /// Escort of another actor.
    pub escort: bool,
    /// Launched from a fighter bay.
    pub carried: bool,
    /// Ignores all damage.
    pub invincible: bool,
    /// Purge at the next tick boundary.
    pub delete: bool,
}
