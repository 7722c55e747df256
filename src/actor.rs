//! Actors: every ship in the simulation, AI-driven or player-controlled.
//!
//! An [`Actor`] owns its rigid body, resource pools, outfit slots, cargo and
//! flags. Derived stats are recomputed from the hull plus equipped outfits by
//! [`Actor::recalculate_stats`] whenever the loadout changes.

mod cargo;
mod flags;
mod loadout;
mod slot;
mod solid;
mod stats;

pub use cargo::{CargoHold, CargoItem};
pub use flags::{ActorFlags, HyperspacePhase, LifePhase, Logistics, Stance};
pub use slot::{AmmoState, BeamState, Slot, SlotState};
pub use solid::Solid;
pub use stats::{Pools, ShipStats};

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ai::Behavior;
use crate::catalog::{Hull, SlotClass};
use crate::error::CargoError;
use crate::events::{EventLog, WorldEvent};
use crate::faction::FactionId;
use crate::geom::DVec2;

/// Unique actor identifier. Never reused within a simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub u32);

impl ActorId {
    /// "No target".
    pub const NONE: Self = Self(0);
    /// The player-controlled actor.
    pub const PLAYER: Self = Self(1);
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle events an external hook can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookKind {
    /// Actor destroyed.
    Death,
    /// Actor boarded.
    Board,
    /// Actor disabled.
    Disable,
    /// Actor jumped out.
    Jump,
    /// Actor hailed.
    Hail,
}

/// A registered hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hook {
    /// Trigger.
    pub kind: HookKind,
    /// Embedder's hook id.
    pub id: u32,
}

/// One ship.
#[derive(Debug, Clone)]
pub struct Actor {
    /// Unique id.
    pub id: ActorId,
    /// Display name.
    pub name: String,
    /// Faction.
    pub faction: FactionId,
    /// Ship type.
    pub hull: Arc<Hull>,
    /// Rigid body.
    pub solid: Solid,
    /// Current armour, shield, energy and fuel.
    pub pools: Pools,
    /// Derived stats.
    pub stats: ShipStats,
    /// Outfit slots, low then medium then high.
    pub slots: Vec<Slot>,
    /// Cargo hold.
    pub cargo: CargoHold,
    /// Conditions.
    pub flags: ActorFlags,
    /// Scripted behavior state; `None` for the player and inert actors.
    pub behavior: Option<Behavior>,
    /// Current target. The actor's own id means no target.
    pub target: ActorId,
    /// Selected secondary weapon slot.
    pub secondary: Option<usize>,
    /// Afterburner slot, if one is equipped.
    pub afterburner: Option<usize>,
    /// Credits carried.
    pub credits: u64,
    /// Missiles currently locked on.
    pub lockons: u32,
    /// Phase timer shared by death, hyperspace, boarding and refuelling.
    pub ptimer: f64,
    /// Countdown to the next residual explosion while dying.
    pub explosion_timer: f64,
    /// Accumulated fraction of health lost to the player, decaying over time.
    pub player_damage: f64,
    /// Registered hooks.
    pub hooks: Vec<Hook>,
    /// Escorts launched by this actor.
    pub escorts: Vec<ActorId>,
    /// Carrier this actor escorts, or `NONE`.
    pub parent: ActorId,
}

impl Actor {
    /// A fully charged actor with empty slots, flying `hull`.
    #[must_use]
    pub fn new(id: ActorId, name: impl Into<String>, faction: FactionId, hull: Arc<Hull>, pos: DVec2, vel: DVec2, dir: f64) -> Self {
        let mut slots = Vec::with_capacity(hull.slot_count());
        slots.extend((0..hull.slots.low).map(|_| Slot::new(SlotClass::Low)));
        slots.extend((0..hull.slots.medium).map(|_| Slot::new(SlotClass::Medium)));
        slots.extend((0..hull.slots.high).map(|_| Slot::new(SlotClass::High)));

        let mut actor = Self {
            id,
            name: name.into(),
            faction,
            solid: Solid::new(hull.mass, dir, pos, vel),
            pools: Pools::default(),
            stats: ShipStats::default(),
            slots,
            cargo: CargoHold::new(hull.cargo),
            flags: ActorFlags::default(),
            behavior: None,
            target: id,
            secondary: None,
            afterburner: None,
            credits: 0,
            lockons: 0,
            ptimer: 0.0,
            explosion_timer: 0.0,
            player_damage: 0.0,
            hooks: Vec::new(),
            escorts: Vec::new(),
            parent: ActorId::NONE,
            hull,
        };
        // Zero maxima make every pool ratio 1, so the actor starts full.
        actor.recalculate_stats();
        actor
    }

    /// Controlled by the player.
    #[must_use]
    pub const fn is_player(&self) -> bool {
        self.flags.player
    }

    /// Disabled or dead.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.flags.life.is_disabled()
    }

    /// Dead.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.flags.life.is_dead()
    }

    /// Has a target other than itself.
    #[must_use]
    pub fn has_target(&self) -> bool {
        self.target != self.id && self.target != ActorId::NONE
    }

    /// Armour as a percentage of max.
    #[must_use]
    pub fn armour_pct(&self) -> f64 {
        percent(self.pools.armour, self.stats.armour_max)
    }

    /// Shield as a percentage of max.
    #[must_use]
    pub fn shield_pct(&self) -> f64 {
        percent(self.pools.shield, self.stats.shield_max)
    }

    /// Apply normalised controls to the rigid body.
    ///
    /// `thrust` is clamped to `[0, 1]` and `turn` to `[-1, 1]`.
    pub fn set_controls(&mut self, thrust: f64, turn: f64) {
        self.solid.thrust = self.stats.thrust * thrust.clamp(0.0, 1.0);
        self.solid.dir_vel = self.stats.turn * turn.clamp(-1.0, 1.0);
    }

    /// Register a hook.
    pub fn add_hook(&mut self, kind: HookKind, id: u32) {
        self.hooks.push(Hook { kind, id });
    }

    /// Record every hook of `kind` in the event log.
    pub fn run_hooks(&self, kind: HookKind, events: &mut EventLog) {
        for hook in self.hooks.iter().filter(|h| h.kind == kind) {
            events.push(WorldEvent::Hook { actor: self.id, kind, hook_id: hook.id });
        }
    }

    /// Add trade cargo. Returns the tonnes actually loaded.
    pub fn add_cargo(&mut self, commodity: &str, quantity: u32) -> u32 {
        let q = self.cargo.add(commodity, quantity);
        self.update_mass();
        q
    }

    /// Remove trade cargo. Returns the tonnes actually removed.
    pub fn remove_cargo(&mut self, commodity: &str, quantity: u32) -> u32 {
        let q = self.cargo.remove(commodity, quantity);
        self.update_mass();
        q
    }

    /// Load mission cargo and return its id, or `None` if the hold is full.
    pub fn add_mission_cargo(&mut self, commodity: &str, quantity: u32) -> Option<u32> {
        let id = self.cargo.add_mission(commodity, quantity);
        self.update_mass();
        id
    }

    /// Unload mission cargo, optionally dumping it into space.
    ///
    /// # Errors
    ///
    /// Returns an error if no mission cargo with `id` is aboard.
    pub fn remove_mission_cargo(&mut self, id: u32, jettison: bool, events: &mut EventLog) -> Result<u32, CargoError> {
        let item = self.cargo.remove_mission(id)?;
        if jettison {
            events.push(WorldEvent::CargoJettisoned {
                actor: self.id,
                commodity: item.commodity,
                quantity: item.quantity,
            });
        }
        self.update_mass();
        Ok(item.quantity)
    }

    /// Dump the whole hold into space.
    pub fn jettison_all(&mut self, events: &mut EventLog) {
        for item in self.cargo.take_all() {
            events.push(WorldEvent::CargoJettisoned {
                actor: self.id,
                commodity: item.commodity,
                quantity: item.quantity,
            });
        }
        self.update_mass();
    }

    /// Average time to jump, from total mass.
    #[must_use]
    pub fn hyperspace_delay(&self) -> f64 {
        self.solid.mass.powf(1.0 / 2.5) / 5.0
    }

    /// Sale value of the hull plus everything equipped.
    #[must_use]
    pub fn worth(&self) -> u64 {
        let outfits: u64 = self
            .slots
            .iter()
            .filter_map(|s| s.outfit.as_ref())
            .map(|o| o.price)
            .sum();
        self.hull.price + outfits
    }
}

fn percent(value: f64, max: f64) -> f64 {
    if max > 0.0 { 100.0 * value / max } else { 0.0 }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::catalog::fixtures as catalog_fixtures;

    /// A fresh actor flying the fixture "Scout" hull.
    pub(crate) fn scout(id: u32) -> Actor {
        Actor::new(
            ActorId(id),
            format!("Scout {id}"),
            FactionId(1),
            Arc::new(catalog_fixtures::hull("Scout")),
            DVec2::ZERO,
            DVec2::ZERO,
            0.0,
        )
    }
}
