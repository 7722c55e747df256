//! The simulated world: the actor registry plus everything actors touch.
//!
//! [`World`] is plain data with no scripting inside. The behavior host
//! borrows it for the duration of one routine invocation and every
//! capability a routine calls goes through the methods defined here and in
//! the submodules:
//!
//! * `update`: per-actor physics, regeneration and the death countdown
//! * `combat`: hits, area explosions, firing intents
//! * `projectiles`: bolts, missiles and beams in flight
//! * `comms`: messages, broadcasts and distress calls
//! * `escort`: fighter launch, docking, escort orders
//! * `logistics`: boarding and refuelling
//! * `queries`: read-only helpers behind the script query surface

mod combat;
mod comms;
mod escort;
mod logistics;
mod projectiles;
mod queries;
mod update;

pub use combat::Intents;
pub use logistics::{BOARDING_TIME, REFUEL_RATE, REFUEL_TIME};
pub use projectiles::{Projectile, ProjectileKind};

use std::collections::VecDeque;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::actor::{Actor, ActorId};
use crate::catalog::Catalog;
use crate::error::RegistryError;
use crate::events::EventLog;
use crate::faction::{FactionTable, PLAYER_FACTION};
use crate::hyperspace::{self, Engage};
use crate::registry::Registry;
use crate::system::StarSystem;

/// Order a carrier gives its escorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscortOrder {
    /// Attack the carrier's target.
    Attack,
    /// Hold position.
    Hold,
    /// Cancel standing orders.
    Clear,
    /// Return to the carrier.
    Return,
}

impl EscortOrder {
    /// Name of the behavior routine that handles the order.
    #[must_use]
    pub const fn routine(self) -> &'static str {
        match self {
            Self::Attack => "e_attack",
            Self::Hold => "e_hold",
            Self::Clear => "e_clear",
            Self::Return => "e_return",
        }
    }
}

/// Something a behavior routine should react to. Queued while a routine runs
/// and dispatched once it has returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// `victim` was hit by `attacker`.
    Attacked {
        /// Actor that was hit.
        victim: ActorId,
        /// Shooter.
        attacker: ActorId,
    },
    /// `receiver` heard a distress call.
    Distress {
        /// Listening actor.
        receiver: ActorId,
        /// Caller.
        sender: ActorId,
        /// Caller's target at the time of the call.
        attacker: ActorId,
    },
    /// `escort` received an order from its carrier.
    Escort {
        /// Escort.
        escort: ActorId,
        /// Order.
        order: EscortOrder,
        /// Carrier's target, for attack orders.
        target: ActorId,
    },
}

/// Controls for the player actor, set by the embedding application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerControls {
    /// Thrust fraction.
    pub thrust: f64,
    /// Turn fraction.
    pub turn: f64,
    /// Fire primaries.
    pub primary: bool,
    /// Fire the selected secondary.
    pub secondary: bool,
    /// Engage the afterburner.
    pub afterburner: bool,
}

/// An actor waiting to enter the registry at the next tick boundary.
#[derive(Debug, Clone)]
pub struct SpawnRequest {
    /// The new actor, with its id already assigned.
    pub actor: Actor,
    /// Behavior profile spec (`name` or `name*param`), if any.
    pub profile: Option<String>,
}

/// Everything one simulation operates on.
#[derive(Debug)]
pub struct World {
    /// Live actors in ascending id order.
    pub actors: Registry,
    /// Static ship and outfit data.
    pub catalog: Arc<Catalog>,
    /// Faction relations.
    pub factions: FactionTable,
    /// Planets and sensor conditions.
    pub system: StarSystem,
    /// Bolts and missiles in flight.
    pub projectiles: Vec<Projectile>,
    /// Effects for the embedder.
    pub events: EventLog,
    /// Randomness for spawns, residual explosions and planet picks.
    pub rng: StdRng,
    /// Seconds simulated so far.
    pub time: f64,
    /// Player combat rating.
    pub player_rating: f64,
    /// Player input for the next tick.
    pub player_controls: PlayerControls,
    /// Profile bound to fighters launched from bays.
    pub escort_profile: String,
    notifications: VecDeque<Notification>,
    pending: Vec<SpawnRequest>,
}

impl Default for World {
    fn default() -> Self {
        Self::new(Arc::new(Catalog::default()), FactionTable::new(), StarSystem::default(), 0)
    }
}

impl World {
    /// An empty world.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, factions: FactionTable, system: StarSystem, seed: u64) -> Self {
        Self {
            actors: Registry::new(),
            catalog,
            factions,
            system,
            projectiles: Vec::new(),
            events: EventLog::default(),
            rng: StdRng::seed_from_u64(seed),
            time: 0.0,
            player_rating: 0.0,
            player_controls: PlayerControls::default(),
            escort_profile: "escort".to_string(),
            notifications: VecDeque::new(),
            pending: Vec::new(),
        }
    }

    /// Look up an actor.
    #[must_use]
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(id)
    }

    /// Look up an actor mutably.
    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(id)
    }

    /// The player actor, if present.
    #[must_use]
    pub fn player(&self) -> Option<&Actor> {
        self.actors.get(ActorId::PLAYER)
    }

    /// Queue an actor for insertion at the next tick boundary and return the
    /// id it will carry.
    pub fn spawn(&mut self, mut actor: Actor, profile: Option<String>) -> ActorId {
        let id = self.actors.allocate_id();
        actor.id = id;
        actor.target = id;
        debug!(actor = %id, name = %actor.name, "actor_spawn_queued");
        self.pending.push(SpawnRequest { actor, profile });
        id
    }

    /// Insert the player actor immediately.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::PlayerExists`] if there already is one.
    pub fn add_player(&mut self, actor: Actor) -> Result<ActorId, RegistryError> {
        self.actors.insert_player(actor)
    }

    /// Number of actors waiting to be inserted.
    #[must_use]
    pub fn pending_spawns(&self) -> usize {
        self.pending.len()
    }

    /// Move queued spawns into the registry. Returns each new id with the
    /// profile it asked for.
    pub fn insert_pending(&mut self) -> Vec<(ActorId, Option<String>)> {
        let pending = std::mem::take(&mut self.pending);
        pending
            .into_iter()
            .map(|request| {
                let id = self.actors.insert(request.actor);
                (id, request.profile)
            })
            .collect()
    }

    /// Remove actors flagged for deletion and drop references to them.
    pub fn purge_deleted(&mut self) -> Vec<ActorId> {
        let removed = self.actors.purge_deleted();
        if removed.is_empty() {
            return removed;
        }
        for actor in self.actors.iter_mut() {
            actor.escorts.retain(|e| !removed.contains(e));
            if removed.contains(&actor.target) {
                actor.target = actor.id;
            }
        }
        for id in &removed {
            debug!(actor = %id, "actor_purged");
        }
        removed
    }

    /// Start `id`'s hyperspace departure. `None` if there is no such actor.
    pub fn engage_hyperspace(&mut self, id: ActorId) -> Option<Engage> {
        let Self { actors, events, .. } = self;
        let actor = actors.get_mut(id)?;
        let result = hyperspace::engage(actor, events);
        debug!(actor = %id, ?result, "hyperspace_engage");
        Some(result)
    }

    /// Cancel `id`'s departure. Refused once the actor is in transit.
    pub fn abort_hyperspace(&mut self, id: ActorId) -> bool {
        let aborted = self.actors.get_mut(id).is_some_and(hyperspace::abort);
        if aborted {
            debug!(actor = %id, "hyperspace_aborted");
        }
        aborted
    }

    /// Queue a notification for dispatch after the running invocation.
    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push_back(notification);
    }

    /// Next queued notification.
    pub fn pop_notification(&mut self) -> Option<Notification> {
        self.notifications.pop_front()
    }

    /// Notifications waiting for dispatch.
    #[must_use]
    pub fn pending_notifications(&self) -> usize {
        self.notifications.len()
    }

    /// Whether `actor` is hostile to the player.
    #[must_use]
    pub fn is_hostile(&self, actor: &Actor) -> bool {
        let stance = actor.flags.stance;
        !stance.friendly && (stance.hostile || self.factions.are_enemies(PLAYER_FACTION, actor.faction))
    }

    /// Whether `actor` is friendly to the player.
    #[must_use]
    pub fn is_friendly(&self, actor: &Actor) -> bool {
        let stance = actor.flags.stance;
        !stance.hostile && (stance.friendly || self.factions.are_allies(PLAYER_FACTION, actor.faction))
    }

    /// Whether `b` is within sensor range of `a`.
    #[must_use]
    pub fn in_range(&self, a: &Actor, b: &Actor) -> bool {
        self.system.in_sensor_range(a.solid.pos, b.solid.pos)
    }
}
