//! The simulation driver: one tick over the whole registry.
//!
//! A tick runs in a fixed order:
//!
//! 1. purge actors flagged for deletion and free their memory records
//! 2. insert queued spawns and bind their behavior profiles
//! 3. for each actor in ascending id order: hyperspace or think, then update
//! 4. move projectiles and resolve their hits
//! 5. deliver notifications raised by the projectile pass
//!
//! The registry only changes shape in steps 1 and 2.

use serde::Serialize;
use tracing::{debug, warn};

use crate::actor::{Actor, ActorId, HyperspacePhase};
use crate::ai::BehaviorHost;
use crate::combat::weapons::FireMode;
use crate::config::SimConfig;
use crate::error::{ProfileError, SimError};
use crate::events::WorldEvent;
use crate::hyperspace;
use crate::invariants::check_invariants;
use crate::world::World;

/// Counters accumulated from the event log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventTally {
    /// Bolts and missiles launched.
    pub shots: u64,
    /// Actors destroyed.
    pub destroyed: u64,
    /// Actors disabled.
    pub disabled: u64,
    /// Actors that left through hyperspace.
    pub jumped: u64,
    /// Boardings completed.
    pub boarded: u64,
    /// Escorts launched from bays.
    pub launched: u64,
    /// Escorts docked back on their carrier.
    pub docked: u64,
    /// Distress calls.
    pub distress: u64,
    /// Messages and broadcasts.
    pub messages: u64,
}

impl EventTally {
    /// Count one event.
    pub fn record(&mut self, event: &WorldEvent) {
        match event {
            WorldEvent::WeaponFired { .. } => self.shots += 1,
            WorldEvent::Destroyed { .. } => self.destroyed += 1,
            WorldEvent::Disabled { .. } => self.disabled += 1,
            WorldEvent::Jumped { .. } => self.jumped += 1,
            WorldEvent::Boarded { .. } => self.boarded += 1,
            WorldEvent::EscortLaunched { .. } => self.launched += 1,
            WorldEvent::Docked { .. } => self.docked += 1,
            WorldEvent::Distress { .. } => self.distress += 1,
            WorldEvent::Message { .. } | WorldEvent::Broadcast { .. } => self.messages += 1,
            _ => {}
        }
    }
}

/// Summary of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimReport {
    /// World seed.
    pub seed: u64,
    /// Ticks run.
    pub ticks: u64,
    /// Simulated seconds.
    pub time: f64,
    /// Actors still in the registry.
    pub actors: usize,
    /// Player still present and alive.
    pub player_alive: bool,
    /// Player combat rating.
    pub player_rating: f64,
    /// Behavior routine faults.
    pub faults: u64,
    /// Invariant violations seen (only counted when checking is enabled).
    pub violations: u64,
    /// Event counters.
    pub events: EventTally,
}

/// A world plus the behavior host that drives it.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    host: BehaviorHost,
    config: SimConfig,
    ticks: u64,
    violations: u64,
    tally: EventTally,
}

impl Simulation {
    /// Wrap `world` and build a behavior host from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Host`] if the host limits are invalid.
    pub fn new(mut world: World, config: SimConfig) -> Result<Self, SimError> {
        let host = BehaviorHost::new(&config.host)?;
        world.escort_profile.clone_from(&config.escort_profile);
        Ok(Self { world, host, config, ticks: 0, violations: 0, tally: EventTally::default() })
    }

    /// Compile and register a behavior profile.
    ///
    /// # Errors
    ///
    /// Returns the compile or validation failure.
    pub fn load_profile(&mut self, name: &str, source: &str) -> Result<(), ProfileError> {
        self.host.load_profile(name, source).map(|_| ())
    }

    /// The world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The world, mutably. Use for player controls and event draining.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The behavior host.
    #[must_use]
    pub fn host(&self) -> &BehaviorHost {
        &self.host
    }

    /// Run configuration.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Ticks run so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Queue an NPC. It enters the registry, and its profile is bound, at
    /// the start of the next tick.
    pub fn spawn(&mut self, actor: Actor, profile: Option<&str>) -> ActorId {
        self.world.spawn(actor, profile.map(str::to_string))
    }

    /// Insert the player actor immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Registry`] if a player already exists.
    pub fn add_player(&mut self, actor: Actor) -> Result<ActorId, SimError> {
        Ok(self.world.add_player(actor)?)
    }

    /// Advance the simulation by one tick.
    pub fn tick(&mut self) {
        let dt = self.config.dt;
        let first_event = self.world.events.len();

        for id in self.world.purge_deleted() {
            self.host.forget(id);
        }
        for (id, profile) in self.world.insert_pending() {
            let Some(spec) = profile else {
                continue;
            };
            if let Err(e) = self.host.bind(&mut self.world, id, &spec) {
                warn!(actor = %id, profile = %spec, error = %e, "profile_bind_failed");
            }
        }

        for id in self.world.actors.ids() {
            self.step_actor(id, dt);
        }

        self.world.step_projectiles(dt);
        self.host.dispatch(&mut self.world);

        self.world.time += dt;
        self.ticks += 1;

        for event in &self.world.events.events()[first_event..] {
            self.tally.record(event);
        }

        if self.config.check_invariants {
            for violation in check_invariants(&self.world, &self.host) {
                warn!(tick = self.ticks, %violation, "invariant_violation");
                self.violations += 1;
            }
        }
    }

    fn step_actor(&mut self, id: ActorId, dt: f64) {
        let Some(actor) = self.world.actor(id) else {
            return;
        };
        if actor.flags.delete {
            return;
        }

        if actor.flags.hyperspace.is_departing() && !actor.is_disabled() {
            let World { actors, events, .. } = &mut self.world;
            if let Some(actor) = actors.get_mut(id) {
                if hyperspace::update(actor, events) {
                    debug!(actor = %id, "actor_jumped");
                    return;
                }
            }
        } else if actor.flags.player {
            self.apply_player_controls(id);
        } else {
            let thinks = actor.behavior.is_some()
                && !actor.is_disabled()
                && !actor.flags.logistics.boarding
                && !actor.flags.logistics.refuel_boarding;
            if let Some(actor) = self.world.actor_mut(id) {
                if actor.flags.hyperspace == HyperspacePhase::Arriving {
                    hyperspace::settle_arrival(actor);
                }
            }
            if thinks {
                self.host.think(&mut self.world, id);
            }
        }

        self.world.update_actor(id, dt);
    }

    fn apply_player_controls(&mut self, id: ActorId) {
        let controls = self.world.player_controls;
        let Some(actor) = self.world.actor_mut(id) else {
            return;
        };
        hyperspace::settle_arrival(actor);
        if actor.is_disabled() {
            return;
        }
        actor.set_controls(controls.thrust, controls.turn);
        actor.flags.afterburner = controls.afterburner && actor.afterburner.is_some();
        if controls.primary {
            self.world.fire(id, false, FireMode::All);
        } else {
            self.world.stop_firing(id, false);
        }
        if controls.secondary {
            self.world.fire(id, true, FireMode::All);
        } else {
            self.world.stop_firing(id, true);
        }
    }

    /// Run `ticks` ticks and report.
    pub fn run(&mut self, ticks: u64) -> SimReport {
        for _ in 0..ticks {
            self.tick();
        }
        self.report()
    }

    /// Summary of the run so far.
    #[must_use]
    pub fn report(&self) -> SimReport {
        SimReport {
            seed: self.config.seed,
            ticks: self.ticks,
            time: self.world.time,
            actors: self.world.actors.len(),
            player_alive: self.world.player().is_some_and(|p| !p.is_dead()),
            player_rating: self.world.player_rating,
            faults: self.host.faults(),
            violations: self.violations,
            events: self.tally,
        }
    }
}
