//! Hyperspace departure: brake, align, spin up, jump.
//!
//! ```text
//! Cruising ──engage──▶ Preparing ──aligned──▶ SpinUp ──3 s──▶ InTransit ──5 s──▶ jumped
//!                          ▲  │                  │
//!                          └──┴──── abort ───────┘
//! ```
//!
//! Abort is honoured in Preparing and SpinUp only. Arriving actors shed their
//! jump velocity and return to Cruising once below twice their top speed.

use crate::actor::{Actor, HookKind, HyperspacePhase};
use crate::combat::weapons::stop_all_beams;
use crate::events::{EventLog, SoundCue, WorldEvent};
use crate::geom::{MAX_DIR_ERR, MIN_VEL_ERR, heading_of, steer};

/// Seconds the engines take to spin up.
pub const HYPERSPACE_ENGINE_DELAY: f64 = 3.0;
/// Seconds spent accelerating into the jump.
pub const HYPERSPACE_FLY_DELAY: f64 = 5.0;
/// Fuel consumed by one jump.
pub const HYPERSPACE_FUEL: f64 = 100.0;
/// Acceleration while in transit.
pub const HYPERSPACE_THRUST: f64 = 2000.0;
/// Speed cap while in transit.
pub const HYPERSPACE_VEL: f64 = HYPERSPACE_THRUST * HYPERSPACE_FLY_DELAY;
/// Minimum distance from the system centre to start a jump.
pub const HYPERSPACE_EXIT_MIN: f64 = 1500.0;

/// Result of asking to jump.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Engage {
    /// Departure sequence started (or already running).
    Started,
    /// Too close to the system centre; carries the remaining distance.
    TooClose(f64),
    /// Not enough fuel for a jump.
    NoFuel,
}

/// Start the departure sequence. Active beams are switched off first.
pub fn engage(actor: &mut Actor, events: &mut EventLog) -> Engage {
    for slot in stop_all_beams(actor) {
        events.push(WorldEvent::BeamStopped { shooter: actor.id, slot });
    }
    if actor.flags.hyperspace.is_departing() {
        return Engage::Started;
    }
    if actor.pools.fuel < HYPERSPACE_FUEL {
        return Engage::NoFuel;
    }
    let dist = actor.solid.pos.length();
    if dist < HYPERSPACE_EXIT_MIN {
        return Engage::TooClose(HYPERSPACE_EXIT_MIN - dist);
    }
    actor.flags.hyperspace = HyperspacePhase::Preparing;
    Engage::Started
}

/// Cancel a departure. Returns true if the actor went back to cruising.
pub fn abort(actor: &mut Actor) -> bool {
    match actor.flags.hyperspace {
        HyperspacePhase::Preparing | HyperspacePhase::SpinUp => {
            actor.flags.hyperspace = HyperspacePhase::Cruising;
            true
        }
        _ => false,
    }
}

/// Advance the departure sequence by one tick. Runs in place of the
/// behavior routine while departing. Returns true when the actor jumped out.
pub fn update(actor: &mut Actor, events: &mut EventLog) -> bool {
    match actor.flags.hyperspace {
        HyperspacePhase::InTransit => {
            if actor.ptimer < 0.0 {
                actor.flags.delete = true;
                events.push(WorldEvent::Jumped { actor: actor.id });
                actor.run_hooks(HookKind::Jump, events);
                return true;
            }
            // Transit thrust bypasses the engine rating.
            actor.solid.thrust = HYPERSPACE_THRUST * actor.solid.mass;
            actor.solid.dir_vel = 0.0;
        }
        HyperspacePhase::SpinUp => {
            if actor.ptimer < 0.0 {
                actor.ptimer = HYPERSPACE_FLY_DELAY;
                actor.pools.fuel = (actor.pools.fuel - HYPERSPACE_FUEL).max(0.0);
                actor.flags.hyperspace = HyperspacePhase::InTransit;
            }
        }
        HyperspacePhase::Preparing => prepare(actor, events),
        HyperspacePhase::Cruising | HyperspacePhase::Arriving => {}
    }
    false
}

fn prepare(actor: &mut Actor, events: &mut EventLog) {
    let vel = actor.solid.vel;
    if vel.length() > MIN_VEL_ERR {
        let (turn, diff) = steer(actor.solid.dir, heading_of(vel) + std::f64::consts::PI);
        let thrust = if diff.abs() < MAX_DIR_ERR { 1.0 } else { 0.0 };
        actor.set_controls(thrust, turn);
        return;
    }
    let (turn, diff) = steer(actor.solid.dir, heading_of(actor.solid.pos));
    if diff.abs() < MAX_DIR_ERR {
        actor.set_controls(0.0, 0.0);
        actor.ptimer = HYPERSPACE_ENGINE_DELAY;
        actor.flags.hyperspace = HyperspacePhase::SpinUp;
        events.push(WorldEvent::Sound { actor: actor.id, cue: SoundCue::HyperspacePowerUp });
    } else {
        actor.set_controls(0.0, turn);
    }
}

/// Clear the arrival phase once the actor has slowed down.
pub fn settle_arrival(actor: &mut Actor) {
    if actor.flags.hyperspace == HyperspacePhase::Arriving && actor.solid.speed() < 2.0 * actor.stats.speed {
        actor.flags.hyperspace = HyperspacePhase::Cruising;
    }
}
