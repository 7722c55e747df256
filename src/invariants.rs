//! World invariants: sanity checks that detect bugs.
//!
//! None of these should ever fire in a correct simulation. They are
//! diagnostics, not gameplay rules; a violation is logged and the run
//! continues.

use crate::actor::ActorId;
use crate::ai::BehaviorHost;
use crate::world::World;

/// Slack allowed on pool bounds for floating-point drift.
pub const POOL_TOLERANCE: f64 = 1e-6;

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

fn violation(violations: &mut Vec<InvariantViolation>, message: String) {
    violations.push(InvariantViolation { message });
}

/// Check all world invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(world: &World, host: &BehaviorHost) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    if !world.actors.is_sorted() {
        violation(&mut violations, "actor registry is not strictly ascending by id".to_string());
    }

    for actor in world.actors.iter() {
        let pools = [
            ("armour", actor.pools.armour, actor.stats.armour_max),
            ("shield", actor.pools.shield, actor.stats.shield_max),
            ("energy", actor.pools.energy, actor.stats.energy_max),
            ("fuel", actor.pools.fuel, actor.stats.fuel_max),
        ];
        for (name, value, max) in pools {
            if actor.is_dead() && name == "armour" {
                continue;
            }
            if value < -POOL_TOLERANCE || value > max + POOL_TOLERANCE {
                violation(&mut violations, format!("{} has {name} {value} outside [0, {max}]", actor.id));
            }
        }

        if actor.target != actor.id && actor.target != ActorId::NONE && !world.actors.contains(actor.target) {
            violation(&mut violations, format!("{} targets missing actor {}", actor.id, actor.target));
        }

        if let Some(index) = actor.secondary {
            if actor.slots.get(index).is_none_or(|slot| slot.is_empty()) {
                violation(&mut violations, format!("{} has secondary slot {index} with nothing equipped", actor.id));
            }
        }

        for (index, slot) in actor.slots.iter().enumerate() {
            let (Some(outfit), Some(ammo)) = (slot.outfit.as_ref(), slot.ammo()) else {
                continue;
            };
            if ammo.quantity + ammo.deployed > outfit.ammo_capacity() {
                violation(
                    &mut violations,
                    format!(
                        "{} slot {index} holds {} + {} deployed > capacity {}",
                        actor.id,
                        ammo.quantity,
                        ammo.deployed,
                        outfit.ammo_capacity()
                    ),
                );
            }
        }

        if actor.behavior.is_some() && host.memory().get(actor.id).is_none() {
            violation(&mut violations, format!("{} has a behavior but no memory record", actor.id));
        }
    }

    for id in host.memory().ids() {
        if !world.actors.contains(id) {
            violation(&mut violations, format!("memory record outlived actor {id}"));
        }
    }

    violations
}
