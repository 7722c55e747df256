//! Boarding disabled actors and ship-to-ship refuelling.
//!
//! Both start only when the actor is docked against its target: within
//! `0.8 * size` of it and no faster than 25 units/s relative to it. While
//! the phase timer runs the actor matches its target's velocity.

use tracing::debug;

use super::World;
use super::escort::{DOCK_RANGE, MAX_DOCK_VEL};
use crate::actor::{Actor, ActorId, HookKind};
use crate::ai::{Task, TaskPayload};
use crate::events::WorldEvent;
use crate::hyperspace::HYPERSPACE_FUEL;

/// Seconds boarding takes.
pub const BOARDING_TIME: f64 = 3.0;
/// Seconds a full refuel takes.
pub const REFUEL_TIME: f64 = 3.0;
/// Fuel moved per second while refuelling.
pub const REFUEL_RATE: f64 = HYPERSPACE_FUEL / REFUEL_TIME;

fn docked_with(actor: &Actor, target: &Actor) -> bool {
    actor.solid.pos.distance(target.solid.pos) <= target.hull.size * DOCK_RANGE
        && (actor.solid.vel - target.solid.vel).length_squared() <= MAX_DOCK_VEL * MAX_DOCK_VEL
}

impl World {
    /// Start boarding `id`'s target. The target must be disabled, not yet
    /// boarded, and docked with.
    pub fn board_start(&mut self, id: ActorId) -> bool {
        let Some(target_id) = self.actor(id).filter(|a| a.has_target()).map(|a| a.target) else {
            return false;
        };
        let Some((actor, target)) = self.actors.get_pair_mut(id, target_id) else {
            return false;
        };
        if !target.is_disabled() || target.is_dead() || target.flags.logistics.boarded || !docked_with(actor, target) {
            return false;
        }
        actor.flags.logistics.boarding = true;
        actor.ptimer = BOARDING_TIME;
        target.flags.logistics.boarded = true;
        debug!(actor = %id, target = %target_id, "boarding_started");
        true
    }

    /// Keep a boarding actor alongside its target and finish the boarding
    /// once the phase timer runs out.
    pub(crate) fn boarding_tick(&mut self, id: ActorId) {
        let Some(actor) = self.actors.get(id) else {
            return;
        };
        let target_id = actor.target;
        let Some((actor, target)) = self.actors.get_pair_mut(id, target_id) else {
            if let Some(actor) = self.actors.get_mut(id) {
                actor.flags.logistics.boarding = false;
            }
            return;
        };
        actor.solid.vel = target.solid.vel;
        if actor.ptimer >= 0.0 {
            return;
        }

        let credits = target.credits;
        actor.credits += credits;
        target.credits = 0;

        let loot: Vec<(String, u32)> = target
            .cargo
            .items()
            .iter()
            .filter(|i| i.mission_id.is_none())
            .map(|i| (i.commodity.clone(), i.quantity))
            .collect();
        for (commodity, quantity) in loot {
            let taken = actor.add_cargo(&commodity, quantity);
            target.remove_cargo(&commodity, taken);
        }

        actor.flags.logistics.boarding = false;
        self.events.push(WorldEvent::Boarded { boarder: id, target: target_id, credits });
        target.run_hooks(HookKind::Board, &mut self.events);
        debug!(actor = %id, target = %target_id, credits, "boarding_complete");
    }

    /// Start pumping fuel into `id`'s target.
    pub fn refuel_start(&mut self, id: ActorId) -> bool {
        let Some(target_id) = self.actor(id).filter(|a| a.has_target()).map(|a| a.target) else {
            return false;
        };
        let Some((actor, target)) = self.actors.get_pair_mut(id, target_id) else {
            return false;
        };
        if !docked_with(actor, target) {
            return false;
        }
        actor.flags.logistics.refuel_boarding = true;
        actor.ptimer = REFUEL_TIME;
        debug!(actor = %id, target = %target_id, "refuel_started");
        true
    }

    /// Move fuel from a refuelling actor to its target.
    pub(crate) fn refuel_tick(&mut self, id: ActorId, dt: f64) {
        let Some(target_id) = self.actor(id).map(|a| a.target) else {
            return;
        };
        let Some((tanker, target)) = self.actors.get_pair_mut(id, target_id) else {
            if let Some(tanker) = self.actors.get_mut(id) {
                tanker.flags.logistics.refuel_boarding = false;
                tanker.flags.logistics.refueling = false;
            }
            return;
        };
        tanker.solid.vel = target.solid.vel;

        let amount = REFUEL_RATE * dt;
        tanker.pools.fuel = (tanker.pools.fuel - amount).max(0.0);
        target.pools.fuel += amount;
        if target.pools.fuel > target.stats.fuel_max {
            tanker.ptimer = -1.0;
            target.pools.fuel = target.stats.fuel_max;
        }

        if tanker.ptimer < 0.0 {
            tanker.flags.logistics.refuel_boarding = false;
            tanker.flags.logistics.refueling = false;
            self.events.push(WorldEvent::Refueled { tanker: id, target: target_id });
            debug!(actor = %id, target = %target_id, "refuel_complete");
        }
    }

    /// Have `refueler` drop what it is doing and fly over to refuel
    /// `target`. Only scripted actors can take the job.
    pub fn request_refuel(&mut self, refueler: ActorId, target: ActorId) -> bool {
        if !self.actors.contains(target) {
            return false;
        }
        let Some(actor) = self.actors.get_mut(refueler) else {
            return false;
        };
        let Some(behavior) = actor.behavior.as_mut() else {
            return false;
        };
        behavior.tasks.push(0, Task::new("refuel", TaskPayload::Actor(target)));
        actor.flags.logistics.refueling = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::actor::LifePhase;
    use crate::ai::{Behavior, ProfileId};
    use crate::geom::DVec2;
    use crate::world::fixtures::{place, world};

    fn pair(world: &mut World) -> (ActorId, ActorId) {
        let a = place(world, DVec2::ZERO);
        let b = place(world, DVec2::new(20.0, 0.0));
        world.actor_mut(a).unwrap().target = b;
        (a, b)
    }

    #[test]
    fn test_boarding_needs_disabled_target() {
        let mut world = world();
        let (a, b) = pair(&mut world);
        assert!(!world.board_start(a));
        world.actor_mut(b).unwrap().flags.life = LifePhase::Disabled;
        world.actor_mut(b).unwrap().solid.vel = DVec2::new(30.0, 0.0);
        assert!(!world.board_start(a));
        world.actor_mut(b).unwrap().solid.vel = DVec2::ZERO;
        assert!(world.board_start(a));
        assert!(world.actor(b).unwrap().flags.logistics.boarded);
        assert!(!world.board_start(a));
    }

    #[test]
    fn test_boarding_takes_credits_and_trade_cargo() {
        let mut world = world();
        let (a, b) = pair(&mut world);
        {
            let target = world.actor_mut(b).unwrap();
            target.flags.life = LifePhase::Disabled;
            target.credits = 500;
            target.add_cargo("Food", 4);
            assert!(target.add_mission_cargo("Ore", 2).is_some());
            target.add_hook(HookKind::Board, 9);
        }
        assert!(world.board_start(a));
        world.actor_mut(a).unwrap().ptimer = -0.1;
        world.boarding_tick(a);

        let boarder = world.actor(a).unwrap();
        assert!(!boarder.flags.logistics.boarding);
        assert_eq!(boarder.credits, 500);
        assert_eq!(boarder.cargo.quantity_of("Food"), 4);
        // Mission cargo is never looted.
        assert!(boarder.cargo.items().iter().all(|i| i.mission_id.is_none()));
        assert_eq!(boarder.cargo.used(), 4);
        let target = world.actor(b).unwrap();
        assert_eq!(target.credits, 0);
        assert_eq!(target.cargo.quantity_of("Food"), 0);
        let kept: Vec<_> = target.cargo.items().iter().filter(|i| i.mission_id.is_some()).collect();
        assert_eq!(kept.len(), 1);
        assert_eq!((kept[0].commodity.as_str(), kept[0].quantity), ("Ore", 2));
        assert_eq!(world.events.count(|e| matches!(e, WorldEvent::Boarded { credits: 500, .. })), 1);
        assert_eq!(world.events.count(|e| matches!(e, WorldEvent::Hook { hook_id: 9, .. })), 1);
    }

    #[test]
    fn test_refuel_moves_fuel_until_target_is_full() {
        let mut world = world();
        let (a, b) = pair(&mut world);
        world.actor_mut(b).unwrap().pools.fuel = 250.0;
        assert!(world.refuel_start(a));
        world.refuel_tick(a, 1.0);
        assert_relative_eq!(world.actor(b).unwrap().pools.fuel, 250.0 + REFUEL_RATE);
        assert!(world.actor(a).unwrap().flags.logistics.refuel_boarding);

        world.refuel_tick(a, 1.0);
        let target = world.actor(b).unwrap();
        assert_relative_eq!(target.pools.fuel, target.stats.fuel_max);
        assert!(!world.actor(a).unwrap().flags.logistics.refuel_boarding);
        assert_eq!(world.events.count(|e| matches!(e, WorldEvent::Refueled { .. })), 1);
    }

    #[test]
    fn test_refuel_request_goes_to_head_of_queue() {
        let mut world = world();
        let (a, b) = pair(&mut world);
        assert!(!world.request_refuel(a, b));
        let mut behavior = Behavior::new(ProfileId(0));
        behavior.tasks.push(1, Task::new("patrol", TaskPayload::None));
        world.actor_mut(a).unwrap().behavior = Some(behavior);
        assert!(world.request_refuel(a, b));
        let actor = world.actor(a).unwrap();
        let tasks = &actor.behavior.as_ref().unwrap().tasks;
        assert_eq!(tasks.name(), "refuel");
        assert_eq!(tasks.head().map(|t| t.payload), Some(TaskPayload::Actor(b)));
        assert!(actor.flags.logistics.refueling);
    }
}
