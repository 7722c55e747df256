//! Fighter escorts: launch from a bay, orders from the carrier, docking.

use std::sync::Arc;

use tracing::{debug, warn};

use super::{EscortOrder, Notification, World};
use crate::actor::{Actor, ActorId};
use crate::catalog::{Catalog, Outfit, OutfitKind};
use crate::events::WorldEvent;

/// Maximum relative speed for docking and refuelling.
pub(crate) const MAX_DOCK_VEL: f64 = 25.0;
/// Fraction of the host's size within which docking is possible.
pub(crate) const DOCK_RANGE: f64 = 0.8;

impl World {
    /// Spawn the fighter a bay just launched. It enters the registry at the
    /// next tick boundary, flying the configured escort profile.
    pub(crate) fn launch_escort(&mut self, carrier: ActorId, fighter: &Outfit) -> Option<ActorId> {
        let Some(hull) = self.catalog.fighter_hull(fighter) else {
            warn!(carrier = %carrier, fighter = %fighter.name, "fighter_hull_missing");
            return None;
        };
        let host = self.actors.get(carrier)?;
        let mut escort = Actor::new(
            ActorId::NONE,
            fighter.name.clone(),
            host.faction,
            hull,
            host.solid.pos,
            host.solid.vel,
            host.solid.dir,
        );
        escort.parent = carrier;
        escort.flags.escort = true;
        escort.flags.carried = true;
        escort.fill_ammo(&self.catalog);

        let profile = self.escort_profile.clone();
        let id = self.spawn(escort, Some(profile));
        if let Some(host) = self.actors.get_mut(carrier) {
            host.escorts.push(id);
        }
        self.events.push(WorldEvent::EscortLaunched { carrier, escort: id });
        debug!(carrier = %carrier, escort = %id, "escort_launched");
        Some(id)
    }

    /// Dock `escort` in one of `carrier`'s bays. Fails unless the escort is
    /// close, slow relative to the carrier, and one of the carrier's bays
    /// has this fighter deployed.
    pub fn dock(&mut self, escort: ActorId, carrier: ActorId) -> bool {
        let Some((fighter, host)) = self.actors.get_pair_mut(escort, carrier) else {
            return false;
        };
        if fighter.solid.pos.distance(host.solid.pos) > host.hull.size * DOCK_RANGE {
            return false;
        }
        if (fighter.solid.vel - host.solid.vel).length_squared() > MAX_DOCK_VEL * MAX_DOCK_VEL {
            return false;
        }
        if !host.escorts.contains(&escort) {
            return false;
        }
        let Some((index, round)) = matching_bay(host, &fighter.hull.name, &self.catalog) else {
            return false;
        };

        if let Some(state) = host.slots[index].ammo_mut() {
            state.deployed -= 1;
        }
        if host.add_ammo(index, &round, 1) != Ok(1) {
            if let Some(state) = host.slots[index].ammo_mut() {
                state.deployed += 1;
            }
            return false;
        }
        host.escorts.retain(|&e| e != escort);
        fighter.flags.delete = true;
        self.events.push(WorldEvent::Docked { escort, carrier });
        debug!(carrier = %carrier, escort = %escort, "escort_docked");
        true
    }

    /// Send an order to every escort of `carrier`. False when it has none.
    pub fn order_escorts(&mut self, carrier: ActorId, order: EscortOrder) -> bool {
        let Some(host) = self.actors.get(carrier) else {
            return false;
        };
        if host.escorts.is_empty() {
            return false;
        }
        let target = if host.has_target() { host.target } else { ActorId::NONE };
        let escorts = host.escorts.clone();
        for escort in escorts {
            self.notify(Notification::Escort { escort, order, target });
        }
        true
    }
}

/// A fighter bay with deployed fighters flying `hull`, and the fighter
/// outfit it holds.
fn matching_bay(host: &Actor, hull: &str, catalog: &Catalog) -> Option<(usize, Arc<Outfit>)> {
    host.slots.iter().enumerate().find_map(|(index, slot)| {
        let bay = slot.outfit.as_ref().filter(|o| o.is_fighter_bay())?;
        let state = slot.ammo().filter(|a| a.deployed > 0)?;
        let round = state.ammo.clone().or_else(|| catalog.ammo_for(bay))?;
        match &round.kind {
            OutfitKind::Fighter { hull: h } if h == hull => Some((index, round)),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::weapons::FireMode;
    use crate::geom::DVec2;
    use crate::world::fixtures::{place, world};

    fn carrier(world: &mut World) -> ActorId {
        let id = place(world, DVec2::ZERO);
        let bay = world.catalog.outfit("Drone Bay").unwrap();
        let fighter = world.catalog.outfit("Drone Fighter").unwrap();
        let actor = world.actor_mut(id).unwrap();
        actor.add_outfit(3, bay).unwrap();
        actor.add_ammo(3, &fighter, 2).unwrap();
        actor.secondary = Some(3);
        id
    }

    #[test]
    fn test_bay_launches_escort_at_next_boundary() {
        let mut world = world();
        let host = carrier(&mut world);
        assert_eq!(world.fire(host, true, FireMode::All), 1);
        assert_eq!(world.pending_spawns(), 1);
        let spawned = world.insert_pending();
        let (escort, profile) = spawned[0].clone();
        assert_eq!(profile.as_deref(), Some("escort"));
        assert_eq!(world.actor(escort).unwrap().parent, host);
        assert_eq!(world.actor(host).unwrap().escorts, vec![escort]);
        assert_eq!(world.actor(host).unwrap().slots[3].ammo().unwrap().deployed, 1);
    }

    #[test]
    fn test_dock_returns_fighter_to_bay() {
        let mut world = world();
        let host = carrier(&mut world);
        world.fire(host, true, FireMode::All);
        let (escort, _) = world.insert_pending()[0].clone();
        world.actor_mut(escort).unwrap().solid.pos = DVec2::new(500.0, 0.0);
        assert!(!world.dock(escort, host));

        world.actor_mut(escort).unwrap().solid.pos = DVec2::new(5.0, 0.0);
        assert!(world.dock(escort, host));
        let state = world.actor(host).unwrap().slots[3].ammo().unwrap().clone();
        assert_eq!((state.quantity, state.deployed), (2, 0));
        assert!(world.actor(escort).unwrap().flags.delete);
        assert!(world.actor(host).unwrap().escorts.is_empty());
        assert!(!world.dock(escort, host));
    }

    #[test]
    fn test_orders_need_escorts() {
        let mut world = world();
        let host = carrier(&mut world);
        assert!(!world.order_escorts(host, EscortOrder::Hold));
        world.fire(host, true, FireMode::All);
        let (escort, _) = world.insert_pending()[0].clone();
        assert!(world.order_escorts(host, EscortOrder::Hold));
        assert_eq!(
            world.pop_notification(),
            Some(Notification::Escort { escort, order: EscortOrder::Hold, target: ActorId::NONE })
        );
    }
}
