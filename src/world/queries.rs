//! Read-only questions behavior routines ask about the world.

use rand::Rng;

use super::World;
use crate::actor::{Actor, ActorId};
use crate::faction::PLAYER_FACTION;
use crate::geom::DVec2;

/// Extra turning time folded into braking distances, in units of a half turn.
const BRAKE_TURN_MARGIN: f64 = 1.1;

impl World {
    /// Nearest actor `id` considers an enemy: members of enemy factions, and
    /// the player when `id` is hostile to it. Disabled and out-of-range
    /// actors are skipped, and so is the player's faction while `id` is
    /// bribed.
    #[must_use]
    pub fn nearest_enemy(&self, id: ActorId) -> Option<ActorId> {
        let me = self.actors.get(id)?;
        let hostile_to_player = self.is_hostile(me);
        self.nearest(me, |other| {
            if other.faction == PLAYER_FACTION && me.flags.stance.bribed {
                return false;
            }
            !other.is_disabled()
                && (self.factions.are_enemies(me.faction, other.faction) || (other.is_player() && hostile_to_player))
        })
    }

    /// Nearest other actor in range that is still flying.
    #[must_use]
    pub fn nearest_pilot(&self, id: ActorId) -> Option<ActorId> {
        let me = self.actors.get(id)?;
        self.nearest(me, |other| !other.is_disabled())
    }

    fn nearest(&self, me: &Actor, mut accept: impl FnMut(&Actor) -> bool) -> Option<ActorId> {
        self.actors
            .iter()
            .filter(|other| other.id != me.id && self.in_range(me, other) && accept(other))
            .min_by(|a, b| {
                let da = a.solid.pos.distance_squared(me.solid.pos);
                let db = b.solid.pos.distance_squared(me.solid.pos);
                da.total_cmp(&db)
            })
            .map(|a| a.id)
    }

    /// Some live actor other than `id`, chosen at random.
    pub fn random_pilot(&mut self, id: ActorId) -> Option<ActorId> {
        let candidates: Vec<ActorId> = self
            .actors
            .iter()
            .filter(|a| a.id != id && !a.is_dead())
            .map(|a| a.id)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[self.rng.gen_range(0..candidates.len())])
    }

    /// How `id` regards `other`: the player's standing with `id`'s faction
    /// when `other` flies for the player, 100 for allies, -100 for enemies,
    /// 0 otherwise.
    #[must_use]
    pub fn standing(&self, id: ActorId, other: ActorId) -> Option<f64> {
        let me = self.actors.get(id)?;
        let them = self.actors.get(other)?;
        Some(if them.faction == PLAYER_FACTION {
            self.factions.player_standing(me.faction)
        } else if self.factions.are_allies(me.faction, them.faction) {
            100.0
        } else if self.factions.are_enemies(me.faction, them.faction) {
            -100.0
        } else {
            0.0
        })
    }

    /// Whether `id` treats `other` as an enemy. For the player this is
    /// `id`'s own hostility flag.
    #[must_use]
    pub fn is_enemy(&self, id: ActorId, other: ActorId) -> Option<bool> {
        let me = self.actors.get(id)?;
        let them = self.actors.get(other)?;
        Some(if them.is_player() {
            self.is_hostile(me)
        } else {
            self.factions.are_enemies(me.faction, them.faction)
        })
    }

    /// Whether `id` treats `other` as an ally.
    #[must_use]
    pub fn is_ally(&self, id: ActorId, other: ActorId) -> Option<bool> {
        let me = self.actors.get(id)?;
        let them = self.actors.get(other)?;
        Some(if them.is_player() {
            self.is_friendly(me)
        } else {
            self.factions.are_allies(me.faction, them.faction)
        })
    }

    /// Distance `id` covers while turning around and braking. Relative to
    /// `other`'s motion when given.
    #[must_use]
    pub fn min_brake_dist(&self, id: ActorId, other: Option<ActorId>) -> Option<f64> {
        let me = self.actors.get(id)?;
        let accel = if me.solid.mass > 0.0 { me.stats.thrust / me.solid.mass } else { 0.0 };
        let (closing, vel) = match other {
            Some(other) => {
                let them = self.actors.get(other)?;
                let vv = them.solid.vel - me.solid.vel;
                let vel = (me.stats.speed - them.solid.vel.length()).min(vv.length()).max(0.0);
                (vv.length(), vel)
            }
            None => {
                let speed = me.solid.vel.length();
                (speed, me.stats.speed.min(speed))
            }
        };
        if accel <= 0.0 {
            return Some(f64::INFINITY);
        }
        let time = closing / accel;
        let turn_time = if me.stats.turn > 0.0 { BRAKE_TURN_MARGIN * 180.0 / me.stats.turn.to_degrees() } else { 0.0 };
        Some(vel * (time + turn_time) - 0.5 * accel * time * time)
    }

    /// Closing speed of `other` projected onto the line between the two
    /// actors. Positive while they separate.
    #[must_use]
    pub fn rel_vel(&self, id: ActorId, other: ActorId) -> Option<f64> {
        let me = self.actors.get(id)?;
        let them = self.actors.get(other)?;
        let rel_pos = them.solid.pos - me.solid.pos;
        let rel_vel = them.solid.vel - me.solid.vel;
        Some(rel_pos.dot(rel_vel) / rel_pos.length().max(1.0))
    }

    /// Nearest planet not owned by an enemy of `id`.
    #[must_use]
    pub fn nearest_friendly_planet(&self, id: ActorId) -> Option<DVec2> {
        let me = self.actors.get(id)?;
        let index = self
            .system
            .nearest_planet(me.solid.pos, |p| !self.factions.are_enemies(me.faction, p.faction))?;
        Some(self.system.planets[index].pos)
    }

    /// Any planet, chosen at random.
    pub fn random_planet(&mut self) -> Option<DVec2> {
        let index = self.system.random_planet(&mut self.rng, |_| true)?;
        Some(self.system.planets[index].pos)
    }

    /// A random landable planet not owned by an enemy of `id`.
    pub fn landing_planet(&mut self, id: ActorId) -> Option<DVec2> {
        let faction = self.actors.get(id)?.faction;
        let Self { system, factions, rng, .. } = self;
        let index = system.random_planet(rng, |p| p.landable && !factions.are_enemies(faction, p.faction))?;
        Some(system.planets[index].pos)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::actor::LifePhase;
    use crate::actor::fixtures::scout;
    use crate::faction::FactionId;
    use crate::system::Planet;
    use crate::world::fixtures::{place, world};

    #[test]
    fn test_nearest_enemy_skips_disabled_and_allies() {
        let mut world = world();
        let me = place(&mut world, DVec2::ZERO);
        let near = place(&mut world, DVec2::new(50.0, 0.0));
        let far = place(&mut world, DVec2::new(300.0, 0.0));
        let friend = place(&mut world, DVec2::new(10.0, 0.0));
        world.factions.set_enemies(FactionId(1), FactionId(2));
        world.actor_mut(near).unwrap().faction = FactionId(2);
        world.actor_mut(far).unwrap().faction = FactionId(2);
        assert_eq!(world.nearest_enemy(me), Some(near));
        world.actor_mut(near).unwrap().flags.life = LifePhase::Disabled;
        assert_eq!(world.nearest_enemy(me), Some(far));
        assert_eq!(world.nearest_pilot(me), Some(friend));
    }

    #[test]
    fn test_bribed_actor_ignores_player() {
        let mut world = world();
        let mut player = scout(1);
        player.faction = PLAYER_FACTION;
        world.add_player(player).unwrap();
        let pirate = place(&mut world, DVec2::new(100.0, 0.0));
        assert_eq!(world.nearest_enemy(pirate), Some(ActorId::PLAYER));
        world.actor_mut(pirate).unwrap().flags.stance.bribed = true;
        assert_eq!(world.nearest_enemy(pirate), None);
    }

    #[test]
    fn test_standing_views() {
        let mut world = world();
        let mut player = scout(1);
        player.faction = PLAYER_FACTION;
        world.add_player(player).unwrap();
        let trader = place(&mut world, DVec2::ZERO);
        world.actor_mut(trader).unwrap().faction = FactionId(2);
        let pirate = place(&mut world, DVec2::ZERO);
        world.factions.set_enemies(FactionId(1), FactionId(2));
        assert_eq!(world.standing(trader, ActorId::PLAYER), Some(10.0));
        assert_eq!(world.standing(trader, pirate), Some(-100.0));
        assert_eq!(world.is_enemy(pirate, ActorId::PLAYER), Some(true));
        assert_eq!(world.is_ally(trader, ActorId::PLAYER), Some(false));
        assert_eq!(world.is_enemy(trader, ActorId(99)), None);
    }

    #[test]
    fn test_brake_distance_at_rest_is_zero() {
        let mut world = world();
        let id = place(&mut world, DVec2::ZERO);
        assert_relative_eq!(world.min_brake_dist(id, None).unwrap(), 0.0);
        world.actor_mut(id).unwrap().solid.vel = DVec2::new(100.0, 0.0);
        let moving = world.min_brake_dist(id, None).unwrap();
        let actor = world.actor(id).unwrap();
        let accel = actor.stats.thrust / actor.solid.mass;
        let t = 100.0 / accel;
        assert_relative_eq!(moving, 100.0 * (t + 1.1 * 180.0 / actor.stats.turn.to_degrees()) - 0.5 * accel * t * t);
    }

    #[test]
    fn test_rel_vel_sign() {
        let mut world = world();
        let a = place(&mut world, DVec2::ZERO);
        let b = place(&mut world, DVec2::new(100.0, 0.0));
        world.actor_mut(b).unwrap().solid.vel = DVec2::new(-20.0, 0.0);
        assert_relative_eq!(world.rel_vel(a, b).unwrap(), -20.0);
    }

    #[test]
    fn test_planet_picks_respect_faction_and_landing() {
        let mut world = world();
        let id = place(&mut world, DVec2::ZERO);
        world.factions.set_enemies(FactionId(1), FactionId(2));
        world.system.planets = vec![
            Planet { name: "Hostile".into(), pos: DVec2::new(10.0, 0.0), faction: FactionId(2), landable: true },
            Planet { name: "Home".into(), pos: DVec2::new(900.0, 0.0), faction: FactionId(1), landable: true },
        ];
        assert_eq!(world.nearest_friendly_planet(id), Some(DVec2::new(900.0, 0.0)));
        for _ in 0..10 {
            assert_eq!(world.landing_planet(id), Some(DVec2::new(900.0, 0.0)));
        }
        assert!(world.random_planet().is_some());
    }
}
