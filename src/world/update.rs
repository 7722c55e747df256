//! Per-actor update: timers, the death countdown, regeneration, physics.

use std::f64::consts::TAU;

use rand::Rng;
use tracing::trace;

use super::World;
use crate::actor::{Actor, ActorId, HyperspacePhase, LifePhase};
use crate::catalog::{DamageType, OutfitKind};
use crate::combat::damage::{HOSTILE_DECAY, kill};
use crate::combat::weapons::{stop_all_beams, update_beams};
use crate::events::{EventLog, SoundCue, WorldEvent};
use crate::geom::{DVec2, from_polar};
use crate::hyperspace::HYPERSPACE_VEL;

/// Drift damping per second for disabled actors.
const DISABLED_DRAG: f64 = 0.1;

/// Final blast of a dying actor.
#[derive(Debug, Clone, Copy)]
struct Blast {
    pos: DVec2,
    radius: f64,
    damage: f64,
}

impl World {
    /// Advance one actor by `dt` seconds.
    ///
    /// Runs after the actor's behavior has set its controls. Dead actors
    /// count down to removal, disabled ones drift, the rest regenerate,
    /// move and respect their speed limit.
    pub fn update_actor(&mut self, id: ActorId, dt: f64) {
        let Self { actors, events, rng, .. } = self;
        let Some(actor) = actors.get_mut(id) else {
            return;
        };
        tick_timers(actor, dt);

        let mut blast = None;
        if actor.is_dead() {
            blast = dying(actor, rng, events);
            if actor.flags.delete {
                return;
            }
        } else if actor.pools.armour <= 0.0 {
            kill(actor, events);
        }

        if actor.is_disabled() {
            for slot in stop_all_beams(actor) {
                events.push(WorldEvent::BeamStopped { shooter: id, slot });
            }
            drift(actor, dt);
        } else {
            regenerate(actor, dt);
            if actor.flags.logistics.refuel_boarding {
                self.refuel_tick(id, dt);
            }
            if self.actor(id).is_some_and(|a| a.flags.logistics.boarding) {
                self.boarding_tick(id);
            }
            let Self { actors, events, .. } = self;
            if let Some(actor) = actors.get_mut(id) {
                fly(actor, dt, events);
            }
        }

        if let Some(blast) = blast {
            self.explode(blast.pos, blast.radius, DamageType::Kinetic, blast.damage, id);
        }
    }
}

fn tick_timers(actor: &mut Actor, dt: f64) {
    actor.ptimer -= dt;
    if actor.explosion_timer > 0.0 {
        actor.explosion_timer -= dt;
    }
    if let Some(behavior) = actor.behavior.as_mut() {
        behavior.control_timer -= dt;
        for timer in &mut behavior.timers {
            if *timer > 0.0 {
                *timer -= dt;
            }
        }
    }
    for slot in &mut actor.slots {
        if slot.timer > 0.0 {
            slot.timer -= dt;
        }
    }
}

/// Death countdown. Returns the final blast on the tick it happens.
fn dying<R: Rng>(actor: &mut Actor, rng: &mut R, events: &mut EventLog) -> Option<Blast> {
    let LifePhase::Dead { sound_played, exploded } = actor.flags.life else {
        return None;
    };
    if actor.ptimer < 0.0 {
        actor.flags.delete = true;
        trace!(actor = %actor.id, "actor_wreck_cleared");
        return None;
    }

    if !sound_played && actor.ptimer < 0.05 {
        actor.flags.life = LifePhase::Dead { sound_played: true, exploded };
        events.push(WorldEvent::Sound { actor: actor.id, cue: SoundCue::Explosion });
    } else if !exploded && actor.ptimer < 0.2 {
        actor.flags.life = LifePhase::Dead { sound_played, exploded: true };
        let root = actor.solid.mass.sqrt();
        let blast = Blast {
            pos: actor.solid.pos,
            radius: actor.hull.size / 2.0 + root,
            damage: (2.0 * root * (1.0 + (actor.pools.fuel + 1.0).sqrt() / 28.0)).max(0.0),
        };
        events.push(WorldEvent::Explosion { pos: blast.pos, radius: blast.radius, damage: blast.damage });
        events.push(WorldEvent::Debris { pos: actor.solid.pos, mass: actor.solid.mass });
        actor.jettison_all(events);
        return Some(blast);
    } else if actor.explosion_timer <= 0.0 {
        if actor.ptimer > 0.0 {
            actor.explosion_timer = 0.08 * (actor.ptimer - actor.explosion_timer) / actor.ptimer;
        }
        let angle = rng.gen_range(0.0..TAU);
        let offset = from_polar(rng.gen_range(0.0..1.0) * actor.hull.size / 2.0, angle);
        events.push(WorldEvent::Explosion { pos: actor.solid.pos + offset, radius: 0.0, damage: 0.0 });
    }
    None
}

fn drift(actor: &mut Actor, dt: f64) {
    actor.solid.vel *= 1.0 - DISABLED_DRAG * dt;
    actor.set_controls(0.0, 0.0);
    actor.solid.update(dt);
}

/// Regeneration, afterburner breakage and player-damage decay.
fn regenerate(actor: &mut Actor, dt: f64) {
    let stats = actor.stats;
    let pools = &mut actor.pools;
    pools.armour = (pools.armour + stats.armour_regen * dt).min(stats.armour_max);
    pools.shield = (pools.shield + stats.shield_regen * dt).min(stats.shield_max);

    if pools.energy < 1.0 && actor.flags.afterburner {
        actor.flags.afterburner = false;
    }

    // RC charging: closed form, independent of the tick size.
    if stats.energy_tau.is_finite() && stats.energy_tau > 0.0 {
        pools.energy += (stats.energy_max - pools.energy) * (1.0 - (-dt / stats.energy_tau).exp());
    }

    if actor.player_damage > 0.0 {
        actor.player_damage -= dt * HOSTILE_DECAY;
    } else {
        actor.player_damage = 0.0;
    }

    pools.energy = pools.energy.min(stats.energy_max);
}

/// Integrate the rigid body, keep beams powered and enforce the speed cap.
fn fly(actor: &mut Actor, dt: f64, events: &mut EventLog) {
    actor.solid.update(dt);
    for slot in update_beams(actor, dt) {
        events.push(WorldEvent::BeamStopped { shooter: actor.id, slot });
    }

    if actor.flags.hyperspace == HyperspacePhase::InTransit {
        actor.solid.limit_speed(HYPERSPACE_VEL, dt);
        return;
    }

    let afterburner = actor
        .afterburner
        .and_then(|i| actor.slots.get(i))
        .and_then(|s| s.outfit.as_ref())
        .and_then(|o| match &o.kind {
            OutfitKind::Afterburner(a) => Some((a.speed, a.energy)),
            _ => None,
        });
    match afterburner {
        Some((speed, energy)) if actor.flags.afterburner && actor.pools.energy > energy * dt => {
            actor.solid.limit_speed(actor.stats.speed * speed, dt);
            actor.pools.energy -= energy * dt;
        }
        _ => actor.solid.limit_speed(actor.stats.speed, dt),
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::world::fixtures::{place, world};

    #[test]
    fn test_energy_follows_rc_law() {
        let mut world = world();
        let id = place(&mut world, DVec2::ZERO);
        let tau = {
            let actor = world.actor_mut(id).unwrap();
            actor.pools.energy = 0.0;
            actor.stats.energy_tau
        };
        let half_life = tau * std::f64::consts::LN_2;
        let steps = 400;
        for _ in 0..steps {
            world.update_actor(id, half_life / f64::from(steps));
        }
        let actor = world.actor(id).unwrap();
        assert_relative_eq!(actor.pools.energy, 0.5 * actor.stats.energy_max, epsilon = 1e-6);
    }

    #[test]
    fn test_shield_regen_clamps_at_max() {
        let mut world = world();
        let id = place(&mut world, DVec2::ZERO);
        world.actor_mut(id).unwrap().pools.shield = 39.5;
        world.update_actor(id, 1.0);
        let actor = world.actor(id).unwrap();
        assert_relative_eq!(actor.pools.shield, actor.stats.shield_max);
    }

    #[test]
    fn test_disabled_actor_drifts_to_a_stop() {
        let mut world = world();
        let id = place(&mut world, DVec2::ZERO);
        {
            let actor = world.actor_mut(id).unwrap();
            actor.flags.life = LifePhase::Disabled;
            actor.solid.vel = DVec2::new(100.0, 0.0);
            actor.set_controls(1.0, 1.0);
        }
        world.update_actor(id, 1.0);
        let actor = world.actor(id).unwrap();
        assert_relative_eq!(actor.solid.vel.x, 90.0, epsilon = 1e-9);
        assert_relative_eq!(actor.solid.thrust, 0.0);
    }

    #[test]
    fn test_death_countdown_runs_every_sub_phase() {
        let mut world = world();
        let id = place(&mut world, DVec2::ZERO);
        world.actor_mut(id).unwrap().add_cargo("Food", 3);
        {
            let World { actors, events, .. } = &mut world;
            kill(actors.get_mut(id).unwrap(), events);
        }
        for _ in 0..200 {
            if world.actor(id).is_none_or(|a| a.flags.delete) {
                break;
            }
            world.update_actor(id, 0.01);
        }
        assert!(world.actor(id).unwrap().flags.delete);
        let events = &world.events;
        assert_eq!(events.count(|e| matches!(e, WorldEvent::Sound { cue: SoundCue::Explosion, .. })), 1);
        assert_eq!(events.count(|e| matches!(e, WorldEvent::Debris { .. })), 1);
        assert_eq!(events.count(|e| matches!(e, WorldEvent::CargoJettisoned { .. })), 1);
        assert_eq!(events.count(|e| matches!(e, WorldEvent::Explosion { radius, .. } if *radius > 0.0)), 1);
        assert!(events.count(|e| matches!(e, WorldEvent::Explosion { radius, .. } if *radius <= 0.0)) > 1);
    }

    #[test]
    fn test_zero_armour_kills_on_update() {
        let mut world = world();
        let id = place(&mut world, DVec2::ZERO);
        world.actor_mut(id).unwrap().pools.armour = 0.0;
        world.update_actor(id, 0.01);
        assert!(world.actor(id).unwrap().is_dead());
    }

    #[test]
    fn test_speed_limit_pulls_back() {
        let mut world = world();
        let id = place(&mut world, DVec2::ZERO);
        world.actor_mut(id).unwrap().solid.vel = DVec2::new(1000.0, 0.0);
        world.update_actor(id, 0.1);
        assert!(world.actor(id).unwrap().solid.speed() < 1000.0);
    }
}
