//! Bolts, missiles and beams in flight.
//!
//! A small collaborator: projectiles fly straight (smart
//! missiles turn towards their target), hit the first actor whose collision
//! circle they enter and hand the damage to [`World::hit`].

use crate::actor::{Actor, ActorId};
use crate::catalog::{DamageType, Outfit, OutfitKind};
use crate::combat::damage::{Hit, Impact};
use crate::faction::FactionId;
use crate::geom::{DVec2, from_polar, heading_of, normalize_angle, steer};

use super::World;

/// Fraction of an actor's size used as its collision diameter.
const HIT_SIZE: f64 = 0.8;

/// Flight model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectileKind {
    /// Straight-flying bolt.
    Bolt,
    /// Launcher round; smart rounds turn at `turn` radians per second.
    Missile {
        /// Homes on its target.
        smart: bool,
        /// Turn rate.
        turn: f64,
    },
}

/// One projectile.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    /// Firing actor.
    pub shooter: ActorId,
    /// Shooter's faction when fired, for friendly-fire checks.
    pub faction: FactionId,
    /// Target at launch; `NONE` for unguided shots.
    pub target: ActorId,
    /// Weapon or ammunition name.
    pub outfit: String,
    /// Flight model.
    pub kind: ProjectileKind,
    /// Position.
    pub pos: DVec2,
    /// Velocity.
    pub vel: DVec2,
    /// Seconds left before it fizzles.
    pub life: f64,
    /// Damage on impact.
    pub damage: f64,
    /// Damage kind.
    pub damage_type: DamageType,
    /// Mass for knockback.
    pub mass: f64,
}

impl Projectile {
    /// A bolt leaving `shooter`. Turrets aim at `target` when there is one.
    #[must_use]
    pub fn bolt(shooter: &Actor, outfit: &Outfit, target: Option<&Actor>) -> Self {
        let (speed, range, damage, damage_type) = match &outfit.kind {
            OutfitKind::Bolt(b) => (b.speed, b.range, b.damage, b.damage_type),
            _ => (0.0, 0.0, 0.0, DamageType::Kinetic),
        };
        let dir = match target {
            Some(t) if outfit.is_turret() => heading_of(t.solid.pos - shooter.solid.pos),
            _ => shooter.solid.dir,
        };
        Self {
            shooter: shooter.id,
            faction: shooter.faction,
            target: target.map_or(ActorId::NONE, |t| t.id),
            outfit: outfit.name.clone(),
            kind: ProjectileKind::Bolt,
            pos: shooter.solid.pos,
            vel: shooter.solid.vel + from_polar(speed, dir),
            life: if speed > 0.0 { range / speed } else { 0.0 },
            damage,
            damage_type,
            mass: 1.0,
        }
    }

    /// A launcher round leaving `shooter`, aimed at its current target.
    #[must_use]
    pub fn missile(shooter: &Actor, ammo: &Outfit) -> Self {
        let (speed, duration, damage, damage_type, smart, turn) = match &ammo.kind {
            OutfitKind::Ammo(a) => (a.speed, a.duration, a.damage, a.damage_type, a.smart, a.turn.to_radians()),
            _ => (0.0, 0.0, 0.0, DamageType::Kinetic, false, 0.0),
        };
        Self {
            shooter: shooter.id,
            faction: shooter.faction,
            target: if shooter.has_target() { shooter.target } else { ActorId::NONE },
            outfit: ammo.name.clone(),
            kind: ProjectileKind::Missile { smart, turn },
            pos: shooter.solid.pos,
            vel: shooter.solid.vel + from_polar(speed, shooter.solid.dir),
            life: duration,
            damage,
            damage_type,
            mass: ammo.mass.max(1.0),
        }
    }

    /// Smart round with a live target.
    #[must_use]
    pub fn is_homing(&self) -> bool {
        matches!(self.kind, ProjectileKind::Missile { smart: true, .. }) && self.target != ActorId::NONE
    }

    fn home(&mut self, target: DVec2, dt: f64) {
        let ProjectileKind::Missile { smart: true, turn } = self.kind else {
            return;
        };
        let speed = self.vel.length();
        let dir = heading_of(self.vel);
        let (command, _) = steer(dir, heading_of(target - self.pos));
        self.vel = from_polar(speed, normalize_angle(dir + command * turn * dt));
    }
}

/// An active beam this tick.
#[derive(Debug, Clone, Copy)]
struct BeamRay {
    shooter: ActorId,
    origin: DVec2,
    dir: DVec2,
    range: f64,
    damage: f64,
    damage_type: DamageType,
}

impl World {
    /// Move projectiles, resolve their hits and apply beam damage.
    pub fn step_projectiles(&mut self, dt: f64) {
        let flying = std::mem::take(&mut self.projectiles);
        let mut kept = Vec::with_capacity(flying.len());
        for mut projectile in flying {
            projectile.life -= dt;
            if projectile.life <= 0.0 {
                self.release_lock(&projectile);
                continue;
            }
            if projectile.is_homing() {
                match self.actors.get(projectile.target).filter(|t| !t.is_dead()) {
                    Some(target) => projectile.home(target.solid.pos, dt),
                    None => projectile.target = ActorId::NONE,
                }
            }
            projectile.pos += projectile.vel * dt;

            let Some(victim) = self.collision(&projectile) else {
                kept.push(projectile);
                continue;
            };
            self.release_lock(&projectile);
            let hit = Hit {
                shooter: projectile.shooter,
                damage_type: projectile.damage_type,
                damage: projectile.damage,
                impact: Some(Impact { vel: projectile.vel, mass: projectile.mass }),
            };
            self.hit(victim, &hit);
        }
        kept.append(&mut self.projectiles);
        self.projectiles = kept;

        for ray in self.beam_rays(dt) {
            if let Some(victim) = self.beam_victim(&ray) {
                let hit = Hit { shooter: ray.shooter, damage_type: ray.damage_type, damage: ray.damage, impact: None };
                self.hit(victim, &hit);
            }
        }
    }

    fn release_lock(&mut self, projectile: &Projectile) {
        if !projectile.is_homing() {
            return;
        }
        if let Some(target) = self.actors.get_mut(projectile.target) {
            target.lockons = target.lockons.saturating_sub(1);
        }
    }

    /// Whether a projectile from `faction` may strike `actor`.
    fn can_strike(&self, shooter: ActorId, faction: FactionId, target: ActorId, actor: &Actor) -> bool {
        actor.id != shooter
            && !actor.is_dead()
            && (actor.id == target || !self.factions.are_allies(faction, actor.faction) || actor.flags.stance.hostile)
    }

    fn collision(&self, projectile: &Projectile) -> Option<ActorId> {
        self.actors
            .iter()
            .filter(|a| self.can_strike(projectile.shooter, projectile.faction, projectile.target, a))
            .find(|a| {
                let radius = HIT_SIZE * a.hull.size / 2.0;
                a.solid.pos.distance_squared(projectile.pos) < radius * radius
            })
            .map(|a| a.id)
    }

    fn beam_rays(&self, dt: f64) -> Vec<BeamRay> {
        let mut rays = Vec::new();
        for actor in self.actors.iter().filter(|a| !a.is_disabled()) {
            for slot in actor.slots.iter().filter(|s| s.beam_on()) {
                let Some(OutfitKind::Beam(beam)) = slot.outfit.as_ref().map(|o| &o.kind) else {
                    continue;
                };
                let target = self.actors.get(actor.target).filter(|_| actor.has_target());
                let heading = match target {
                    Some(t) if beam.turret => heading_of(t.solid.pos - actor.solid.pos),
                    _ => actor.solid.dir,
                };
                rays.push(BeamRay {
                    shooter: actor.id,
                    origin: actor.solid.pos,
                    dir: from_polar(1.0, heading),
                    range: beam.range,
                    damage: beam.damage * dt,
                    damage_type: beam.damage_type,
                });
            }
        }
        rays
    }

    /// Nearest actor along the ray.
    fn beam_victim(&self, ray: &BeamRay) -> Option<ActorId> {
        let faction = self.actors.get(ray.shooter)?.faction;
        let target = self.actors.get(ray.shooter)?.target;
        self.actors
            .iter()
            .filter(|a| self.can_strike(ray.shooter, faction, target, a))
            .filter_map(|a| {
                let rel = a.solid.pos - ray.origin;
                let along = rel.dot(ray.dir);
                if along < 0.0 || along > ray.range {
                    return None;
                }
                let radius = HIT_SIZE * a.hull.size / 2.0;
                let off = (rel - ray.dir * along).length();
                (off < radius).then_some((along, a.id))
            })
            .min_by(|x, y| x.0.total_cmp(&y.0))
            .map(|(_, id)| id)
    }
}
