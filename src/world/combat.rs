//! Hits, area explosions and turning behavior intents into fire.

use tracing::debug;

use super::projectiles::Projectile;
use super::{Notification, World};
use crate::actor::ActorId;
use crate::catalog::DamageType;
use crate::combat::damage::{HOSTILE_THRESHOLD, Hit, HitOutcome, Impact, apply_hit, mass_reward};
use crate::combat::weapons::{FireMode, Shot, fire_group, primary_slots, secondary_slots, stop_beams};
use crate::events::WorldEvent;
use crate::faction::PLAYER_FACTION;
use crate::geom::DVec2;

/// What one behavior invocation asked its actor to do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Intents {
    /// Thrust fraction, clamped to `[0, 1]` when applied.
    pub thrust: f64,
    /// Turn fraction, clamped to `[-1, 1]` when applied.
    pub turn: f64,
    /// Fire primaries.
    pub primary: bool,
    /// Fire the selected secondary.
    pub secondary: bool,
    /// Which primaries fire.
    pub mode: FireMode,
    /// Send a distress call with this message (empty for none).
    pub distress: Option<String>,
}

impl World {
    /// Apply a finished invocation's intents to its actor.
    pub fn apply_intents(&mut self, id: ActorId, intents: &Intents) {
        let Some(actor) = self.actors.get_mut(id) else {
            return;
        };
        if actor.is_disabled() {
            return;
        }
        actor.set_controls(intents.thrust, intents.turn);
        if intents.primary {
            self.fire(id, false, intents.mode);
        }
        if intents.secondary {
            self.fire(id, true, FireMode::All);
        }
        if let Some(message) = &intents.distress {
            self.distress(id, message);
        }
    }

    /// Fire the primary group (filtered by `mode`) or the selected
    /// secondary. Returns the number of slots that fired.
    pub fn fire(&mut self, id: ActorId, secondary: bool, mode: FireMode) -> usize {
        let Some(actor) = self.actors.get_mut(id) else {
            return 0;
        };
        if actor.is_disabled() || actor.flags.hyperspace.is_departing() {
            return 0;
        }
        let group = if secondary { secondary_slots(actor) } else { primary_slots(actor, mode) };
        let shots = fire_group(actor, &group);
        let fired = shots.len();
        for shot in shots {
            self.launch(id, shot);
        }
        fired
    }

    /// Switch off the primary or secondary beams.
    pub fn stop_firing(&mut self, id: ActorId, secondary: bool) {
        let Self { actors, events, .. } = self;
        let Some(actor) = actors.get_mut(id) else {
            return;
        };
        for slot in stop_beams(actor, secondary) {
            events.push(WorldEvent::BeamStopped { shooter: id, slot });
        }
    }

    fn launch(&mut self, id: ActorId, shot: Shot) {
        let Some(actor) = self.actors.get(id) else {
            return;
        };
        match shot {
            Shot::Bolt { outfit, .. } => {
                let target = self.actors.get(actor.target).filter(|_| actor.has_target());
                let projectile = Projectile::bolt(actor, &outfit, target);
                self.events.push(WorldEvent::WeaponFired { shooter: id, outfit: outfit.name.clone() });
                self.projectiles.push(projectile);
            }
            Shot::Missile { ammo, .. } => {
                let projectile = Projectile::missile(actor, &ammo);
                if projectile.is_homing() {
                    if let Some(target) = self.actors.get_mut(projectile.target) {
                        target.lockons += 1;
                    }
                }
                self.events.push(WorldEvent::WeaponFired { shooter: id, outfit: ammo.name.clone() });
                self.projectiles.push(projectile);
            }
            Shot::Beam { slot } => {
                self.events.push(WorldEvent::BeamStarted { shooter: id, slot });
            }
            Shot::Fighter { fighter, .. } => {
                self.launch_escort(id, &fighter);
            }
        }
    }

    /// Resolve a hit on `victim`, including the side effects that involve
    /// the shooter: player hostility, combat rating, faction standing and
    /// the victim's `attacked` notification.
    pub fn hit(&mut self, victim: ActorId, hit: &Hit) -> HitOutcome {
        let shooter_faction = self.actors.get(hit.shooter).map(|a| a.faction);
        let was_hostile = self.actors.get(victim).is_some_and(|a| self.is_hostile(a));
        let Self { actors, events, .. } = self;
        let Some(actor) = actors.get_mut(victim) else {
            return HitOutcome::default();
        };
        let outcome = apply_hit(actor, hit, events);
        if !outcome.landed {
            return outcome;
        }
        // A disabled hulk stays hostile even if standings change later.
        if outcome.disabled && was_hostile {
            actor.flags.stance.hostile = true;
        }

        if hit.shooter == ActorId::PLAYER && !actor.is_player() {
            let health = actor.stats.shield_max + actor.stats.armour_max;
            if health > 0.0 {
                actor.player_damage += hit.damage / health;
            }
            if actor.player_damage > HOSTILE_THRESHOLD && !actor.flags.stance.hostile {
                actor.flags.stance.hostile = true;
                actor.flags.stance.friendly = false;
                debug!(actor = %victim, "actor_turned_hostile");
            }
        }

        let reward = mass_reward(actor.hull.mass);
        let faction = actor.faction;
        let reacts = actor.behavior.is_some() && !actor.is_player();

        if shooter_faction == Some(PLAYER_FACTION) {
            if outcome.disabled {
                self.player_rating += 2.0 * reward;
            }
            if outcome.killed {
                self.factions.mod_player(faction, -2.0 * reward);
            }
        }
        if reacts && hit.shooter != victim && shooter_faction.is_some() {
            self.notify(Notification::Attacked { victim, attacker: hit.shooter });
        }
        outcome
    }

    /// Damage every actor within `radius` of `pos`, scaled by distance
    /// (reduced by each actor's size).
    pub fn explode(&mut self, pos: DVec2, radius: f64, damage_type: DamageType, damage: f64, parent: ActorId) {
        let r2 = radius * radius;
        if r2 <= 0.0 {
            return;
        }
        for id in self.actors.ids() {
            let Some(actor) = self.actors.get(id) else {
                continue;
            };
            let rel = actor.solid.pos - pos;
            let size = actor.hull.size;
            let dist = (rel.length_squared() - size * size).max(0.0);
            if dist >= r2 {
                continue;
            }
            let scaled = damage * (1.0 - (dist / r2).sqrt());
            let impact = Impact { vel: rel, mass: scaled * scaled / 30.0 };
            self.hit(id, &Hit { shooter: parent, damage_type, damage: scaled, impact: Some(impact) });
        }
    }
}
