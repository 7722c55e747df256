//! Shield-before-armour damage cascade and the disable/death transitions.

use serde::Serialize;

use crate::actor::{Actor, ActorId, HookKind, HyperspacePhase, LifePhase};
use crate::catalog::DamageType;
use crate::events::{EventLog, WorldEvent};
use crate::geom::DVec2;

/// Fraction of hull armour below which an actor is disabled.
pub const DISABLED_ARMOUR: f64 = 0.3;
/// Player damage fraction above which a victim turns hostile.
pub const HOSTILE_THRESHOLD: f64 = 0.09;
/// Player damage decay per second.
pub const HOSTILE_DECAY: f64 = 0.005;

/// Damage split into its shield and armour parts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DamageSplit {
    /// Damage dealt to shields.
    pub shield: f64,
    /// Damage dealt to armour.
    pub armour: f64,
    /// Knockback multiplier.
    pub knockback: f64,
}

impl DamageSplit {
    /// Split raw damage by type.
    #[must_use]
    pub fn of(damage_type: DamageType, damage: f64) -> Self {
        let (shield, armour, knockback) = match damage_type {
            DamageType::Energy => (1.1, 0.7, 0.1),
            DamageType::Kinetic => (0.8, 1.2, 1.0),
            DamageType::Ion => (1.0, 0.5, 0.4),
            DamageType::Radiation => (0.15, 1.0, 0.0),
            DamageType::Emp => (0.6, 0.2, 0.0),
        };
        Self {
            shield: shield * damage,
            armour: armour * damage,
            knockback,
        }
    }
}

/// The body that struck an actor, for knockback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    /// Velocity of the striking body.
    pub vel: DVec2,
    /// Mass of the striking body.
    pub mass: f64,
}

/// A single hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Attacker.
    pub shooter: ActorId,
    /// Damage kind.
    pub damage_type: DamageType,
    /// Raw damage.
    pub damage: f64,
    /// Striking body, if any.
    pub impact: Option<Impact>,
}

/// State transitions caused by a hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitOutcome {
    /// The hit landed (target was neither dead nor invincible).
    pub landed: bool,
    /// The target became disabled on this hit.
    pub disabled: bool,
    /// The target died on this hit.
    pub killed: bool,
}

/// Apply a hit to `actor`.
///
/// Dead and invincible actors ignore hits entirely. Side effects that involve
/// other actors (faction standing, combat rating) are left to the caller,
/// keyed off the returned [`HitOutcome`].
pub fn apply_hit(actor: &mut Actor, hit: &Hit, events: &mut EventLog) -> HitOutcome {
    let split = DamageSplit::of(hit.damage_type, hit.damage);
    apply_split(actor, hit.damage_type, split, hit.impact, events)
}

/// Apply already-split damage.
pub fn apply_split(
    actor: &mut Actor,
    damage_type: DamageType,
    split: DamageSplit,
    impact: Option<Impact>,
    events: &mut EventLog,
) -> HitOutcome {
    if actor.is_dead() || actor.flags.invincible {
        return HitOutcome::default();
    }
    let mut outcome = HitOutcome { landed: true, ..HitOutcome::default() };
    let (ds, da) = (split.shield, split.armour);
    let pools = &mut actor.pools;
    let stats = &actor.stats;

    let mut dam_mod = 0.0;
    if actor.flags.life.is_disabled() && damage_type == DamageType::Emp {
        // EMP cannot hurt what is already disabled.
    } else if pools.shield - ds > 0.0 {
        pools.shield -= ds;
        dam_mod = ds / stats.shield_max;
    } else if pools.shield > 0.0 {
        // Partial absorb: the armour share shrinks with the shield left.
        pools.armour -= (1.0 - pools.shield / ds) * da;
        pools.shield = 0.0;
        dam_mod = (ds + da) / ((stats.shield_max + stats.armour_max) / 2.0);
    } else if pools.armour > 0.0 {
        pools.armour -= da;
    }

    // Disable is checked before death so the combat rating bonus applies.
    if actor.flags.life == LifePhase::Healthy
        && !actor.flags.player
        && actor.pools.armour < DISABLED_ARMOUR * actor.hull.armour
    {
        disable(actor, events);
        outcome.disabled = true;
    }

    if actor.pools.armour <= 0.0 {
        actor.pools.armour = 0.0;
        dam_mod = 0.0;
        outcome.killed = kill(actor, events);
    } else if actor.pools.shield <= 0.0 && actor.stats.armour_max > 0.0 {
        dam_mod = da / actor.stats.armour_max;
    }

    if let Some(impact) = impact {
        if actor.solid.mass > 0.0 {
            let scale = dam_mod / 9.0 + impact.mass / actor.solid.mass / 6.0;
            actor.solid.vel += impact.vel * (split.knockback * scale);
        }
    }
    outcome
}

/// Move a healthy actor to Disabled. Returns false if it already was.
pub fn disable(actor: &mut Actor, events: &mut EventLog) -> bool {
    if actor.flags.life != LifePhase::Healthy {
        return false;
    }
    // Faction-derived hostility is latched by `World::hit`, which knows the standings.
    actor.flags.life = LifePhase::Disabled;
    actor.flags.afterburner = false;
    events.push(WorldEvent::Disabled { actor: actor.id });
    actor.run_hooks(HookKind::Disable, events);
    true
}

/// Move an actor to Dead and start its death countdown. Returns false if it
/// was already dead.
pub fn kill(actor: &mut Actor, events: &mut EventLog) -> bool {
    if actor.is_dead() {
        return false;
    }
    actor.ptimer = 1.0 + (10.0 * actor.stats.armour_max * actor.stats.shield_max).sqrt() / 1500.0;
    actor.explosion_timer = 0.0;
    if let Some(behavior) = actor.behavior.as_mut() {
        behavior.timers[0] = 0.0;
    }
    actor.flags.hyperspace = HyperspacePhase::Cruising;
    actor.flags.life = LifePhase::Dead {
        sound_played: false,
        exploded: false,
    };
    events.push(WorldEvent::Destroyed { actor: actor.id });
    actor.run_hooks(HookKind::Death, events);
    true
}

/// Mass-based reward used for combat rating and faction penalties.
#[must_use]
pub fn mass_reward(hull_mass: f64) -> f64 {
    hull_mass.powf(0.4) - 1.0
}
