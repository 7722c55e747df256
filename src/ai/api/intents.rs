//! Movement, targeting, weapons, stance and logistics.
//!
//! Steering and firing capabilities only record intents in the running
//! context; the host applies them after the routine returns. Everything else
//! acts on the world immediately.

use std::f64::consts::PI;

use rhai::{Array, Dynamic, Engine, INT};

use super::{Fallible, actor_id, fault, lookup, number_arg};
use crate::actor::{Actor, ActorId};
use crate::ai::TIMER_COUNT;
use crate::ai::bridge::Bridge;
use crate::ai::context::ThinkContext;
use crate::catalog::{Outfit, SlotClass};
use crate::combat::weapons::{FireMode, secondary_lead_speed};
use crate::faction::PLAYER_FACTION;
use crate::geom::{DVec2, MAX_DIR_ERR, MIN_VEL_ERR, TURN_GAIN, angle_diff, heading_of};
use crate::hyperspace::Engage;
use crate::world::World;

/// What `face` turns towards.
enum Facing {
    Point(DVec2),
    Actor(INT),
}

impl Facing {
    fn parse(value: &Dynamic) -> Fallible<Self> {
        if let Some(point) = value.clone().try_cast::<DVec2>() {
            return Ok(Self::Point(point));
        }
        value
            .as_int()
            .map(Self::Actor)
            .map_err(|t| fault(format!("face: expected an actor id or vec2, got {t}")))
    }
}

/// Secondary weapon roles `secondary()` can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Melee,
    Ranged,
}

impl Role {
    fn parse(name: &str) -> Fallible<Self> {
        match name {
            "melee" => Ok(Self::Melee),
            "ranged" => Ok(Self::Ranged),
            other => Err(fault(format!("secondary: unknown role '{other}'"))),
        }
    }

    fn accepts(self, outfit: &Outfit, ammo: Option<&Outfit>) -> bool {
        match self {
            Self::Melee => outfit.is_bolt() || outfit.is_beam() || (outfit.is_launcher() && ammo.is_some_and(|a| !a.is_smart_ammo())),
            Self::Ranged => outfit.is_fighter_bay() || (outfit.is_launcher() && ammo.is_some_and(Outfit::is_smart_ammo)),
        }
    }
}

/// Bearing-to-turn with the usual gain; returns the absolute error in degrees.
fn steer_towards(ctx: &mut ThinkContext, dir: f64, bearing: f64, gain: f64) -> f64 {
    let diff = angle_diff(dir, bearing);
    ctx.intents.turn = gain * diff;
    diff.abs().to_degrees()
}

fn face(world: &World, ctx: &mut ThinkContext, facing: &Facing, invert: bool) -> Dynamic {
    let me_id = ctx.actor;
    let Some(me) = lookup(world, ctx, me_id) else {
        return Dynamic::UNIT;
    };
    let (pos, dir) = (me.solid.pos, me.solid.dir);
    let bearing = match *facing {
        Facing::Point(point) => heading_of(point - pos),
        Facing::Actor(n) if n < 0 => heading_of(pos),
        Facing::Actor(n) => match lookup(world, ctx, actor_id(n)) {
            Some(target) => heading_of(target.solid.pos - pos),
            None => return Dynamic::UNIT,
        },
    };
    let gain = if invert { -TURN_GAIN } else { TURN_GAIN };
    Dynamic::from(steer_towards(ctx, dir, bearing, gain))
}

/// Turn so that a shot fired now meets `target` where it will be.
fn aim(world: &World, ctx: &mut ThinkContext, target: ActorId) -> Dynamic {
    let me_id = ctx.actor;
    let (Some(me), Some(them)) = (lookup(world, ctx, me_id), lookup(world, ctx, target)) else {
        return Dynamic::UNIT;
    };
    let mut speed = me.stats.weap_speed;
    if let Some(lead) = secondary_lead_speed(me) {
        speed = (speed + lead) / 2.0;
    }
    let dist = me.solid.pos.distance(them.solid.pos);
    let time = if speed > 0.0 { dist / speed } else { 0.0 };
    let intercept = (them.solid.pos + them.solid.vel * time) - (me.solid.pos + me.solid.vel * time);
    let dir = me.solid.dir;
    Dynamic::from(steer_towards(ctx, dir, heading_of(intercept), TURN_GAIN))
}

/// Point the engines against the velocity and thrust once aligned.
fn brake(me: &Actor, ctx: &mut ThinkContext) {
    let vel = me.solid.vel;
    let diff = angle_diff(me.solid.dir + PI, heading_of(vel));
    ctx.intents.turn = TURN_GAIN * diff;
    if diff.abs() < MAX_DIR_ERR && vel.length() > MIN_VEL_ERR {
        ctx.intents.thrust = 1.0;
    }
}

/// Describe a secondary for scripts: broad type, then turret/smart/dumb,
/// then the rounds aboard for ammunition users.
fn describe(outfit: &Outfit, ammo: Option<&Outfit>, quantity: u32) -> Array {
    let mut out = Array::new();
    let broad = if outfit.is_bolt() {
        "Bolt Cannon"
    } else if outfit.is_beam() {
        "Beam Cannon"
    } else if outfit.is_launcher() {
        "Launcher"
    } else {
        "Fighter Bay"
    };
    out.push(broad.into());
    if outfit.is_turret() {
        out.push("Turret".into());
    } else if outfit.is_launcher() {
        let guidance = if ammo.is_some_and(Outfit::is_smart_ammo) { "Smart" } else { "Dumb" };
        out.push(guidance.into());
    }
    if outfit.uses_ammo() {
        out.push(Dynamic::from_int(INT::from(quantity)));
    }
    out
}

/// Select a secondary of `role`, keeping the current one when it fits.
fn select_secondary(world: &mut World, id: ActorId, role: Role) -> Array {
    let catalog = world.catalog.clone();
    let Some(actor) = world.actor_mut(id) else {
        return Array::new();
    };
    let matches = |index: usize| {
        let slot = &actor.slots[index];
        let Some(outfit) = slot.outfit.as_deref() else {
            return false;
        };
        if slot.class != SlotClass::High || !outfit.is_secondary() {
            return false;
        }
        let ammo = slot.ammo().and_then(|a| a.ammo.clone()).or_else(|| catalog.ammo_for(outfit));
        role.accepts(outfit, ammo.as_deref())
    };
    let current = actor.secondary.filter(|&i| i < actor.slots.len() && matches(i));
    let Some(index) = current.or_else(|| (0..actor.slots.len()).find(|&i| matches(i))) else {
        return Array::new();
    };
    actor.secondary = Some(index);

    let slot = &actor.slots[index];
    let Some(outfit) = slot.outfit.as_deref() else {
        return Array::new();
    };
    let ammo = slot.ammo().and_then(|a| a.ammo.clone()).or_else(|| catalog.ammo_for(outfit));
    describe(outfit, ammo.as_deref(), slot.ammo_quantity())
}

fn timer_index(n: INT) -> Fallible<usize> {
    usize::try_from(n)
        .ok()
        .filter(|&i| i < TIMER_COUNT)
        .ok_or_else(|| fault(format!("timer {n} out of range (0..{TIMER_COUNT})")))
}

fn register_steering(engine: &mut Engine, bridge: &Bridge) {
    let b = bridge.clone();
    engine.register_fn("accel", move || b.with(|_, ctx| ctx.intents.thrust = 1.0));

    let b = bridge.clone();
    engine.register_fn("accel", move |fraction: Dynamic| -> Fallible<()> {
        let fraction = number_arg(&fraction, "accel")?.clamp(0.0, 1.0);
        b.with(|world, ctx| {
            if let Some(me) = world.actor(ctx.actor) {
                ctx.intents.thrust = if me.solid.speed() > fraction * me.stats.speed { 0.0 } else { 1.0 };
            }
        })
    });

    let b = bridge.clone();
    engine.register_fn("turn", move |amount: Dynamic| -> Fallible<()> {
        let amount = number_arg(&amount, "turn")?;
        b.with(|_, ctx| ctx.intents.turn = amount)
    });

    let b = bridge.clone();
    engine.register_fn("face", move |target: Dynamic| -> Fallible<Dynamic> {
        let facing = Facing::parse(&target)?;
        b.with(|world, ctx| face(world, ctx, &facing, false))
    });

    let b = bridge.clone();
    engine.register_fn("face", move |target: Dynamic, invert: bool| -> Fallible<Dynamic> {
        let facing = Facing::parse(&target)?;
        b.with(|world, ctx| face(world, ctx, &facing, invert))
    });

    let b = bridge.clone();
    engine.register_fn("aim", move |target: INT| b.with(|world, ctx| aim(world, ctx, actor_id(target))));

    let b = bridge.clone();
    engine.register_fn("brake", move || {
        b.with(|world, ctx| {
            if let Some(me) = world.actor(ctx.actor) {
                brake(me, ctx);
            }
        })
    });

    let b = bridge.clone();
    engine.register_fn("stop", move || {
        b.with(|world, ctx| {
            if let Some(me) = world.actor_mut(ctx.actor) {
                if me.solid.speed() < MIN_VEL_ERR {
                    me.solid.vel = DVec2::ZERO;
                }
            }
        })
    });

    let b = bridge.clone();
    engine.register_fn("hyperspace", move || {
        b.with(|world, ctx| match world.engage_hyperspace(ctx.actor) {
            None | Some(Engage::Started) => Dynamic::UNIT,
            Some(Engage::TooClose(remaining)) => Dynamic::from(remaining),
            Some(Engage::NoFuel) => Dynamic::from(-1.0),
        })
    });

    let b = bridge.clone();
    engine.register_fn("hyp_abort", move || b.with(|world, ctx| world.abort_hyperspace(ctx.actor)));
}

fn register_weapons(engine: &mut Engine, bridge: &Bridge) {
    let b = bridge.clone();
    engine.register_fn("shoot", move || b.with(|_, ctx| ctx.intents.primary = true));

    let b = bridge.clone();
    engine.register_fn("shoot", move |secondary: bool| {
        b.with(|_, ctx| {
            if secondary {
                ctx.intents.secondary = true;
            } else {
                ctx.intents.primary = true;
            }
        })
    });

    let b = bridge.clone();
    engine.register_fn("shoot", move |secondary: bool, mode: INT| {
        b.with(|_, ctx| {
            if secondary {
                ctx.intents.secondary = true;
            } else {
                ctx.intents.primary = true;
            }
            ctx.intents.mode = FireMode::from_index(mode);
        })
    });

    let b = bridge.clone();
    engine.register_fn("shoot_stop", move || b.with(|world, ctx| world.stop_firing(ctx.actor, false)));

    let b = bridge.clone();
    engine.register_fn("shoot_stop", move |secondary: bool| b.with(|world, ctx| world.stop_firing(ctx.actor, secondary)));

    let b = bridge.clone();
    engine.register_fn("secondary", move |role: &str| -> Fallible<Array> {
        let role = Role::parse(role)?;
        b.with(|world, ctx| select_secondary(world, ctx.actor, role))
    });

    let b = bridge.clone();
    engine.register_fn("settarget", move |target: INT| {
        b.with(|world, ctx| {
            let target = actor_id(target);
            if lookup(world, ctx, target).is_some() {
                if let Some(me) = world.actor_mut(ctx.actor) {
                    me.target = target;
                }
            }
        })
    });
}

fn register_stance(engine: &mut Engine, bridge: &Bridge) {
    let b = bridge.clone();
    engine.register_fn("combat", move || {
        b.with(|world, ctx| {
            if let Some(me) = world.actor_mut(ctx.actor) {
                me.flags.combat = true;
            }
        })
    });

    let b = bridge.clone();
    engine.register_fn("combat", move |on: bool| {
        b.with(|world, ctx| {
            if let Some(me) = world.actor_mut(ctx.actor) {
                me.flags.combat = on;
            }
        })
    });

    let b = bridge.clone();
    engine.register_fn("hostile", move |target: INT| {
        b.with(|world, ctx| {
            let is_player_side = lookup(world, ctx, actor_id(target)).is_some_and(|t| t.faction == PLAYER_FACTION);
            if let Some(me) = world.actor_mut(ctx.actor).filter(|_| is_player_side) {
                me.flags.stance.hostile = true;
                me.flags.stance.friendly = false;
            }
        })
    });
}

fn register_logistics(engine: &mut Engine, bridge: &Bridge) {
    let b = bridge.clone();
    engine.register_fn("board", move || b.with(|world, ctx| world.board_start(ctx.actor)));

    let b = bridge.clone();
    engine.register_fn("refuel", move || b.with(|world, ctx| world.refuel_start(ctx.actor)));

    let b = bridge.clone();
    engine.register_fn("donerefuel", move || {
        b.with(|world, ctx| world.actor(ctx.actor).is_none_or(|me| !me.flags.logistics.refueling))
    });

    let b = bridge.clone();
    engine.register_fn("settimer", move |n: INT, ms: Dynamic| -> Fallible<()> {
        let index = timer_index(n)?;
        let seconds = number_arg(&ms, "settimer")? / 1000.0;
        b.with(|world, ctx| {
            if let Some(behavior) = world.actor_mut(ctx.actor).and_then(|a| a.behavior.as_mut()) {
                behavior.timers[index] = seconds;
            }
        })
    });

    let b = bridge.clone();
    engine.register_fn("timeup", move |n: INT| -> Fallible<bool> {
        let index = timer_index(n)?;
        b.with(|world, ctx| {
            world
                .actor(ctx.actor)
                .and_then(|a| a.behavior.as_ref())
                .is_some_and(|behavior| behavior.timers[index] < 0.0)
        })
    });
}

pub(super) fn register(engine: &mut Engine, bridge: &Bridge) {
    register_steering(engine, bridge);
    register_weapons(engine, bridge);
    register_stance(engine, bridge);
    register_logistics(engine, bridge);
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::ai::Mode;
    use crate::world::fixtures::{place, world};

    fn ctx(id: ActorId) -> ThinkContext {
        ThinkContext::new(id, Mode::Normal)
    }

    #[test]
    fn test_face_point_sets_turn() {
        let mut world = world();
        let me = place(&mut world, DVec2::ZERO);
        world.actor_mut(me).unwrap().solid.dir = 0.0;
        let mut ctx = ctx(me);
        let degrees = face(&world, &mut ctx, &Facing::Point(DVec2::new(0.0, 100.0)), false);
        assert_relative_eq!(degrees.as_float().unwrap(), 90.0, epsilon = 1e-9);
        assert_relative_eq!(ctx.intents.turn, TURN_GAIN * PI / 2.0, epsilon = 1e-9);

        let _ = face(&world, &mut ctx, &Facing::Point(DVec2::new(0.0, 100.0)), true);
        assert!(ctx.intents.turn < 0.0);
    }

    #[test]
    fn test_face_missing_actor_is_unit() {
        let mut world = world();
        let me = place(&mut world, DVec2::ZERO);
        let mut ctx = ctx(me);
        assert!(face(&world, &mut ctx, &Facing::Actor(99), false).is_unit());
        assert_relative_eq!(ctx.intents.turn, 0.0);
    }

    #[test]
    fn test_aim_leads_moving_target() {
        let mut world = world();
        let me = place(&mut world, DVec2::ZERO);
        let them = place(&mut world, DVec2::new(100.0, 0.0));
        world.actor_mut(me).unwrap().stats.weap_speed = 100.0;
        world.actor_mut(them).unwrap().solid.vel = DVec2::new(0.0, 100.0);
        let mut ctx = ctx(me);
        let degrees = aim(&world, &mut ctx, them).as_float().unwrap();
        // One second of flight: the intercept point is (100, 100).
        assert_relative_eq!(degrees, 45.0, epsilon = 1e-9);
        assert!(ctx.intents.turn > 0.0);
    }

    #[test]
    fn test_brake_thrusts_only_when_aligned() {
        let mut world = world();
        let me = place(&mut world, DVec2::ZERO);
        let actor = world.actor_mut(me).unwrap();
        actor.solid.vel = DVec2::new(50.0, 0.0);
        actor.solid.dir = 0.0;
        let mut ctx = ctx(me);
        brake(world.actor(me).unwrap(), &mut ctx);
        assert_relative_eq!(ctx.intents.thrust, 0.0);

        world.actor_mut(me).unwrap().solid.dir = PI;
        let mut ctx = ThinkContext::new(me, Mode::Normal);
        brake(world.actor(me).unwrap(), &mut ctx);
        assert_relative_eq!(ctx.intents.thrust, 1.0);
    }

    #[test]
    fn test_secondary_selection_by_role() {
        let mut world = world();
        let me = place(&mut world, DVec2::ZERO);
        let catalog = world.catalog.clone();
        let actor = world.actor_mut(me).unwrap();
        actor.add_outfit(3, catalog.outfit("Launcher").unwrap()).unwrap();
        actor.fill_ammo(&catalog);

        let ranged = select_secondary(&mut world, me, Role::Ranged);
        assert_eq!(ranged[0].clone().into_string().unwrap(), "Launcher");
        assert_eq!(ranged[1].clone().into_string().unwrap(), "Smart");
        assert_eq!(ranged[2].as_int(), Ok(4));
        assert_eq!(world.actor(me).unwrap().secondary, Some(3));

        assert!(select_secondary(&mut world, me, Role::Melee).is_empty());
    }

    #[test]
    fn test_role_and_timer_validation() {
        assert!(Role::parse("melee").is_ok());
        assert!(Role::parse("sniper").is_err());
        assert_eq!(timer_index(1).unwrap(), 1);
        assert!(timer_index(2).is_err());
        assert!(timer_index(-1).is_err());
    }
}
