//! Read-only queries about the acting pilot, other actors and the system.

use rhai::{Dynamic, Engine, INT};

use super::{Fallible, actor_id, fault, id_or_zero, id_value, lookup, or_unit};
use crate::actor::{Actor, ActorId};
use crate::ai::bridge::Bridge;
use crate::catalog::SlotClass;
use crate::geom::{DVec2, MIN_VEL_ERR};
use crate::world::World;

type ActorQuery = fn(&World, &Actor) -> Dynamic;
type PairQuery = fn(&World, &Actor, &Actor) -> Dynamic;

/// Answer `f` for the acting pilot, or for `id` when given.
fn on_actor(bridge: &Bridge, id: Option<INT>, f: ActorQuery) -> Fallible<Dynamic> {
    bridge.with(|world, ctx| {
        let id = id.map_or(ctx.actor, actor_id);
        lookup(world, ctx, id).map_or(Dynamic::UNIT, |actor| f(world, actor))
    })
}

/// Answer `f` for the acting pilot and actor `id`.
fn on_pair(bridge: &Bridge, id: INT, f: PairQuery) -> Fallible<Dynamic> {
    bridge.with(|world, ctx| {
        let me_id = ctx.actor;
        let me = lookup(world, ctx, me_id);
        let other = lookup(world, ctx, actor_id(id));
        match (me, other) {
            (Some(me), Some(other)) => f(world, me, other),
            _ => Dynamic::UNIT,
        }
    })
}

/// Register `name()` for the acting pilot and `name(id)` for another actor.
fn self_or_other(engine: &mut Engine, bridge: &Bridge, name: &str, f: ActorQuery) {
    let b = bridge.clone();
    engine.register_fn(name, move || on_actor(&b, None, f));
    let b = bridge.clone();
    engine.register_fn(name, move |id: INT| on_actor(&b, Some(id), f));
}

fn self_only(engine: &mut Engine, bridge: &Bridge, name: &str, f: ActorQuery) {
    let b = bridge.clone();
    engine.register_fn(name, move || on_actor(&b, None, f));
}

fn pair(engine: &mut Engine, bridge: &Bridge, name: &str, f: PairQuery) {
    let b = bridge.clone();
    engine.register_fn(name, move |id: INT| on_pair(&b, id, f));
}

/// Range of the selected secondary: the ammunition's reach for launchers,
/// the weapon's own otherwise. Falls back to the primary range.
fn secondary_range(world: &World, actor: &Actor) -> f64 {
    let Some(slot) = actor.secondary.and_then(|i| actor.slots.get(i)) else {
        return actor.stats.weap_range;
    };
    let Some(outfit) = slot.outfit.as_ref() else {
        return actor.stats.weap_range;
    };
    if outfit.is_launcher() {
        slot.ammo()
            .and_then(|state| state.ammo.clone())
            .or_else(|| world.catalog.ammo_for(outfit))
            .map_or(0.0, |ammo| ammo.range())
    } else {
        outfit.range()
    }
}

fn has_turrets(actor: &Actor) -> bool {
    actor
        .slots
        .iter()
        .filter(|slot| slot.class == SlotClass::High)
        .any(|slot| slot.outfit.as_ref().is_some_and(|o| o.is_turret()))
}

pub(super) fn register(engine: &mut Engine, bridge: &Bridge) {
    engine.register_fn("player", || id_value(ActorId::PLAYER));

    self_or_other(engine, bridge, "armour", |_, a| Dynamic::from(a.pools.armour));
    self_or_other(engine, bridge, "shield", |_, a| Dynamic::from(a.pools.shield));
    self_or_other(engine, bridge, "parmour", |_, a| Dynamic::from(a.armour_pct()));
    self_or_other(engine, bridge, "pshield", |_, a| Dynamic::from(a.shield_pct()));
    self_or_other(engine, bridge, "pos", |_, a| Dynamic::from(a.solid.pos));
    self_or_other(engine, bridge, "shipclass", |_, a| Dynamic::from(a.hull.class.clone()));
    self_or_other(engine, bridge, "shipmass", |_, a| Dynamic::from(a.solid.mass));
    self_or_other(engine, bridge, "incombat", |_, a| Dynamic::from(a.flags.combat));
    self_or_other(engine, bridge, "isdisabled", |_, a| Dynamic::from(a.is_disabled()));
    self_or_other(engine, bridge, "canboard", |_, a| Dynamic::from(a.is_disabled() && !a.flags.logistics.boarded));

    self_only(engine, bridge, "minbrakedist", |w, a| or_unit(w.min_brake_dist(a.id, None)));
    self_only(engine, bridge, "cargofree", |_, a| Dynamic::from(INT::from(a.cargo.free())));
    self_only(engine, bridge, "ismaxvel", |_, a| Dynamic::from(a.solid.speed() > a.stats.speed - MIN_VEL_ERR));
    self_only(engine, bridge, "isstopped", |_, a| Dynamic::from(a.solid.speed() < MIN_VEL_ERR));
    self_only(engine, bridge, "haslockon", |_, a| Dynamic::from(a.lockons > 0));
    self_only(engine, bridge, "hasturrets", |_, a| Dynamic::from(has_turrets(a)));
    self_only(engine, bridge, "getweaprange", |_, a| Dynamic::from(a.stats.weap_range));
    self_only(engine, bridge, "getenemy", |w, a| Dynamic::from(id_or_zero(w.nearest_enemy(a.id))));
    self_only(engine, bridge, "nearestpilot", |w, a| Dynamic::from(id_or_zero(w.nearest_pilot(a.id))));
    self_only(engine, bridge, "nearestplanet", |w, a| or_unit(w.nearest_friendly_planet(a.id).map(Dynamic::from)));

    pair(engine, bridge, "minbrakedist", |w, me, other| or_unit(w.min_brake_dist(me.id, Some(other.id))));
    pair(engine, bridge, "getstanding", |w, me, other| or_unit(w.standing(me.id, other.id)));
    pair(engine, bridge, "isenemy", |w, me, other| or_unit(w.is_enemy(me.id, other.id)));
    pair(engine, bridge, "isally", |w, me, other| or_unit(w.is_ally(me.id, other.id)));
    pair(engine, bridge, "relvel", |w, me, other| or_unit(w.rel_vel(me.id, other.id)));

    let b = bridge.clone();
    engine.register_fn("getweaprange", move |secondary: bool| {
        let f: ActorQuery = if secondary {
            |w, a| Dynamic::from(secondary_range(w, a))
        } else {
            |_, a| Dynamic::from(a.stats.weap_range)
        };
        on_actor(&b, None, f)
    });

    let b = bridge.clone();
    engine.register_fn("isbribed", move |id: INT| -> Fallible<bool> {
        b.with(|world, ctx| actor_id(id) == ActorId::PLAYER && world.actor(ctx.actor).is_some_and(|a| a.flags.stance.bribed))
    });

    let b = bridge.clone();
    engine.register_fn("exists", move |id: INT| -> Fallible<bool> {
        b.with(|world, _| world.actor(actor_id(id)).is_some_and(|a| !a.is_dead()))
    });

    let b = bridge.clone();
    engine.register_fn("dist", move |target: Dynamic| -> Fallible<Dynamic> {
        b.try_with(|world, ctx| {
            let me_id = ctx.actor;
            let Some(me) = lookup(world, ctx, me_id) else {
                return Ok(Dynamic::UNIT);
            };
            let here = me.solid.pos;
            if let Some(point) = target.clone().try_cast::<DVec2>() {
                return Ok(Dynamic::from(here.distance(point)));
            }
            let id = target.as_int().map_err(|t| fault(format!("dist: expected an actor id or vec2, got {t}")))?;
            Ok(lookup(world, ctx, actor_id(id)).map_or(Dynamic::UNIT, |other| Dynamic::from(here.distance(other.solid.pos))))
        })
    });

    let b = bridge.clone();
    engine.register_fn("rndpilot", move || -> Fallible<INT> { b.with(|world, ctx| id_or_zero(world.random_pilot(ctx.actor))) });

    let b = bridge.clone();
    engine.register_fn("rndplanet", move || -> Fallible<Dynamic> { b.with(|world, _| or_unit(world.random_planet().map(Dynamic::from))) });

    let b = bridge.clone();
    engine.register_fn("landplanet", move || -> Fallible<Dynamic> {
        b.with(|world, ctx| or_unit(world.landing_planet(ctx.actor).map(Dynamic::from)))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::fixtures::{place, world};

    #[test]
    fn test_secondary_range_uses_ammo() {
        let mut world = world();
        let id = place(&mut world, DVec2::ZERO);
        let catalog = world.catalog.clone();
        let actor = world.actor_mut(id).unwrap();
        actor.add_outfit(3, catalog.outfit("Launcher").unwrap()).unwrap();
        actor.fill_ammo(&catalog);
        actor.secondary = Some(3);
        let missile = catalog.outfit("Missile").unwrap();

        let actor = world.actor(id).unwrap();
        assert!((secondary_range(&world, actor) - missile.range()).abs() < 1e-9);
    }

    #[test]
    fn test_secondary_range_falls_back_to_primary() {
        let mut world = world();
        let id = place(&mut world, DVec2::ZERO);
        world.actor_mut(id).unwrap().stats.weap_range = 300.0;
        let actor = world.actor(id).unwrap();
        assert!((secondary_range(&world, actor) - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_turret_detection() {
        let mut world = world();
        let id = place(&mut world, DVec2::ZERO);
        assert!(!has_turrets(world.actor(id).unwrap()));
        let beam = world.catalog.outfit("Pulse Beam").unwrap();
        world.actor_mut(id).unwrap().add_outfit(3, beam).unwrap();
        assert!(has_turrets(world.actor(id).unwrap()));
    }
}
