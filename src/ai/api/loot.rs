//! Loot set up by `create`: credits, cargo and the hull's price.
//!
//! These only work while the actor is being created.

use rhai::{Engine, INT};

use super::{Fallible, fault};
use crate::ai::bridge::Bridge;
use crate::ai::context::{Mode, ThinkContext};

fn require_create(ctx: &ThinkContext, capability: &str) -> Fallible<()> {
    if ctx.mode == Mode::Create {
        Ok(())
    } else {
        Err(fault(format!("{capability}: only available in create")))
    }
}

pub(super) fn register(engine: &mut Engine, bridge: &Bridge) {
    let b = bridge.clone();
    engine.register_fn("credits", move |amount: INT| -> Fallible<()> {
        b.try_with(|world, ctx| {
            require_create(ctx, "credits")?;
            if let Some(me) = world.actor_mut(ctx.actor) {
                me.credits = u64::try_from(amount).unwrap_or(0);
            }
            Ok(())
        })
    });

    let b = bridge.clone();
    engine.register_fn("cargo", move |commodity: &str, quantity: INT| -> Fallible<INT> {
        b.try_with(|world, ctx| {
            require_create(ctx, "cargo")?;
            if world.catalog.commodity(commodity).is_none() {
                return Err(fault(format!("cargo: unknown commodity '{commodity}'")));
            }
            let Ok(quantity) = u32::try_from(quantity) else {
                return Ok(0);
            };
            if quantity == 0 {
                return Ok(0);
            }
            Ok(world.actor_mut(ctx.actor).map_or(0, |me| INT::from(me.add_cargo(commodity, quantity))))
        })
    });

    let b = bridge.clone();
    engine.register_fn("shipprice", move || -> Fallible<INT> {
        b.try_with(|world, ctx| {
            require_create(ctx, "shipprice")?;
            Ok(world.actor(ctx.actor).map_or(0, |me| INT::try_from(me.hull.price).unwrap_or(INT::MAX)))
        })
    });
}
