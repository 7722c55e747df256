//! Carrier orders and docking.

use rhai::{Engine, INT};

use super::actor_id;
use crate::ai::bridge::Bridge;
use crate::world::EscortOrder;

pub(super) fn register(engine: &mut Engine, bridge: &Bridge) {
    let orders = [
        ("e_attack", EscortOrder::Attack),
        ("e_hold", EscortOrder::Hold),
        ("e_clear", EscortOrder::Clear),
        ("e_return", EscortOrder::Return),
    ];
    for (name, order) in orders {
        let b = bridge.clone();
        engine.register_fn(name, move || b.with(|world, ctx| world.order_escorts(ctx.actor, order)));
    }

    let b = bridge.clone();
    engine.register_fn("dock", move |carrier: INT| b.with(|world, ctx| world.dock(ctx.actor, actor_id(carrier))));
}
