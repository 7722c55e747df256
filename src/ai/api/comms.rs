//! Messages, broadcasts, distress calls and script output.

use rhai::{Engine, INT};
use tracing::{debug, info};

use super::actor_id;
use crate::ai::bridge::Bridge;

pub(super) fn register(engine: &mut Engine, bridge: &Bridge) {
    engine.on_print(|text| info!(target: "wingman::script", text, "script_print"));
    engine.on_debug(|text, source, pos| debug!(target: "wingman::script", text, source, %pos, "script_debug"));

    let b = bridge.clone();
    engine.register_fn("comm", move |to: INT, text: &str| b.with(|world, ctx| world.comm(ctx.actor, actor_id(to), text)));

    let b = bridge.clone();
    engine.register_fn("broadcast", move |text: &str| b.with(|world, ctx| world.broadcast(ctx.actor, text)));

    let b = bridge.clone();
    engine.register_fn("distress", move || b.with(|_, ctx| ctx.intents.distress = Some(String::new())));

    let b = bridge.clone();
    engine.register_fn("distress", move |text: &str| b.with(|_, ctx| ctx.intents.distress = Some(text.to_string())));
}
