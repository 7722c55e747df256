//! The capability surface: every function a behavior routine can call.
//!
//! Capabilities are grouped by concern, one registration function per
//! submodule. Each closure holds a clone of the [`Bridge`] and reaches the
//! world only through it, so calling one outside a running routine fails
//! instead of touching stale state.
//!
//! Actor ids cross the script boundary as integers. A capability given an id
//! that does not name a live actor returns `()` and logs the id once per
//! invocation.

mod comms;
mod escort;
mod intents;
mod loot;
mod queries;
mod tasks;
mod vector;

use rhai::{Dynamic, Engine, EvalAltResult, INT};
use tracing::debug;

use super::bridge::Bridge;
use super::context::ThinkContext;
use crate::actor::{Actor, ActorId};
use crate::world::World;

/// Result type of a capability that can fault.
pub(crate) type Fallible<T> = Result<T, Box<EvalAltResult>>;

/// Register every capability on `engine`.
pub(crate) fn register_all(engine: &mut Engine, bridge: &Bridge) {
    vector::register(engine);
    tasks::register(engine, bridge);
    queries::register(engine, bridge);
    intents::register(engine, bridge);
    escort::register(engine, bridge);
    comms::register(engine, bridge);
    loot::register(engine, bridge);
}

/// A script number as `f64`, accepting both integers and floats.
pub(crate) fn as_number(value: &Dynamic) -> Option<f64> {
    value.as_float().ok().or_else(|| value.as_int().ok().map(|n| n as f64))
}

/// A script integer as an actor id. Out-of-range values map to `NONE`,
/// which never names an actor.
pub(crate) fn actor_id(n: INT) -> ActorId {
    u32::try_from(n).map_or(ActorId::NONE, ActorId)
}

/// An actor id as a script integer.
pub(crate) fn id_value(id: ActorId) -> INT {
    INT::from(id.0)
}

/// An optional actor id as a script value: the id, or 0 for none.
pub(crate) fn id_or_zero(id: Option<ActorId>) -> INT {
    id.map_or(0, id_value)
}

/// A script fault with `message`.
pub(crate) fn fault(message: impl AsRef<str>) -> Box<EvalAltResult> {
    message.as_ref().into()
}

/// A script number argument, or a fault naming the capability.
pub(crate) fn number_arg(value: &Dynamic, capability: &str) -> Fallible<f64> {
    as_number(value).ok_or_else(|| fault(format!("{capability}: expected a number, got {}", value.type_name())))
}

/// Look up `id`, logging the first miss in this invocation.
pub(crate) fn lookup<'w>(world: &'w World, ctx: &mut ThinkContext, id: ActorId) -> Option<&'w Actor> {
    let found = world.actor(id);
    if found.is_none() && ctx.report_missing(id) {
        debug!(actor = %ctx.actor, missing = %id, "capability_unknown_actor");
    }
    found
}

/// `Some(value)` as a script value, `None` as `()`.
pub(crate) fn or_unit(value: Option<impl Into<Dynamic>>) -> Dynamic {
    value.map_or(Dynamic::UNIT, Into::into)
}
