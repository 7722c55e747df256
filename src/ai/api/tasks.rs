//! Task queue control.

use rhai::{Dynamic, Engine, INT};
use tracing::debug;

use super::{Fallible, fault};
use crate::ai::bridge::Bridge;
use crate::ai::context::ThinkContext;
use crate::ai::task::{IDLE_TASK, Task, TaskPayload};
use crate::ai::Behavior;
use crate::world::World;

fn behavior<'w>(world: &'w mut World, ctx: &ThinkContext) -> Fallible<&'w mut Behavior> {
    world
        .actor_mut(ctx.actor)
        .and_then(|a| a.behavior.as_mut())
        .ok_or_else(|| fault("actor has no behavior"))
}

fn payload(value: &Dynamic) -> Fallible<TaskPayload> {
    if value.is_unit() {
        Ok(TaskPayload::None)
    } else if let Ok(n) = value.as_int() {
        Ok(TaskPayload::Integer(n))
    } else {
        Err(fault(format!("pushtask: payload must be an integer, got {}", value.type_name())))
    }
}

fn push(bridge: &Bridge, position: INT, name: &str, payload: TaskPayload) -> Fallible<()> {
    bridge.try_with(|world, ctx| {
        behavior(world, ctx)?.tasks.push(position, Task::new(name, payload));
        Ok(())
    })
}

pub(super) fn register(engine: &mut Engine, bridge: &Bridge) {
    let b = bridge.clone();
    engine.register_fn("pushtask", move |position: INT, name: &str| push(&b, position, name, TaskPayload::None));

    let b = bridge.clone();
    engine.register_fn("pushtask", move |position: INT, name: &str, value: Dynamic| -> Fallible<()> {
        push(&b, position, name, payload(&value)?)
    });

    let b = bridge.clone();
    engine.register_fn("poptask", move || -> Fallible<()> {
        b.try_with(|world, ctx| {
            if behavior(world, ctx)?.tasks.pop().is_none() {
                debug!(actor = %ctx.actor, "poptask_on_idle_queue");
            }
            Ok(())
        })
    });

    let b = bridge.clone();
    engine.register_fn("taskname", move || -> Fallible<String> {
        b.with(|world, ctx| {
            world
                .actor(ctx.actor)
                .and_then(|a| a.behavior.as_ref())
                .map_or(IDLE_TASK, |behavior| behavior.tasks.name())
                .to_string()
        })
    });

    let b = bridge.clone();
    engine.register_fn("target", move || -> Fallible<Dynamic> {
        b.with(|world, ctx| {
            world
                .actor(ctx.actor)
                .and_then(|a| a.behavior.as_ref())
                .and_then(|behavior| behavior.tasks.head())
                .map_or(Dynamic::UNIT, |task| task.payload.to_dynamic())
        })
    });
}
