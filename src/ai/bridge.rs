//! Hands the world to capability functions for the length of one call.

use std::cell::RefCell;
use std::rc::Rc;

use rhai::EvalAltResult;

use super::context::ThinkContext;
use crate::world::World;

/// Between invocations `world` is an empty placeholder; during one it is the
/// lent world and `ctx` is set.
#[derive(Debug, Default)]
struct Slot {
    world: World,
    ctx: Option<ThinkContext>,
}

/// Shared slot holding the world while a routine runs.
///
/// The behavior host and every registered capability closure hold a clone.
/// The host [`lend`](Self::lend)s the world before calling into the script
/// and [`reclaim`](Self::reclaim)s it afterwards; capabilities reach it with
/// [`with`](Self::with). At most one loan exists at a time.
///
/// Lending swaps the caller's world with a placeholder built once per
/// bridge, so an invocation never constructs a world.
#[derive(Debug, Clone, Default)]
pub(crate) struct Bridge(Rc<RefCell<Slot>>);

impl Bridge {
    /// Move the world in for one invocation, leaving the placeholder behind.
    /// Refused while another invocation holds the loan, handing the context
    /// back.
    pub(crate) fn lend(&self, world: &mut World, ctx: ThinkContext) -> Result<(), ThinkContext> {
        let Ok(mut slot) = self.0.try_borrow_mut() else {
            return Err(ctx);
        };
        if slot.ctx.is_some() {
            return Err(ctx);
        }
        std::mem::swap(world, &mut slot.world);
        slot.ctx = Some(ctx);
        Ok(())
    }

    /// Put the world back after the invocation and return the context.
    pub(crate) fn reclaim(&self, world: &mut World) -> Option<ThinkContext> {
        let mut slot = self.0.try_borrow_mut().ok()?;
        let ctx = slot.ctx.take()?;
        std::mem::swap(world, &mut slot.world);
        Some(ctx)
    }

    /// Whether a routine is running.
    #[cfg(test)]
    pub(crate) fn is_lent(&self) -> bool {
        self.0.try_borrow().is_ok_and(|slot| slot.ctx.is_some())
    }

    /// Run `f` against the lent world. Fails outside an invocation.
    pub(crate) fn with<T>(&self, f: impl FnOnce(&mut World, &mut ThinkContext) -> T) -> Result<T, Box<EvalAltResult>> {
        let mut slot = self
            .0
            .try_borrow_mut()
            .map_err(|_| Box::<EvalAltResult>::from("capability called re-entrantly"))?;
        let Slot { world, ctx } = &mut *slot;
        let ctx = ctx
            .as_mut()
            .ok_or_else(|| Box::<EvalAltResult>::from("capability called outside a behavior routine"))?;
        Ok(f(world, ctx))
    }

    /// [`with`](Self::with) for capabilities that can fault themselves.
    pub(crate) fn try_with<T>(
        &self,
        f: impl FnOnce(&mut World, &mut ThinkContext) -> Result<T, Box<EvalAltResult>>,
    ) -> Result<T, Box<EvalAltResult>> {
        self.with(f)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorId;
    use crate::ai::Mode;

    #[test]
    fn test_second_loan_is_refused() {
        let bridge = Bridge::default();
        let mut world = World::default();
        world.time = 5.0;
        assert!(bridge.lend(&mut world, ThinkContext::new(ActorId(2), Mode::Normal)).is_ok());
        let mut other = World::default();
        let refused = bridge.lend(&mut other, ThinkContext::new(ActorId(3), Mode::Normal));
        assert_eq!(refused.map_err(|ctx| ctx.actor), Err(ActorId(3)));
        assert!(bridge.is_lent());

        let ctx = bridge.reclaim(&mut world).unwrap();
        assert_eq!(ctx.actor, ActorId(2));
        assert!(world.time > 4.0);
        assert!(!bridge.is_lent());
    }

    #[test]
    fn test_placeholder_is_reused_across_loans() {
        let bridge = Bridge::default();
        let mut world = World::default();
        world.time = 3.0;

        assert!(bridge.lend(&mut world, ThinkContext::default()).is_ok());
        let placeholder = std::sync::Arc::as_ptr(&world.catalog);
        assert!(world.time < 1.0);
        bridge.reclaim(&mut world).unwrap();
        assert!(world.time > 2.0);

        for _ in 0..3 {
            assert!(bridge.lend(&mut world, ThinkContext::default()).is_ok());
            assert_eq!(std::sync::Arc::as_ptr(&world.catalog), placeholder);
            bridge.reclaim(&mut world).unwrap();
        }
        assert!(bridge.reclaim(&mut world).is_none());
        assert!(world.time > 2.0);
    }

    #[test]
    fn test_capabilities_fail_without_loan() {
        let bridge = Bridge::default();
        assert!(bridge.with(|_, _| ()).is_err());
        let mut world = World::default();
        world.time = 2.0;
        assert!(bridge.lend(&mut world, ThinkContext::default()).is_ok());
        let time = bridge.with(|world, _| world.time).unwrap();
        assert!(time > 1.0);
    }
}
