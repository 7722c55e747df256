//! The behavior host: profile loading, spawn binding and the per-tick think
//! sequence.

use std::collections::HashMap;
use std::f64::consts::TAU;

use rand::Rng;
use rhai::module_resolvers::DummyModuleResolver;
use rhai::{CallFnOptions, Dynamic, Engine, EvalAltResult, INT, Map, Scope};
use tracing::{debug, warn};

use super::bridge::Bridge;
use super::context::{Mode, ThinkContext};
use super::memory::MemoryStore;
use super::profile::{CONTROL_ROUTINE, Profile, ProfileId};
use super::{Behavior, api};
use crate::actor::ActorId;
use crate::config::HostConfig;
use crate::error::{HostInitError, ProfileError};
use crate::world::{EscortOrder, Notification, World};

/// Routine run once when an actor is bound to a profile.
pub(crate) const CREATE_ROUTINE: &str = "create";

/// Upper bound on notifications handled by one dispatch pass.
const MAX_DISPATCH: usize = 4096;

/// Runs behavior routines, one at a time.
///
/// Owns the script engine with every capability registered, the compiled
/// profiles and the per-actor memory records. The world is passed in for
/// each call and lent to the capabilities only while a routine runs.
#[derive(Debug)]
pub struct BehaviorHost {
    engine: Engine,
    bridge: Bridge,
    profiles: Vec<Profile>,
    by_name: HashMap<String, ProfileId>,
    memory: MemoryStore,
    config: HostConfig,
    faults: u64,
}

impl BehaviorHost {
    /// Build the engine, apply the sandbox limits and register the
    /// capability surface.
    ///
    /// # Errors
    ///
    /// Returns [`HostInitError`] if a limit in `config` is unusable.
    pub fn new(config: &HostConfig) -> Result<Self, HostInitError> {
        config.validate()?;

        let mut engine = Engine::new();
        engine.set_max_operations(config.max_operations);
        engine.set_max_call_levels(config.max_call_levels);
        engine.set_max_expr_depths(config.max_expr_depth, config.max_expr_depth);
        engine.set_max_string_size(config.max_string_size);
        engine.set_max_array_size(config.max_array_size);
        engine.set_max_map_size(config.max_map_size);
        engine.set_module_resolver(DummyModuleResolver::new());

        let bridge = Bridge::default();
        api::register_all(&mut engine, &bridge);

        Ok(Self {
            engine,
            bridge,
            profiles: Vec::new(),
            by_name: HashMap::new(),
            memory: MemoryStore::default(),
            config: *config,
            faults: 0,
        })
    }

    /// Compile and register a profile. Loading a name twice replaces the
    /// program; actors already bound keep their memory.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError`] if the profile does not compile or is
    /// malformed. Nothing is registered in that case.
    pub fn load_profile(&mut self, name: &str, source: &str) -> Result<ProfileId, ProfileError> {
        let profile = Profile::compile(&self.engine, name, source, self.config.default_control_rate)?;
        if let Some(&id) = self.by_name.get(name) {
            self.profiles[id.0] = profile;
            return Ok(id);
        }
        let id = ProfileId(self.profiles.len());
        self.profiles.push(profile);
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    /// Id of the profile called `name`.
    #[must_use]
    pub fn profile_id(&self, name: &str) -> Option<ProfileId> {
        self.by_name.get(name).copied()
    }

    /// A loaded profile.
    #[must_use]
    pub fn profile(&self, id: ProfileId) -> Option<&Profile> {
        self.profiles.get(id.0)
    }

    /// Number of loaded profiles.
    #[must_use]
    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }

    /// Memory records of bound actors.
    #[must_use]
    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    /// Routine invocations that faulted so far.
    #[must_use]
    pub fn faults(&self) -> u64 {
        self.faults
    }

    /// Bind a freshly spawned actor to the profile named by `spec`
    /// (`name` or `name*param`), randomize its fuel and run `create`.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::NotFound`] when no such profile is loaded; the
    /// actor is left without a behavior.
    pub fn bind(&mut self, world: &mut World, id: ActorId, spec: &str) -> Result<ProfileId, ProfileError> {
        let (name, param) = parse_spec(spec);
        let profile_id = self.profile_id(name).ok_or_else(|| ProfileError::NotFound(name.to_string()))?;
        let Some(profile) = self.profiles.get(profile_id.0) else {
            return Err(ProfileError::NotFound(name.to_string()));
        };

        let World { actors, rng, .. } = world;
        let Some(actor) = actors.get_mut(id) else {
            return Ok(profile_id);
        };
        let g = normal_sample(rng).clamp(-2.0, 2.0);
        let fuel_max = actor.stats.fuel_max;
        actor.pools.fuel = ((g / 4.0 + 0.5) * (fuel_max - 100.0) + 100.0).clamp(0.0, fuel_max);
        actor.behavior = Some(Behavior::new(profile_id));
        self.memory.create(id, profile.memory_template());
        debug!(actor = %id, profile = name, "profile_bound");

        if profile.has_routine(CREATE_ROUTINE) {
            self.invoke(world, ThinkContext::new(id, Mode::Create), CREATE_ROUTINE, vec![param]);
        }
        Ok(profile_id)
    }

    /// Drop the memory of a purged actor.
    pub fn forget(&mut self, id: ActorId) {
        self.memory.forget(id);
    }

    /// One think step for `id`: run `control` when due, then the active
    /// task, apply the accumulated intents and dispatch whatever the
    /// routines triggered.
    pub fn think(&mut self, world: &mut World, id: ActorId) {
        let Some(behavior) = world.actor(id).and_then(|a| a.behavior.as_ref()) else {
            return;
        };
        let profile_id = behavior.profile;
        let control_due = behavior.control_timer < 0.0 || behavior.tasks.is_empty();
        let Some(control_rate) = self.profile(profile_id).map(Profile::control_rate) else {
            return;
        };
        if let Some(actor) = world.actor_mut(id) {
            actor.target = id;
        }

        let mut ctx = ThinkContext::new(id, Mode::Normal);
        if control_due {
            ctx = self.invoke(world, ctx, CONTROL_ROUTINE, Vec::new());
            if let Some(behavior) = world.actor_mut(id).and_then(|a| a.behavior.as_mut()) {
                behavior.control_timer = control_rate;
            }
        }

        let head = world
            .actor(id)
            .and_then(|a| a.behavior.as_ref())
            .and_then(|b| b.tasks.head())
            .map(|task| task.name.clone());
        if let Some(task) = head {
            ctx = self.invoke(world, ctx, &task, Vec::new());
        }

        world.apply_intents(id, &ctx.intents);
        self.dispatch(world);
    }

    /// Deliver queued notifications to their optional handler routines.
    /// Intents set by handlers are discarded.
    pub fn dispatch(&mut self, world: &mut World) {
        for _ in 0..MAX_DISPATCH {
            let Some(notification) = world.pop_notification() else {
                return;
            };
            let (id, routine, args) = match notification {
                Notification::Attacked { victim, attacker } => (victim, "attacked", vec![id_arg(attacker)]),
                Notification::Distress { receiver, sender, attacker } => {
                    (receiver, "distress", vec![id_arg(sender), id_arg(attacker)])
                }
                Notification::Escort { escort, order, target } => {
                    let arg = if order == EscortOrder::Attack {
                        target
                    } else {
                        world.actor(escort).map_or(ActorId::NONE, |a| a.parent)
                    };
                    (escort, order.routine(), vec![id_arg(arg)])
                }
            };
            if self.handles(world, id, routine) {
                self.invoke(world, ThinkContext::new(id, Mode::Normal), routine, args);
            }
        }
        if world.pending_notifications() > 0 {
            warn!(pending = world.pending_notifications(), "notification_dispatch_capped");
        }
    }

    /// Whether `id` is a live scripted actor whose profile defines `routine`.
    fn handles(&self, world: &World, id: ActorId, routine: &str) -> bool {
        world
            .actor(id)
            .filter(|a| !a.is_player() && !a.is_dead())
            .and_then(|a| a.behavior.as_ref())
            .and_then(|b| self.profile(b.profile))
            .is_some_and(|p| p.has_routine(routine))
    }

    /// Run one routine for `ctx.actor` and return the updated context. On a
    /// fault the intents revert to what they were before the call.
    fn invoke(&mut self, world: &mut World, ctx: ThinkContext, routine: &str, mut args: Vec<Dynamic>) -> ThinkContext {
        let id = ctx.actor;
        let Some(profile_id) = world.actor(id).and_then(|a| a.behavior.as_ref()).map(|b| b.profile) else {
            return ctx;
        };
        let Some(profile) = self.profiles.get(profile_id.0) else {
            return ctx;
        };
        let Some(arity) = profile.arity(routine) else {
            self.record_fault(id, routine, &format!("routine '{routine}' is not defined"));
            return ctx;
        };
        args.resize(arity, Dynamic::UNIT);

        let snapshot = ctx.intents.clone();
        let mode = ctx.mode;
        if let Err(ctx) = self.bridge.lend(world, ctx) {
            self.record_fault(id, routine, "invocation already in progress");
            return ctx;
        }

        let mut memory = self.memory.take(id).unwrap_or_else(|| Dynamic::from_map(Map::new()));
        let options = CallFnOptions::new().eval_ast(false).rewind_scope(true).bind_this_ptr(&mut memory);
        let result: Result<Dynamic, Box<EvalAltResult>> =
            self.engine
                .call_fn_with_options(options, &mut Scope::new(), profile.ast(), routine, args);
        self.memory.put(id, memory);

        let ctx = self.bridge.reclaim(world);
        match (result, ctx) {
            (Ok(_), Some(ctx)) => ctx,
            (Err(err), Some(mut ctx)) => {
                ctx.intents = snapshot;
                self.record_fault(id, routine, &err.to_string());
                ctx
            }
            (_, None) => {
                self.record_fault(id, routine, "world was not returned");
                let mut ctx = ThinkContext::new(id, mode);
                ctx.intents = snapshot;
                ctx
            }
        }
    }

    fn record_fault(&mut self, id: ActorId, routine: &str, message: &str) {
        self.faults += 1;
        warn!(actor = %id, routine, error = message, "routine_fault");
    }
}

fn id_arg(id: ActorId) -> Dynamic {
    Dynamic::from_int(INT::from(id.0))
}

/// Split `name*param` into the profile name and the `create` argument.
fn parse_spec(spec: &str) -> (&str, Dynamic) {
    let Some((name, param)) = spec.split_once('*') else {
        return (spec, Dynamic::UNIT);
    };
    (name, creation_param(param))
}

/// Digits become an integer (leading digits only), `player` the player's
/// id, anything else stays a string.
fn creation_param(param: &str) -> Dynamic {
    if param.starts_with(|c: char| c.is_ascii_digit()) {
        let digits: String = param.chars().take_while(char::is_ascii_digit).collect();
        Dynamic::from_int(digits.parse::<INT>().unwrap_or(INT::MAX))
    } else if param == "player" {
        id_arg(ActorId::PLAYER)
    } else {
        Dynamic::from(param.to_string())
    }
}

/// Standard normal sample (Box-Muller).
fn normal_sample(rng: &mut impl Rng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::ai::TaskPayload;
    use crate::geom::DVec2;
    use crate::world::fixtures::{place, world};

    const CHASER: &str = r#"
        let control_rate = 1.0;
        let memory = #{ controls: 0, attacked_by: 0 };

        fn control() {
            this.controls += 1;
            if taskname() == "none" {
                pushtask(0, "chase", 7);
            }
        }

        fn chase() {
            accel();
            turn(0.5);
        }

        fn attacked(attacker) {
            this.attacked_by = attacker;
        }
    "#;

    fn host_with(name: &str, source: &str) -> BehaviorHost {
        let mut host = BehaviorHost::new(&HostConfig::default()).unwrap();
        host.load_profile(name, source).unwrap();
        host
    }

    fn memory_field(host: &BehaviorHost, id: ActorId, field: &str) -> Dynamic {
        host.memory().get(id).unwrap().clone_cast::<Map>()[field].clone()
    }

    fn bound(host: &mut BehaviorHost, spec: &str) -> (World, ActorId) {
        let mut world = world();
        let id = place(&mut world, DVec2::ZERO);
        host.bind(&mut world, id, spec).unwrap();
        (world, id)
    }

    #[test]
    fn test_control_then_task_applies_intents() {
        let mut host = host_with("chaser", CHASER);
        let (mut world, id) = bound(&mut host, "chaser");
        host.think(&mut world, id);

        let actor = world.actor(id).unwrap();
        let behavior = actor.behavior.as_ref().unwrap();
        assert_eq!(behavior.tasks.name(), "chase");
        assert_eq!(behavior.tasks.head().unwrap().payload, TaskPayload::Integer(7));
        assert_relative_eq!(behavior.control_timer, 1.0);
        assert_relative_eq!(actor.solid.thrust, actor.stats.thrust);
        assert_relative_eq!(actor.solid.dir_vel, actor.stats.turn * 0.5);
        assert_eq!(memory_field(&host, id, "controls").as_int(), Ok(1));
    }

    #[test]
    fn test_control_waits_for_timer() {
        let mut host = host_with("chaser", CHASER);
        let (mut world, id) = bound(&mut host, "chaser");
        host.think(&mut world, id);
        host.think(&mut world, id);
        assert_eq!(memory_field(&host, id, "controls").as_int(), Ok(1));

        world.actor_mut(id).unwrap().behavior.as_mut().unwrap().control_timer = -0.1;
        host.think(&mut world, id);
        assert_eq!(memory_field(&host, id, "controls").as_int(), Ok(2));
    }

    #[test]
    fn test_fault_discards_intents_of_faulting_routine() {
        let source = r#"
            fn control() { accel(); pushtask(0, "broken"); }
            fn broken() { turn(1.0); throw "boom"; }
        "#;
        let mut host = host_with("flaky", source);
        let (mut world, id) = bound(&mut host, "flaky");
        host.think(&mut world, id);

        let actor = world.actor(id).unwrap();
        assert_eq!(host.faults(), 1);
        assert_relative_eq!(actor.solid.thrust, actor.stats.thrust);
        assert_relative_eq!(actor.solid.dir_vel, 0.0);
    }

    #[test]
    fn test_unknown_task_routine_faults_without_popping() {
        let mut host = host_with("lost", r#"fn control() { if taskname() == "none" { pushtask(0, "wander"); } }"#);
        let (mut world, id) = bound(&mut host, "lost");
        host.think(&mut world, id);
        host.think(&mut world, id);
        assert_eq!(host.faults(), 2);
        assert_eq!(world.actor(id).unwrap().behavior.as_ref().unwrap().tasks.name(), "wander");
    }

    #[test]
    fn test_runaway_routine_hits_operation_limit() {
        let mut host = host_with("spin", "fn control() { loop { accel(); } }");
        let (mut world, id) = bound(&mut host, "spin");
        host.think(&mut world, id);
        assert_eq!(host.faults(), 1);
        assert_relative_eq!(world.actor(id).unwrap().solid.thrust, 0.0);
    }

    #[test]
    fn test_bad_payload_leaves_queue_untouched() {
        let mut host = host_with("typo", r#"fn control() { pushtask(0, "go", "nowhere"); }"#);
        let (mut world, id) = bound(&mut host, "typo");
        host.think(&mut world, id);
        assert_eq!(host.faults(), 1);
        assert!(world.actor(id).unwrap().behavior.as_ref().unwrap().tasks.is_empty());
    }

    #[test]
    fn test_memory_is_per_actor() {
        let mut host = host_with("chaser", CHASER);
        let mut world = world();
        let a = place(&mut world, DVec2::ZERO);
        let b = place(&mut world, DVec2::new(50.0, 0.0));
        host.bind(&mut world, a, "chaser").unwrap();
        host.bind(&mut world, b, "chaser").unwrap();
        host.think(&mut world, a);
        assert_eq!(memory_field(&host, a, "controls").as_int(), Ok(1));
        assert_eq!(memory_field(&host, b, "controls").as_int(), Ok(0));

        host.forget(a);
        assert!(host.memory().get(a).is_none());
    }

    #[test]
    fn test_create_gets_param_and_loot() {
        let source = r#"
            let memory = #{ param: () };
            fn create(param) {
                this.param = param;
                credits(shipprice() / 10);
                cargo("Food", 3);
            }
            fn control() {}
        "#;
        let mut host = host_with("merchant", source);
        let (world, id) = bound(&mut host, "merchant*player");
        assert_eq!(memory_field(&host, id, "param").as_int(), Ok(1));
        let actor = world.actor(id).unwrap();
        assert_eq!(actor.credits, 1000);
        assert_eq!(actor.cargo.quantity_of("Food"), 3);
        assert_eq!(host.faults(), 0);

        let (_, id) = bound(&mut host, "merchant*25abc");
        assert_eq!(memory_field(&host, id, "param").as_int(), Ok(25));
        let (_, id) = bound(&mut host, "merchant*escort");
        assert_eq!(memory_field(&host, id, "param").into_string().unwrap(), "escort");
    }

    #[test]
    fn test_loot_outside_create_faults() {
        let mut host = host_with("greedy", "fn control() { credits(100); }");
        let (mut world, id) = bound(&mut host, "greedy");
        host.think(&mut world, id);
        assert_eq!(host.faults(), 1);
        assert_eq!(world.actor(id).unwrap().credits, 0);
    }

    #[test]
    fn test_missing_profile_leaves_actor_inert() {
        let mut host = host_with("chaser", CHASER);
        let mut world = world();
        let id = place(&mut world, DVec2::ZERO);
        assert!(matches!(host.bind(&mut world, id, "ghost"), Err(ProfileError::NotFound(_))));
        assert!(world.actor(id).unwrap().behavior.is_none());
        host.think(&mut world, id);
        assert_eq!(host.faults(), 0);
    }

    #[test]
    fn test_fuel_randomized_within_capacity() {
        let mut host = host_with("chaser", CHASER);
        for _ in 0..20 {
            let (world, id) = bound(&mut host, "chaser");
            let actor = world.actor(id).unwrap();
            assert!(actor.pools.fuel >= 0.0 && actor.pools.fuel <= actor.stats.fuel_max);
        }
    }

    #[test]
    fn test_attacked_dispatched_after_invocation() {
        let mut host = host_with("chaser", CHASER);
        let (mut world, id) = bound(&mut host, "chaser");
        world.notify(Notification::Attacked { victim: id, attacker: ActorId(9) });
        host.dispatch(&mut world);
        assert_eq!(memory_field(&host, id, "attacked_by").as_int(), Ok(9));
        assert_eq!(world.pending_notifications(), 0);
    }

    #[test]
    fn test_capabilities_refused_outside_routines() {
        let host = host_with("chaser", CHASER);
        assert!(host.engine.eval::<()>("accel()").is_err());
    }

    #[test]
    fn test_spec_parsing() {
        let (name, param) = parse_spec("trader");
        assert_eq!(name, "trader");
        assert!(param.is_unit());
        let (name, param) = parse_spec("trader*12");
        assert_eq!(name, "trader");
        assert_eq!(param.as_int(), Ok(12));
    }

    #[test]
    fn test_invalid_limits_rejected() {
        let config = HostConfig { max_operations: 0, ..HostConfig::default() };
        assert!(BehaviorHost::new(&config).is_err());
    }
}
