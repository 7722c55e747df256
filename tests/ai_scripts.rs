//! Scripted behavior tests: profiles driving actors through a full tick.
//!
//! Each test builds a small scenario with inline profiles and checks what the
//! routines did through the world, the memory store and the report.
//!
//! Run with: cargo test --release ai_scripts

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use rhai::{Dynamic, Map};
use serde_json::{Value, json};
use wingman::actor::HyperspacePhase;
use wingman::ai::TaskPayload;
use wingman::catalog::DamageType;
use wingman::combat::Hit;
use wingman::events::WorldEvent;
use wingman::{ActorId, Scenario, Simulation};

/// A one-hull, one-weapon catalog plus two hostile factions.
fn scenario(profiles: &[(&str, &str)], spawns: Value) -> Scenario {
    let profiles: serde_json::Map<String, Value> = profiles
        .iter()
        .map(|(name, source)| ((*name).to_string(), json!({ "source": source })))
        .collect();
    let doc = json!({
        "catalog": {
            "hulls": [{
                "name": "Scout", "class": "Fighter", "price": 10000, "mass": 40, "thrust": 2000, "turn": 180,
                "speed": 250, "armour": 60, "shield": 40, "energy": 100, "energy_regen": 10,
                "fuel": 300, "cpu": 20, "cargo": 10, "size": 40,
                "slots": { "low": 2, "medium": 1, "high": 3 }
            }],
            "outfits": [{
                "name": "Laser", "mass": 2, "cpu": 4, "type": "bolt", "delay": 0.5, "speed": 800,
                "range": 600, "energy": 2, "damage": 12, "damage_type": "energy", "turret": false
            }],
            "commodities": [{ "name": "Food", "price": 50 }]
        },
        "factions": [
            { "name": "Pirate", "standing": -50, "enemies": ["Trader"] },
            { "name": "Trader", "standing": 20 }
        ],
        "system": { "name": "Test" },
        "profiles": profiles,
        "spawns": spawns,
        "ticks": 60
    });
    Scenario::from_json(&doc.to_string()).unwrap()
}

fn find(sim: &Simulation, name: &str) -> ActorId {
    sim.world().actors.iter().find(|a| a.name == name).unwrap().id
}

fn memory(sim: &Simulation, id: ActorId) -> Map {
    sim.host().memory().get(id).unwrap().clone().cast::<Map>()
}

fn int(map: &Map, key: &str) -> i64 {
    map.get(key).unwrap().as_int().unwrap()
}

const COUNTER: &str = r#"
    let memory = #{ controls: 0 };
    fn control() { this.controls += 1; }
"#;

#[test]
fn test_idle_actor_runs_control_every_tick() {
    let mut sim = scenario(&[("counter", COUNTER)], json!([{ "name": "A", "hull": "Scout", "faction": "Trader", "profile": "counter" }]))
        .build()
        .unwrap();
    sim.run(10);
    let id = find(&sim, "A");
    assert_eq!(int(&memory(&sim, id), "controls"), 10);
}

#[test]
fn test_busy_actor_runs_control_at_its_rate() {
    let source = r#"
        let control_rate = 0.5;
        let memory = #{ controls: 0, runs: 0 };
        fn control() {
            this.controls += 1;
            if taskname() == "none" { pushtask(0, "work", 3); }
        }
        fn work() { this.runs += 1; }
    "#;
    let mut sim = scenario(&[("worker", source)], json!([{ "name": "A", "hull": "Scout", "faction": "Trader", "profile": "worker" }]))
        .build()
        .unwrap();
    // 60 ticks at 1/60 s: control at t=0, then roughly every half second.
    sim.run(60);
    let id = find(&sim, "A");
    let mem = memory(&sim, id);
    assert_eq!(int(&mem, "runs"), 60);
    let controls = int(&mem, "controls");
    assert!((2..=3).contains(&controls), "control ran {controls} times");

    let behavior = sim.world().actor(id).unwrap().behavior.as_ref().unwrap();
    assert_eq!(behavior.tasks.name(), "work");
    assert_eq!(behavior.tasks.head().unwrap().payload, TaskPayload::Integer(3));
}

#[test]
fn test_create_receives_parameter_and_loots() {
    let source = r#"
        let memory = #{ param: () };
        fn create(param) {
            this.param = param;
            credits(250);
            cargo("Food", 3);
        }
        fn control() {}
    "#;
    let mut sim = scenario(&[("loader", source)], json!([{ "name": "A", "hull": "Scout", "faction": "Trader", "profile": "loader*7" }]))
        .build()
        .unwrap();
    sim.tick();
    let id = find(&sim, "A");
    assert_eq!(int(&memory(&sim, id), "param"), 7);
    let actor = sim.world().actor(id).unwrap();
    assert_eq!(actor.credits, 250);
    assert_eq!(actor.cargo.free(), 7);
    assert_eq!(sim.report().faults, 0);
}

#[test]
fn test_loot_outside_create_faults() {
    let source = r"
        fn control() { credits(1000); }
    ";
    let mut sim = scenario(&[("greedy", source)], json!([{ "name": "A", "hull": "Scout", "faction": "Trader", "profile": "greedy" }]))
        .build()
        .unwrap();
    sim.run(3);
    let id = find(&sim, "A");
    assert_eq!(sim.world().actor(id).unwrap().credits, 0);
    assert_eq!(sim.report().faults, 3);
}

#[test]
fn test_runaway_script_is_cut_off() {
    let source = r"
        fn control() { loop { accel(); } }
    ";
    let mut sim = scenario(&[("spin", source)], json!([{ "name": "A", "hull": "Scout", "faction": "Trader", "profile": "spin" }]))
        .build()
        .unwrap();
    sim.run(2);
    let id = find(&sim, "A");
    assert_eq!(sim.report().faults, 2);
    // Intents of a faulted routine are discarded.
    assert!(sim.world().actor(id).unwrap().solid.vel.length() < 1e-9);
}

#[test]
fn test_unknown_task_faults_without_popping() {
    let source = r#"
        fn control() { if taskname() == "none" { pushtask(0, "missing"); } }
    "#;
    let mut sim = scenario(&[("lost", source)], json!([{ "name": "A", "hull": "Scout", "faction": "Trader", "profile": "lost" }]))
        .build()
        .unwrap();
    sim.run(4);
    let id = find(&sim, "A");
    assert_eq!(sim.world().actor(id).unwrap().behavior.as_ref().unwrap().tasks.name(), "missing");
    assert_eq!(sim.report().faults, 4);
}

#[test]
fn test_distress_reaches_listeners() {
    let caller = r#"
        let memory = #{ called: false };
        fn control() {
            if !this.called {
                distress();
                this.called = true;
            }
        }
    "#;
    let listener = r"
        let memory = #{ heard: 0 };
        fn control() {}
        fn distress(sender, attacker) { this.heard = sender; }
    ";
    let mut sim = scenario(
        &[("caller", caller), ("listener", listener)],
        json!([
            { "name": "Caller", "hull": "Scout", "faction": "Trader", "profile": "caller" },
            { "name": "Listener", "hull": "Scout", "faction": "Trader", "pos": [200, 0], "profile": "listener" }
        ]),
    )
    .build()
    .unwrap();
    sim.run(2);
    let caller_id = find(&sim, "Caller");
    let listener_id = find(&sim, "Listener");
    assert_eq!(int(&memory(&sim, listener_id), "heard"), i64::from(caller_id.0));
    assert_eq!(sim.report().events.distress, 1);
}

#[test]
fn test_hunter_disables_target() {
    let hunter = r#"
        fn control() {
            let enemy = getenemy();
            if enemy != 0 && taskname() == "none" { pushtask(0, "attack", enemy); }
        }
        fn attack() {
            let t = target();
            if !exists(t) || isdisabled(t) { poptask(); return; }
            settarget(t);
            let err = aim(t);
            if err < 5.0 { shoot(); }
        }
    "#;
    let victim = r"
        let memory = #{ attacked_by: 0 };
        fn control() {}
        fn attacked(attacker) { this.attacked_by = attacker; }
    ";
    let mut sim = scenario(
        &[("hunter", hunter), ("victim", victim)],
        json!([
            { "name": "Hunter", "hull": "Scout", "faction": "Pirate", "loadout": ["Laser", "Laser"], "profile": "hunter" },
            { "name": "Victim", "hull": "Scout", "faction": "Trader", "pos": [0, 300], "profile": "victim" }
        ]),
    )
    .build()
    .unwrap();
    // Stop at the tick the victim is disabled, before stray bolts can finish it.
    for _ in 0..1800 {
        sim.tick();
        if sim.report().events.disabled > 0 {
            break;
        }
    }

    let hunter_id = find(&sim, "Hunter");
    let victim_id = find(&sim, "Victim");
    let report = sim.report();
    assert!(report.events.shots > 0);
    assert_eq!(report.events.disabled, 1);
    assert!(sim.world().actor(victim_id).unwrap().is_disabled());
    assert_eq!(int(&memory(&sim, victim_id), "attacked_by"), i64::from(hunter_id.0));
}

#[test]
fn test_script_jumps_out() {
    let source = r"
        fn control() { hyperspace(); }
    ";
    let mut sim = scenario(
        &[("leaver", source)],
        json!([{ "name": "A", "hull": "Scout", "faction": "Trader", "pos": [2000, 0], "profile": "leaver" }]),
    )
    .build()
    .unwrap();
    sim.run(1200);

    let report = sim.report();
    assert_eq!(report.events.jumped, 1);
    assert_eq!(report.actors, 0);
    assert!(sim.host().memory().is_empty());
}

#[test]
fn test_attacked_script_aborts_departure() {
    let source = r#"
        let memory = #{ aborted: false, answered: false };
        fn control() { if !this.answered { hyperspace(); } }
        fn attacked(attacker) {
            this.aborted = hyp_abort();
            this.answered = true;
        }
    "#;
    let mut sim = scenario(
        &[("skittish", source)],
        json!([
            { "name": "A", "hull": "Scout", "faction": "Trader", "pos": [2000, 0], "profile": "skittish" },
            { "name": "B", "hull": "Scout", "faction": "Pirate", "pos": [2000, 300] }
        ]),
    )
    .build()
    .unwrap();
    sim.tick();
    let (a, b) = (find(&sim, "A"), find(&sim, "B"));
    assert_eq!(sim.world().actor(a).unwrap().flags.hyperspace, HyperspacePhase::Preparing);
    let fuel = sim.world().actor(a).unwrap().pools.fuel;

    let hit = Hit { shooter: b, damage_type: DamageType::Energy, damage: 1.0, impact: None };
    assert!(sim.world_mut().hit(a, &hit).landed);
    sim.run(300);

    assert!(memory(&sim, a).get("aborted").unwrap().as_bool().unwrap());
    let actor = sim.world().actor(a).unwrap();
    assert_eq!(actor.flags.hyperspace, HyperspacePhase::Cruising);
    assert!((actor.pools.fuel - fuel).abs() < 1e-9);
    assert_eq!(sim.report().events.jumped, 0);
}

#[test]
fn test_too_close_to_jump_reports_distance() {
    let source = r#"
        let memory = #{ answer: () };
        fn control() { this.answer = hyperspace(); }
    "#;
    let mut sim = scenario(
        &[("eager", source)],
        json!([{ "name": "A", "hull": "Scout", "faction": "Trader", "pos": [500, 0], "profile": "eager" }]),
    )
    .build()
    .unwrap();
    sim.tick();
    let id = find(&sim, "A");
    let answer: Dynamic = memory(&sim, id).get("answer").unwrap().clone();
    let remaining = answer.as_float().unwrap();
    assert!((remaining - 1000.0).abs() < 1.0);
}

#[test]
fn test_player_is_never_scripted() {
    let mut sim = scenario(&[("counter", COUNTER)], json!([{ "name": "P", "hull": "Scout", "player": true, "profile": "counter" }]))
        .build()
        .unwrap();
    sim.run(5);
    let player = sim.world().player().unwrap();
    assert!(player.behavior.is_none());
    assert!(sim.host().memory().get(ActorId::PLAYER).is_none());
}

#[test]
fn test_comm_to_player_recorded() {
    let source = r#"
        let memory = #{ sent: false };
        fn control() {
            if !this.sent { comm(player(), "Hello there"); this.sent = true; }
        }
    "#;
    let mut sim = scenario(
        &[("chatty", source)],
        json!([
            { "name": "P", "hull": "Scout", "player": true },
            { "name": "A", "hull": "Scout", "faction": "Trader", "pos": [100, 0], "profile": "chatty" }
        ]),
    )
    .build()
    .unwrap();
    sim.run(3);
    let messages = sim.world().events.count(|e| matches!(e, WorldEvent::Message { text, .. } if text == "Hello there"));
    assert_eq!(messages, 1);
}
