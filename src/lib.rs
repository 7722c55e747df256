// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! wingman: scripted pilot AI and actor simulation for 2D space combat.
//!
//! This crate provides the simulation core of a space combat game:
//! - Per-actor behavior driven by sandboxed rhai profiles with a task queue
//! - Layered shield/armour damage, weapon cooldowns and RC energy recharge
//! - Multi-phase hyperspace departure
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Scenario loader / Simulation      │
//! ├─────────────────────────────────────┤
//! │   Behavior host (rhai profiles)     │
//! ├─────────────────────────────────────┤
//! │   World: registry, combat, physics  │
//! ├─────────────────────────────────────┤
//! │   Catalog, factions, star system    │
//! └─────────────────────────────────────┘
//! ```
//!
//! A [`Simulation`] is usually built from a [`Scenario`] and advanced one
//! [`Simulation::tick`] at a time; effects the embedder must realise are
//! drained from the world's event log.

pub mod actor;
pub mod ai;
pub mod catalog;
pub mod combat;
pub mod config;
pub mod error;
pub mod events;
pub mod faction;
pub mod geom;
pub mod hyperspace;
pub mod invariants;
pub mod registry;
pub mod scenario;
pub mod sim;
pub mod system;
pub mod world;

pub use error::{EquipError, HostInitError, ProfileError, ScenarioError, SimError};

// Re-export key types at crate root for convenience
pub use actor::{Actor, ActorId};
pub use config::{HostConfig, SimConfig};
pub use scenario::Scenario;
pub use sim::{SimReport, Simulation};
pub use world::World;
