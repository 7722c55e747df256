//! Combat resolution.
//!
//! [`damage`] applies hits to a single actor and drives the
//! Healthy → Disabled → Dead transitions. [`weapons`] decides which slots may
//! fire and what firing them produces. Both work on one [`Actor`] at a time;
//! effects that span actors are applied by the world.
//!
//! [`Actor`]: crate::actor::Actor

pub mod damage;
pub mod weapons;

pub use damage::{DamageSplit, Hit, HitOutcome, Impact, apply_hit};
pub use weapons::{FireMode, Shot, fire_slot};
