//! Hull (ship type) definitions.

use serde::{Deserialize, Serialize};

/// Number of slots of each class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotCounts {
    /// Low slots.
    pub low: usize,
    /// Medium slots.
    pub medium: usize,
    /// High slots.
    pub high: usize,
}

/// Base stats of a ship type, before outfits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hull {
    /// Unique name.
    pub name: String,
    /// Ship class shown to scripts ("Fighter", "Freighter", ...).
    pub class: String,
    /// Sale price of the bare hull.
    #[serde(default)]
    pub price: u64,
    /// Mass in tonnes.
    pub mass: f64,
    /// Engine thrust.
    pub thrust: f64,
    /// Turn rate in degrees per second.
    pub turn: f64,
    /// Top speed.
    pub speed: f64,
    /// Maximum armour.
    pub armour: f64,
    /// Armour regeneration per second.
    #[serde(default)]
    pub armour_regen: f64,
    /// Maximum shield.
    #[serde(default)]
    pub shield: f64,
    /// Shield regeneration per second.
    #[serde(default)]
    pub shield_regen: f64,
    /// Maximum energy.
    #[serde(default)]
    pub energy: f64,
    /// Energy regeneration per second.
    #[serde(default)]
    pub energy_regen: f64,
    /// Maximum fuel.
    #[serde(default)]
    pub fuel: f64,
    /// CPU budget.
    #[serde(default)]
    pub cpu: f64,
    /// Cargo capacity in tonnes.
    #[serde(default)]
    pub cargo: u32,
    /// Sprite width, used for collision and docking distances.
    pub size: f64,
    /// Slot layout.
    #[serde(default)]
    pub slots: SlotCounts,
}

impl Hull {
    /// Total number of slots.
    #[must_use]
    pub const fn slot_count(&self) -> usize {
        self.slots.low + self.slots.medium + self.slots.high
    }
}

/// A tradeable commodity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commodity {
    /// Unique name.
    pub name: String,
    /// Base price per tonne.
    #[serde(default)]
    pub price: u64,
}
