//! The star system actors fly in: planets and sensor interference.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::faction::FactionId;
use crate::geom::DVec2;

/// Base sensor range with no interference.
pub const SENSOR_RANGE: f64 = 375.0;

/// Interference at or above which sensors see nothing.
pub const MAX_INTERFERENCE: f64 = 999.0;

/// A planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    /// Display name.
    pub name: String,
    /// Position.
    pub pos: DVec2,
    /// Owning faction.
    pub faction: FactionId,
    /// Whether ships can land.
    #[serde(default)]
    pub landable: bool,
}

/// A star system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StarSystem {
    /// Display name.
    pub name: String,
    /// Planets.
    #[serde(default)]
    pub planets: Vec<Planet>,
    /// Sensor interference, 0 for none.
    #[serde(default)]
    pub interference: f64,
}

impl StarSystem {
    /// Squared sensor range. Infinite with no interference, zero when fully jammed.
    #[must_use]
    pub fn sensor_range_sq(&self) -> f64 {
        if self.interference <= 0.0 {
            f64::INFINITY
        } else if self.interference >= MAX_INTERFERENCE {
            0.0
        } else {
            let range = SENSOR_RANGE / (self.interference / 1000.0);
            range * range
        }
    }

    /// Whether `b` is within sensor range of `a`.
    #[must_use]
    pub fn in_sensor_range(&self, a: DVec2, b: DVec2) -> bool {
        a.distance_squared(b) < self.sensor_range_sq()
    }

    /// Index of the planet nearest to `pos` satisfying `filter`.
    pub fn nearest_planet(&self, pos: DVec2, mut filter: impl FnMut(&Planet) -> bool) -> Option<usize> {
        self.planets
            .iter()
            .enumerate()
            .filter(|(_, p)| filter(p))
            .min_by(|(_, a), (_, b)| a.pos.distance_squared(pos).total_cmp(&b.pos.distance_squared(pos)))
            .map(|(i, _)| i)
    }

    /// Index of a random planet satisfying `filter`.
    pub fn random_planet<R: Rng>(&self, rng: &mut R, mut filter: impl FnMut(&Planet) -> bool) -> Option<usize> {
        let candidates: Vec<usize> = self
            .planets
            .iter()
            .enumerate()
            .filter(|(_, p)| filter(p))
            .map(|(i, _)| i)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[rng.gen_range(0..candidates.len())])
    }
}
