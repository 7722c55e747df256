//! Simulation and behavior-host configuration.

use serde::{Deserialize, Serialize};

use crate::error::HostInitError;

/// Default seconds between two `control` runs when a profile does not set
/// `control_rate`.
pub const DEFAULT_CONTROL_RATE: f64 = 2.0;

/// Sandbox limits and fallbacks for the behavior host.
///
/// Every limit bounds one routine invocation; a routine that exceeds one
/// faults and its tick is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Operations a single invocation may execute.
    pub max_operations: u64,
    /// Maximum script call depth.
    pub max_call_levels: usize,
    /// Maximum expression nesting depth.
    pub max_expr_depth: usize,
    /// Maximum string length in bytes.
    pub max_string_size: usize,
    /// Maximum array length.
    pub max_array_size: usize,
    /// Maximum map size.
    pub max_map_size: usize,
    /// `control_rate` for profiles that do not define one.
    pub default_control_rate: f64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_operations: 100_000,
            max_call_levels: 32,
            max_expr_depth: 64,
            max_string_size: 4096,
            max_array_size: 1024,
            max_map_size: 256,
            default_control_rate: DEFAULT_CONTROL_RATE,
        }
    }
}

impl HostConfig {
    /// Check that every limit is usable.
    ///
    /// # Errors
    ///
    /// Returns [`HostInitError`] for a zero limit or a non-positive control
    /// rate.
    pub fn validate(&self) -> Result<(), HostInitError> {
        let limits = [
            ("max_operations", self.max_operations == 0),
            ("max_call_levels", self.max_call_levels == 0),
            ("max_expr_depth", self.max_expr_depth == 0),
            ("max_string_size", self.max_string_size == 0),
            ("max_array_size", self.max_array_size == 0),
            ("max_map_size", self.max_map_size == 0),
        ];
        if let Some((name, _)) = limits.iter().find(|(_, zero)| *zero) {
            return Err(HostInitError::ZeroLimit(name));
        }
        if !(self.default_control_rate.is_finite() && self.default_control_rate > 0.0) {
            return Err(HostInitError::InvalidControlRate(self.default_control_rate.to_string()));
        }
        Ok(())
    }
}

/// Configuration for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seconds per tick.
    pub dt: f64,
    /// World RNG seed.
    pub seed: u64,
    /// Profile bound to fighters launched from bays.
    pub escort_profile: String,
    /// Run `check_invariants` after every tick and log violations.
    pub check_invariants: bool,
    /// Behavior host settings.
    pub host: HostConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            seed: 42,
            escort_profile: "escort".to_string(),
            check_invariants: false,
            host: HostConfig::default(),
        }
    }
}
