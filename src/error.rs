//! Error types shared across the simulation.
//!
//! Every fallible operation in the core returns one of these. None of them is
//! fatal to a running simulation except [`HostInitError`], which can only
//! occur while the behavior host is being constructed.

use std::path::PathBuf;

use thiserror::Error;

/// Rejection reasons for equipping or removing an outfit.
///
/// Rejections never change actor state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EquipError {
    /// The slot index does not exist on this hull.
    #[error("No such slot")]
    NoSuchSlot,
    /// The outfit needs a different slot class.
    #[error("Outfit does not fit in a {0} slot")]
    WrongSlotClass(&'static str),
    /// No empty slot can take the outfit.
    #[error("No free {0} slot")]
    NoFreeSlot(&'static str),
    /// Adding into a slot that already holds an outfit.
    #[error("Slot is already occupied")]
    Occupied,
    /// Removing from an empty slot.
    #[error("Slot is empty")]
    Empty,
    /// Adding would drive a derived stat negative.
    #[error("Insufficient {0}")]
    Insufficient(&'static str),
    /// Adding would exceed the CPU budget.
    #[error("Insufficient CPU")]
    InsufficientCpu,
    /// Only one afterburner may be equipped.
    #[error("Already have an afterburner")]
    DuplicateAfterburner,
    /// Removing a CPU provider whose output is in use.
    #[error("Lower CPU usage first")]
    CpuInUse,
    /// Removing would drive a derived stat negative.
    #[error("Increase {0} first")]
    IncreaseFirst(&'static str),
    /// Fighter bays cannot be removed while fighters are out.
    #[error("Recall the fighters first")]
    FightersDeployed,
    /// The outfit does not take ammunition, or the ammunition does not match.
    #[error("Outfit does not accept ammunition '{0}'")]
    AmmoMismatch(String),
    /// A referenced catalog entry is missing.
    #[error("Unknown outfit '{0}'")]
    UnknownOutfit(String),
}

/// Cargo operations that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CargoError {
    /// No mission cargo with this id is aboard.
    #[error("Mission cargo {0} not found")]
    MissionCargoNotFound(u32),
}

/// Errors loading a behavior profile.
///
/// A profile that fails to load leaves every actor bound to it inert.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The script failed to parse.
    #[error("profile '{name}' failed to compile: {message}")]
    Compile {
        /// Profile name.
        name: String,
        /// Parser message.
        message: String,
    },
    /// Running the profile's top-level statements failed.
    #[error("profile '{name}' failed to initialise: {message}")]
    Init {
        /// Profile name.
        name: String,
        /// Runtime message.
        message: String,
    },
    /// The profile has no `control` routine.
    #[error("profile '{0}' has no control routine")]
    MissingControl(String),
    /// The `memory` template is present but is not a map.
    #[error("profile '{0}' has a malformed memory template (expected a map)")]
    MalformedMemory(String),
    /// The `control_rate` global is not a positive number.
    #[error("profile '{0}' has an invalid control_rate")]
    InvalidControlRate(String),
    /// No profile with this name is loaded.
    #[error("no behavior profile named '{0}'")]
    NotFound(String),
}

/// Failure to construct the behavior host. Fatal to the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostInitError {
    /// A sandbox limit was configured as zero.
    #[error("sandbox limit '{0}' must be non-zero")]
    ZeroLimit(&'static str),
    /// The control-rate fallback is not a positive finite number.
    #[error("default control rate must be positive, got {0}")]
    InvalidControlRate(String),
}

/// Errors building a world from static data.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Two entries share a name.
    #[error("duplicate {kind} '{name}'")]
    Duplicate {
        /// Entry kind ("hull", "outfit", "commodity").
        kind: &'static str,
        /// Duplicated name.
        name: String,
    },
    /// A launcher or bay references ammunition that does not exist.
    #[error("outfit '{outfit}' references unknown ammunition '{ammo}'")]
    UnknownAmmo {
        /// Referencing outfit.
        outfit: String,
        /// Missing ammunition name.
        ammo: String,
    },
    /// A fighter references a hull that does not exist.
    #[error("fighter '{outfit}' references unknown hull '{hull}'")]
    UnknownHull {
        /// Referencing outfit.
        outfit: String,
        /// Missing hull name.
        hull: String,
    },
}

/// Errors loading a scenario file.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Reading a file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The scenario JSON is malformed.
    #[error("invalid scenario: {0}")]
    Parse(#[from] serde_json::Error),
    /// The catalog section is inconsistent.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// A spawn references a hull that is not in the catalog.
    #[error("actor '{actor}' uses unknown hull '{hull}'")]
    UnknownHull {
        /// Actor name.
        actor: String,
        /// Missing hull.
        hull: String,
    },
    /// A spawn or planet references an unknown faction.
    #[error("unknown faction '{0}'")]
    UnknownFaction(String),
    /// A spawn's loadout could not be equipped.
    #[error("actor '{actor}' cannot equip '{outfit}': {source}")]
    Loadout {
        /// Actor name.
        actor: String,
        /// Outfit name.
        outfit: String,
        /// Rejection reason.
        source: EquipError,
    },
    /// More than one actor is marked as the player.
    #[error("scenario declares more than one player actor")]
    MultiplePlayers,
    /// The simulation could not be assembled.
    #[error(transparent)]
    Sim(#[from] SimError),
}

/// Registry operations that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The player id is already in use.
    #[error("a player actor is already registered")]
    PlayerExists,
}

/// Errors assembling a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// The behavior host could not be created.
    #[error(transparent)]
    Host(#[from] HostInitError),
    /// The player actor could not be registered.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equip_error_messages() {
        assert_eq!(EquipError::Insufficient("thrust").to_string(), "Insufficient thrust");
        assert_eq!(EquipError::IncreaseFirst("shield").to_string(), "Increase shield first");
        assert_eq!(EquipError::FightersDeployed.to_string(), "Recall the fighters first");
    }

    #[test]
    fn test_profile_error_names_profile() {
        let err = ProfileError::MalformedMemory("trader".to_string());
        assert!(err.to_string().contains("trader"));
    }
}
