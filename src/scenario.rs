//! Scenario files: everything needed to build a [`Simulation`] from JSON.
//!
//! A scenario names its catalog, factions, star system, behavior profiles and
//! initial spawns. Profile sources are either inline or a path relative to
//! the scenario file.
//!
//! ```json
//! {
//!   "catalog": { "hulls": [...], "outfits": [...], "commodities": [...] },
//!   "factions": [{ "name": "Pirate", "standing": -40, "enemies": ["Trader"] }],
//!   "system": { "name": "Sol", "planets": [{ "name": "Earth", "pos": [0, 0], "faction": "Trader" }] },
//!   "profiles": { "pirate": { "path": "profiles/pirate.rhai" } },
//!   "spawns": [{ "hull": "Scout", "faction": "Pirate", "pos": [500, 0], "profile": "pirate" }],
//!   "ticks": 3600
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::actor::{Actor, ActorId};
use crate::catalog::{Catalog, CatalogDefs};
use crate::config::SimConfig;
use crate::error::{EquipError, ProfileError, ScenarioError};
use crate::faction::{FactionId, FactionTable};
use crate::geom::DVec2;
use crate::sim::Simulation;
use crate::system::{Planet, StarSystem};
use crate::world::World;

/// Name of the faction every table starts with.
pub const PLAYER_FACTION_NAME: &str = "Player";

const fn default_ticks() -> u64 {
    3600
}

/// A faction and its relations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactionDef {
    /// Unique name.
    pub name: String,
    /// Initial standing towards the player, in [-100, 100].
    pub standing: f64,
    /// Factions this one is allied with.
    pub allies: Vec<String>,
    /// Factions this one is at war with.
    pub enemies: Vec<String>,
}

/// A planet, with its faction given by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetDef {
    /// Display name.
    pub name: String,
    /// Position.
    pub pos: DVec2,
    /// Owning faction.
    pub faction: String,
    /// Whether ships can land.
    #[serde(default)]
    pub landable: bool,
}

/// The star system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemDef {
    /// Display name.
    pub name: String,
    /// Sensor interference.
    pub interference: f64,
    /// Planets.
    pub planets: Vec<PlanetDef>,
}

/// Where a profile's source lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileSource {
    /// Source text in the scenario itself.
    Inline {
        /// Script text.
        source: String,
    },
    /// A file, relative to the scenario.
    File {
        /// Script path.
        path: PathBuf,
    },
}

/// An actor present at the start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnDef {
    /// Display name; defaults to the hull name.
    #[serde(default)]
    pub name: Option<String>,
    /// Hull name.
    pub hull: String,
    /// Faction name.
    #[serde(default = "player_faction")]
    pub faction: String,
    /// Position.
    #[serde(default)]
    pub pos: DVec2,
    /// Velocity.
    #[serde(default)]
    pub vel: DVec2,
    /// Heading in radians.
    #[serde(default)]
    pub dir: f64,
    /// Outfits to equip, in order.
    #[serde(default)]
    pub loadout: Vec<String>,
    /// Behavior profile spec (`name` or `name*param`).
    #[serde(default)]
    pub profile: Option<String>,
    /// Starting credits.
    #[serde(default)]
    pub credits: u64,
    /// Starting cargo by commodity.
    #[serde(default)]
    pub cargo: BTreeMap<String, u32>,
    /// This is the player's ship.
    #[serde(default)]
    pub player: bool,
}

fn player_faction() -> String {
    PLAYER_FACTION_NAME.to_string()
}

/// A complete scenario.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    /// Hulls, outfits and commodities.
    #[serde(default)]
    pub catalog: CatalogDefs,
    /// Factions besides the player's.
    #[serde(default)]
    pub factions: Vec<FactionDef>,
    /// The star system.
    #[serde(default)]
    pub system: SystemDef,
    /// Behavior profiles by name.
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileSource>,
    /// Initial actors.
    #[serde(default)]
    pub spawns: Vec<SpawnDef>,
    /// Ticks a run lasts unless overridden.
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    /// Simulation settings.
    #[serde(default)]
    pub config: SimConfig,
    /// Directory relative profile paths resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Result of checking a scenario without running it.
#[derive(Debug, Default)]
pub struct Validation {
    /// Hulls in the catalog.
    pub hulls: usize,
    /// Outfits in the catalog.
    pub outfits: usize,
    /// Profiles that compiled.
    pub profiles: Vec<String>,
    /// Profiles that did not, with the reason.
    pub profile_errors: Vec<ProfileError>,
    /// Actors that would be spawned.
    pub spawns: usize,
}

impl Validation {
    /// No profile failed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.profile_errors.is_empty()
    }
}

impl Scenario {
    /// Read and parse a scenario file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid scenario.
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let text = fs::read_to_string(path).map_err(|source| ScenarioError::Io { path: path.to_path_buf(), source })?;
        let mut scenario = Self::from_json(&text)?;
        scenario.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(scenario)
    }

    /// Parse a scenario from JSON text. Relative profile paths resolve
    /// against the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Parse`] on malformed JSON.
    pub fn from_json(text: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build the simulation with the scenario's own seed.
    ///
    /// Profiles that fail to compile are logged and skipped; actors bound to
    /// them stay inert.
    ///
    /// # Errors
    ///
    /// Returns an error on catalog inconsistencies, unknown references,
    /// loadouts that do not fit or an invalid host configuration.
    pub fn build(&self) -> Result<Simulation, ScenarioError> {
        self.build_with_seed(self.config.seed)
    }

    /// Build the simulation with `seed` in place of the configured one.
    ///
    /// # Errors
    ///
    /// See [`Scenario::build`].
    pub fn build_with_seed(&self, seed: u64) -> Result<Simulation, ScenarioError> {
        let (mut sim, errors) = self.assemble(seed)?;
        for (name, error) in errors {
            warn!(profile = %name, %error, "profile_load_failed");
        }
        self.populate(&mut sim)?;
        info!(seed, actors = self.spawns.len(), profiles = sim.host().profile_count(), "scenario_built");
        Ok(sim)
    }

    /// Check that the scenario builds, collecting profile errors instead of
    /// logging them.
    ///
    /// # Errors
    ///
    /// Returns the first structural error; profile errors are reported in the
    /// [`Validation`].
    pub fn validate(&self) -> Result<Validation, ScenarioError> {
        let (mut sim, errors) = self.assemble(self.config.seed)?;
        self.populate(&mut sim)?;
        let catalog = &sim.world().catalog;
        let mut validation = Validation {
            hulls: catalog.hull_count(),
            outfits: catalog.outfit_count(),
            spawns: self.spawns.len(),
            ..Validation::default()
        };
        for name in self.profiles.keys() {
            if sim.host().profile_id(name).is_some() {
                validation.profiles.push(name.clone());
            }
        }
        validation.profile_errors = errors.into_iter().map(|(_, e)| e).collect();
        Ok(validation)
    }

    fn assemble(&self, seed: u64) -> Result<(Simulation, Vec<(String, ProfileError)>), ScenarioError> {
        let catalog = Arc::new(Catalog::from_defs(self.catalog.clone())?);
        let factions = self.faction_table()?;
        let system = self.star_system(&factions)?;
        let world = World::new(catalog, factions, system, seed);
        let config = SimConfig { seed, ..self.config.clone() };
        let mut sim = Simulation::new(world, config)?;

        let mut errors = Vec::new();
        for (name, source) in &self.profiles {
            let text = match source {
                ProfileSource::Inline { source } => source.clone(),
                ProfileSource::File { path } => {
                    let path = self.base_dir.join(path);
                    fs::read_to_string(&path).map_err(|source| ScenarioError::Io { path, source })?
                }
            };
            if let Err(e) = sim.load_profile(name, &text) {
                errors.push((name.clone(), e));
            }
        }
        Ok((sim, errors))
    }

    fn faction_table(&self) -> Result<FactionTable, ScenarioError> {
        let mut table = FactionTable::new();
        for def in &self.factions {
            table.add(def.name.clone(), def.standing);
        }
        for def in &self.factions {
            let id = faction_id(&table, &def.name)?;
            for ally in &def.allies {
                table.set_allies(id, faction_id(&table, ally)?);
            }
            for enemy in &def.enemies {
                table.set_enemies(id, faction_id(&table, enemy)?);
            }
        }
        Ok(table)
    }

    fn star_system(&self, factions: &FactionTable) -> Result<StarSystem, ScenarioError> {
        let planets = self
            .system
            .planets
            .iter()
            .map(|p| {
                Ok(Planet { name: p.name.clone(), pos: p.pos, faction: faction_id(factions, &p.faction)?, landable: p.landable })
            })
            .collect::<Result<_, ScenarioError>>()?;
        Ok(StarSystem { name: self.system.name.clone(), planets, interference: self.system.interference })
    }

    fn populate(&self, sim: &mut Simulation) -> Result<(), ScenarioError> {
        if self.spawns.iter().filter(|s| s.player).count() > 1 {
            return Err(ScenarioError::MultiplePlayers);
        }
        for def in &self.spawns {
            let actor = build_actor(sim.world(), def)?;
            if def.player {
                sim.add_player(actor)?;
            } else {
                sim.spawn(actor, def.profile.as_deref());
            }
        }
        Ok(())
    }
}

fn faction_id(table: &FactionTable, name: &str) -> Result<FactionId, ScenarioError> {
    table.by_name(name).ok_or_else(|| ScenarioError::UnknownFaction(name.to_string()))
}

fn build_actor(world: &World, def: &SpawnDef) -> Result<Actor, ScenarioError> {
    let name = def.name.clone().unwrap_or_else(|| def.hull.clone());
    let hull = world
        .catalog
        .hull(&def.hull)
        .ok_or_else(|| ScenarioError::UnknownHull { actor: name.clone(), hull: def.hull.clone() })?;
    let faction = faction_id(&world.factions, &def.faction)?;
    let mut actor = Actor::new(ActorId::NONE, name, faction, hull, def.pos, def.vel, def.dir);

    for outfit_name in &def.loadout {
        let actor_name = actor.name.clone();
        let loadout_error = |source| ScenarioError::Loadout { actor: actor_name.clone(), outfit: outfit_name.clone(), source };
        let outfit = world.catalog.outfit(outfit_name).ok_or_else(|| loadout_error(EquipError::UnknownOutfit(outfit_name.clone())))?;
        actor.equip(outfit).map_err(loadout_error)?;
    }
    actor.fill_ammo(&world.catalog);

    actor.credits = def.credits;
    for (commodity, &quantity) in &def.cargo {
        actor.add_cargo(commodity, quantity);
    }
    Ok(actor)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"{
        "catalog": {
            "hulls": [{
                "name": "Scout", "class": "Fighter", "mass": 40, "thrust": 2000, "turn": 180,
                "speed": 250, "armour": 60, "shield": 40, "energy": 100, "energy_regen": 10,
                "fuel": 300, "cpu": 20, "cargo": 10, "size": 40,
                "slots": { "low": 2, "medium": 1, "high": 3 }
            }],
            "outfits": [{
                "name": "Laser", "mass": 2, "cpu": 4, "type": "bolt", "delay": 1, "speed": 600,
                "range": 500, "energy": 5, "damage": 10, "damage_type": "energy", "turret": false
            }],
            "commodities": [{ "name": "Food" }]
        },
        "factions": [
            { "name": "Pirate", "standing": -40, "enemies": ["Trader"] },
            { "name": "Trader", "standing": 20 }
        ],
        "system": { "name": "Test", "planets": [{ "name": "Port", "pos": [1000, 0], "faction": "Trader", "landable": true }] },
        "profiles": { "idle": { "source": "fn control() {}" } },
        "spawns": [
            { "hull": "Scout", "player": true },
            { "name": "Raider", "hull": "Scout", "faction": "Pirate", "pos": [300, 0], "loadout": ["Laser"], "profile": "idle" },
            { "hull": "Scout", "faction": "Trader", "cargo": { "Food": 4 }, "credits": 500 }
        ],
        "ticks": 10
    }"#;

    #[test]
    fn test_builds_world() {
        let scenario = Scenario::from_json(SCENARIO).unwrap();
        let mut sim = scenario.build().unwrap();
        assert!(sim.world().player().is_some());
        assert_eq!(sim.world().pending_spawns(), 2);
        sim.tick();
        assert_eq!(sim.world().actors.len(), 3);

        let raider = sim.world().actors.iter().find(|a| a.name == "Raider").unwrap();
        assert!(raider.behavior.is_some());
        assert!(raider.slots.iter().any(|s| s.outfit.as_ref().is_some_and(|o| o.name == "Laser")));

        let pirate = sim.world().factions.by_name("Pirate").unwrap();
        let trader = sim.world().factions.by_name("Trader").unwrap();
        assert!(sim.world().factions.are_enemies(pirate, trader));
        assert_eq!(sim.world().system.planets.len(), 1);
    }

    #[test]
    fn test_unknown_hull_rejected() {
        let mut scenario = Scenario::from_json(SCENARIO).unwrap();
        scenario.spawns[1].hull = "Galleon".to_string();
        assert!(matches!(scenario.build(), Err(ScenarioError::UnknownHull { .. })));
    }

    #[test]
    fn test_unknown_faction_rejected() {
        let mut scenario = Scenario::from_json(SCENARIO).unwrap();
        scenario.factions[0].enemies.push("Nobody".to_string());
        assert!(matches!(scenario.build(), Err(ScenarioError::UnknownFaction(name)) if name == "Nobody"));
    }

    #[test]
    fn test_bad_loadout_rejected() {
        let mut scenario = Scenario::from_json(SCENARIO).unwrap();
        scenario.spawns[1].loadout = vec!["Laser".to_string(); 4];
        assert!(matches!(scenario.build(), Err(ScenarioError::Loadout { .. })));
    }

    #[test]
    fn test_two_players_rejected() {
        let mut scenario = Scenario::from_json(SCENARIO).unwrap();
        scenario.spawns[2].player = true;
        assert!(matches!(scenario.build(), Err(ScenarioError::MultiplePlayers)));
    }

    #[test]
    fn test_validation_collects_profile_errors() {
        let mut scenario = Scenario::from_json(SCENARIO).unwrap();
        scenario.profiles.insert("broken".to_string(), ProfileSource::Inline { source: "fn (".to_string() });
        let validation = scenario.validate().unwrap();
        assert_eq!(validation.profiles, vec!["idle".to_string()]);
        assert_eq!(validation.profile_errors.len(), 1);
        assert!(!validation.is_ok());
        assert_eq!(validation.spawns, 3);
    }

    #[test]
    fn test_profile_path_relative_to_scenario() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("profiles")).unwrap();
        fs::write(dir.path().join("profiles/idle.rhai"), "fn control() {}").unwrap();
        let json = SCENARIO.replace(r#"{ "source": "fn control() {}" }"#, r#"{ "path": "profiles/idle.rhai" }"#);
        let path = dir.path().join("scenario.json");
        fs::write(&path, json).unwrap();

        let scenario = Scenario::load(&path).unwrap();
        assert_eq!(scenario.ticks, 10);
        assert!(scenario.validate().unwrap().is_ok());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = Scenario::load(Path::new("/nonexistent/scenario.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/scenario.json"));
    }
}
