//! Static ship, outfit and commodity data.
//!
//! The catalog is read-only once built and is shared between simulations
//! through an `Arc`, so parallel batch runs never copy it.

mod hull;
mod outfit;

pub use hull::{Commodity, Hull, SlotCounts};
pub use outfit::{
    AfterburnerStats, AmmoStats, BeamStats, BoltStats, DamageType, FighterBayStats, JammerStats,
    LauncherStats, ModStats, Outfit, OutfitKind, SlotClass,
};

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Serialized catalog contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogDefs {
    /// Hull definitions.
    pub hulls: Vec<Hull>,
    /// Outfit definitions.
    pub outfits: Vec<Outfit>,
    /// Commodity definitions.
    pub commodities: Vec<Commodity>,
}

/// Lookup tables for hulls, outfits and commodities.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    hulls: HashMap<String, Arc<Hull>>,
    outfits: HashMap<String, Arc<Outfit>>,
    commodities: HashMap<String, Arc<Commodity>>,
}

impl Catalog {
    /// Build a catalog, checking for duplicates and dangling references.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate names or when a launcher, bay or fighter
    /// references an entry that does not exist.
    pub fn from_defs(defs: CatalogDefs) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for hull in defs.hulls {
            catalog.insert_hull(hull)?;
        }
        for outfit in defs.outfits {
            catalog.insert_outfit(outfit)?;
        }
        for commodity in defs.commodities {
            if catalog.commodities.contains_key(&commodity.name) {
                return Err(CatalogError::Duplicate { kind: "commodity", name: commodity.name });
            }
            catalog.commodities.insert(commodity.name.clone(), Arc::new(commodity));
        }
        catalog.validate()?;
        Ok(catalog)
    }

    fn insert_hull(&mut self, hull: Hull) -> Result<(), CatalogError> {
        if self.hulls.contains_key(&hull.name) {
            return Err(CatalogError::Duplicate { kind: "hull", name: hull.name });
        }
        self.hulls.insert(hull.name.clone(), Arc::new(hull));
        Ok(())
    }

    fn insert_outfit(&mut self, outfit: Outfit) -> Result<(), CatalogError> {
        if self.outfits.contains_key(&outfit.name) {
            return Err(CatalogError::Duplicate { kind: "outfit", name: outfit.name });
        }
        self.outfits.insert(outfit.name.clone(), Arc::new(outfit));
        Ok(())
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for outfit in self.outfits.values() {
            if let Some(ammo) = outfit.ammo_name() {
                if !self.outfits.contains_key(ammo) {
                    return Err(CatalogError::UnknownAmmo {
                        outfit: outfit.name.clone(),
                        ammo: ammo.to_string(),
                    });
                }
            }
            if let OutfitKind::Fighter { hull } = &outfit.kind {
                if !self.hulls.contains_key(hull) {
                    return Err(CatalogError::UnknownHull {
                        outfit: outfit.name.clone(),
                        hull: hull.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Look up a hull.
    #[must_use]
    pub fn hull(&self, name: &str) -> Option<Arc<Hull>> {
        self.hulls.get(name).cloned()
    }

    /// Look up an outfit.
    #[must_use]
    pub fn outfit(&self, name: &str) -> Option<Arc<Outfit>> {
        self.outfits.get(name).cloned()
    }

    /// Look up a commodity.
    #[must_use]
    pub fn commodity(&self, name: &str) -> Option<Arc<Commodity>> {
        self.commodities.get(name).cloned()
    }

    /// Ammunition fed to a launcher or bay.
    #[must_use]
    pub fn ammo_for(&self, launcher: &Outfit) -> Option<Arc<Outfit>> {
        launcher.ammo_name().and_then(|name| self.outfit(name))
    }

    /// Hull flown by a fighter outfit.
    #[must_use]
    pub fn fighter_hull(&self, fighter: &Outfit) -> Option<Arc<Hull>> {
        match &fighter.kind {
            OutfitKind::Fighter { hull } => self.hull(hull),
            _ => None,
        }
    }

    /// Number of hulls.
    #[must_use]
    pub fn hull_count(&self) -> usize {
        self.hulls.len()
    }

    /// Number of outfits.
    #[must_use]
    pub fn outfit_count(&self) -> usize {
        self.outfits.len()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small catalog shared by unit tests across the crate.

    use super::*;

    pub(crate) fn hull(name: &str) -> Hull {
        Hull {
            name: name.to_string(),
            class: "Fighter".to_string(),
            price: 10_000,
            mass: 40.0,
            thrust: 2000.0,
            turn: 180.0,
            speed: 250.0,
            armour: 60.0,
            armour_regen: 0.0,
            shield: 40.0,
            shield_regen: 1.0,
            energy: 100.0,
            energy_regen: 10.0,
            fuel: 300.0,
            cpu: 20.0,
            cargo: 10,
            size: 40.0,
            slots: SlotCounts { low: 2, medium: 1, high: 3 },
        }
    }

    pub(crate) fn laser() -> Outfit {
        Outfit {
            name: "Laser".to_string(),
            price: 1000,
            mass: 2.0,
            cpu: 4.0,
            slot: SlotClass::High,
            secondary: false,
            kind: OutfitKind::Bolt(BoltStats {
                delay: 1.0,
                speed: 600.0,
                range: 500.0,
                energy: 5.0,
                damage: 10.0,
                damage_type: DamageType::Energy,
                turret: false,
            }),
        }
    }

    pub(crate) fn catalog() -> Catalog {
        let defs = CatalogDefs {
            hulls: vec![hull("Scout"), Hull { name: "Drone".to_string(), mass: 10.0, size: 15.0, ..hull("Drone") }],
            outfits: vec![
                laser(),
                Outfit {
                    name: "Pulse Beam".to_string(),
                    price: 3000,
                    mass: 4.0,
                    cpu: 6.0,
                    slot: SlotClass::High,
                    secondary: false,
                    kind: OutfitKind::Beam(BeamStats {
                        delay: 3.0,
                        range: 400.0,
                        duration: 1.5,
                        energy: 8.0,
                        damage: 20.0,
                        damage_type: DamageType::Energy,
                        turret: true,
                    }),
                },
                Outfit {
                    name: "Launcher".to_string(),
                    price: 2000,
                    mass: 3.0,
                    cpu: 3.0,
                    slot: SlotClass::High,
                    secondary: false,
                    kind: OutfitKind::Launcher(LauncherStats {
                        delay: 2.0,
                        ammo: "Missile".to_string(),
                        capacity: 4,
                    }),
                },
                Outfit {
                    name: "Missile".to_string(),
                    price: 100,
                    mass: 0.5,
                    cpu: 0.0,
                    slot: SlotClass::High,
                    secondary: false,
                    kind: OutfitKind::Ammo(AmmoStats {
                        speed: 400.0,
                        duration: 3.0,
                        energy: 2.0,
                        damage: 30.0,
                        damage_type: DamageType::Kinetic,
                        smart: true,
                        turn: 120.0,
                    }),
                },
                Outfit {
                    name: "Drone Bay".to_string(),
                    price: 5000,
                    mass: 5.0,
                    cpu: 5.0,
                    slot: SlotClass::High,
                    secondary: false,
                    kind: OutfitKind::FighterBay(FighterBayStats {
                        delay: 1.0,
                        ammo: "Drone Fighter".to_string(),
                        capacity: 2,
                    }),
                },
                Outfit {
                    name: "Drone Fighter".to_string(),
                    price: 500,
                    mass: 10.0,
                    cpu: 0.0,
                    slot: SlotClass::High,
                    secondary: false,
                    kind: OutfitKind::Fighter { hull: "Drone".to_string() },
                },
                Outfit {
                    name: "Shield Booster".to_string(),
                    price: 800,
                    mass: 1.0,
                    cpu: 2.0,
                    slot: SlotClass::Low,
                    secondary: false,
                    kind: OutfitKind::Modification(ModStats { shield: 20.0, ..ModStats::default() }),
                },
                Outfit {
                    name: "Cargo Pod".to_string(),
                    price: 400,
                    mass: 2.0,
                    cpu: 0.0,
                    slot: SlotClass::Low,
                    secondary: false,
                    kind: OutfitKind::Modification(ModStats { cargo: 5, ..ModStats::default() }),
                },
                Outfit {
                    name: "Processor".to_string(),
                    price: 700,
                    mass: 0.5,
                    cpu: -10.0,
                    slot: SlotClass::Medium,
                    secondary: false,
                    kind: OutfitKind::Modification(ModStats::default()),
                },
                Outfit {
                    name: "Afterburner".to_string(),
                    price: 900,
                    mass: 1.0,
                    cpu: 1.0,
                    slot: SlotClass::Medium,
                    secondary: false,
                    kind: OutfitKind::Afterburner(AfterburnerStats { thrust: 1.5, speed: 1.5, energy: 10.0 }),
                },
            ],
            commodities: vec![
                Commodity { name: "Food".to_string(), price: 100 },
                Commodity { name: "Ore".to_string(), price: 200 },
            ],
        };
        Catalog::from_defs(defs).unwrap()
    }
}
