//! Equipping and removing outfits, and ammunition bookkeeping.
//!
//! Every check runs before any mutation, so a rejected request leaves the
//! actor untouched.

use std::sync::Arc;

use tracing::warn;

use super::{Actor, Slot};
use crate::catalog::{ModStats, Outfit, OutfitKind};
use crate::error::EquipError;

/// One stat a modification can push negative, with its current value.
struct Budget {
    name: &'static str,
    delta: f64,
    available: f64,
}

impl Actor {
    fn budgets(&self, m: &ModStats) -> [Budget; 10] {
        let hull = &self.hull;
        let s = &self.stats;
        let b = |name, delta, available| Budget { name, delta, available };
        [
            b("thrust", m.thrust * hull.mass + m.thrust_rel * hull.thrust, s.thrust),
            b("speed", m.speed + m.speed_rel * hull.speed, s.speed),
            b("turn", m.turn + m.turn_rel * hull.turn, s.turn_base.to_degrees()),
            b("armour", m.armour, s.armour_max),
            b("shield", m.shield, s.shield_max),
            b("energy", m.energy, s.energy_max),
            b("armour regeneration", m.armour_regen, s.armour_regen),
            b("shield regeneration", m.shield_regen, s.shield_regen),
            b("energy regeneration", m.energy_regen, s.energy_regen),
            b("fuel", m.fuel, s.fuel_max),
        ]
    }

    /// Check whether `outfit` can go into slot `index`.
    ///
    /// # Errors
    ///
    /// Returns the reason the outfit cannot be equipped.
    pub fn can_add_outfit(&self, index: usize, outfit: &Outfit) -> Result<(), EquipError> {
        let slot = self.slots.get(index).ok_or(EquipError::NoSuchSlot)?;
        if slot.class < outfit.slot {
            return Err(EquipError::WrongSlotClass(slot.class.name()));
        }
        if !slot.is_empty() {
            return Err(EquipError::Occupied);
        }
        if outfit.cpu > 0.0 && self.stats.cpu < outfit.cpu {
            return Err(EquipError::InsufficientCpu);
        }
        if matches!(outfit.kind, OutfitKind::Afterburner(_)) && self.afterburner.is_some() {
            return Err(EquipError::DuplicateAfterburner);
        }
        if let Some(m) = outfit.modification() {
            if let Some(b) = self.budgets(m).into_iter().find(|b| b.delta < 0.0 && -b.delta > b.available) {
                return Err(EquipError::Insufficient(b.name));
            }
            if m.cargo < 0 && m.cargo.unsigned_abs() > u64::from(self.cargo.free()) {
                return Err(EquipError::Insufficient("cargo space"));
            }
        }
        Ok(())
    }

    /// Check whether the outfit in slot `index` can be removed.
    ///
    /// # Errors
    ///
    /// Returns the reason the outfit cannot be removed.
    pub fn can_remove_outfit(&self, index: usize) -> Result<(), EquipError> {
        let slot = self.slots.get(index).ok_or(EquipError::NoSuchSlot)?;
        let outfit = slot.outfit.as_ref().ok_or(EquipError::Empty)?;
        if outfit.cpu < 0.0 && self.stats.cpu < -outfit.cpu {
            return Err(EquipError::CpuInUse);
        }
        if let Some(m) = outfit.modification() {
            if let Some(b) = self.budgets(m).into_iter().find(|b| b.delta > 0.0 && b.delta > b.available) {
                return Err(EquipError::IncreaseFirst(b.name));
            }
            if m.cargo > 0 && m.cargo.unsigned_abs() > u64::from(self.cargo.free()) {
                return Err(EquipError::IncreaseFirst("free cargo space"));
            }
        }
        if outfit.is_fighter_bay() && slot.ammo().is_some_and(|a| a.deployed > 0) {
            return Err(EquipError::FightersDeployed);
        }
        Ok(())
    }

    /// Equip `outfit` into slot `index` and recompute stats.
    ///
    /// # Errors
    ///
    /// Returns the rejection reason; the actor is unchanged on error.
    pub fn add_outfit(&mut self, index: usize, outfit: Arc<Outfit>) -> Result<(), EquipError> {
        self.can_add_outfit(index, &outfit)?;
        let slot = &mut self.slots[index];
        slot.state = Slot::state_for(&outfit);
        slot.timer = 0.0;
        slot.outfit = Some(outfit);
        self.recalculate_stats();
        Ok(())
    }

    /// Remove the outfit in slot `index`, along with any ammunition it held.
    ///
    /// # Errors
    ///
    /// Returns the rejection reason; the actor is unchanged on error.
    pub fn remove_outfit(&mut self, index: usize) -> Result<Arc<Outfit>, EquipError> {
        self.can_remove_outfit(index)?;
        let slot = &mut self.slots[index];
        let outfit = slot.outfit.take().ok_or(EquipError::Empty)?;
        slot.state = super::SlotState::Idle;
        slot.timer = 0.0;
        if self.secondary == Some(index) {
            self.secondary = None;
        }
        self.recalculate_stats();
        Ok(outfit)
    }

    /// Equip `outfit` into the smallest free slot that fits it.
    ///
    /// # Errors
    ///
    /// Returns [`EquipError::NoFreeSlot`] or the rejection reason for the chosen slot.
    pub fn equip(&mut self, outfit: Arc<Outfit>) -> Result<usize, EquipError> {
        let index = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_empty() && s.class >= outfit.slot)
            .min_by_key(|(_, s)| s.class)
            .map(|(i, _)| i)
            .ok_or(EquipError::NoFreeSlot(outfit.slot.name()))?;
        self.add_outfit(index, outfit)?;
        Ok(index)
    }

    /// Load up to `quantity` rounds of `ammo` into the launcher or bay in slot
    /// `index`. Returns the number actually loaded.
    ///
    /// # Errors
    ///
    /// Fails if the slot does not exist or does not take this ammunition.
    pub fn add_ammo(&mut self, index: usize, ammo: &Arc<Outfit>, quantity: u32) -> Result<u32, EquipError> {
        let slot = self.slots.get_mut(index).ok_or(EquipError::NoSuchSlot)?;
        let outfit = slot.outfit.as_ref().ok_or(EquipError::Empty)?;
        if outfit.ammo_name() != Some(ammo.name.as_str()) {
            return Err(EquipError::AmmoMismatch(ammo.name.clone()));
        }
        let capacity = outfit.ammo_capacity();
        let state = slot.ammo_mut().ok_or_else(|| EquipError::AmmoMismatch(ammo.name.clone()))?;
        let room = capacity.saturating_sub(state.deployed).saturating_sub(state.quantity);
        let added = quantity.min(room);
        state.ammo = Some(Arc::clone(ammo));
        state.quantity += added;
        self.adjust_outfit_mass(f64::from(added) * ammo.mass);
        Ok(added)
    }

    /// Unload up to `quantity` rounds from slot `index`. The ammunition type
    /// stays set. Returns the number removed.
    pub fn remove_ammo(&mut self, index: usize, quantity: u32) -> u32 {
        let Some(state) = self.slots.get_mut(index).and_then(Slot::ammo_mut) else {
            return 0;
        };
        let removed = quantity.min(state.quantity);
        state.quantity -= removed;
        let mass = state.ammo.as_ref().map_or(0.0, |a| a.mass);
        self.adjust_outfit_mass(-f64::from(removed) * mass);
        removed
    }

    /// Fill every launcher and bay from the catalog's ammunition. Returns
    /// the rounds loaded.
    pub fn fill_ammo(&mut self, catalog: &crate::catalog::Catalog) -> u32 {
        let mut loaded = 0;
        for index in 0..self.slots.len() {
            let Some(outfit) = self.slots[index].outfit.clone() else { continue };
            let Some(ammo) = catalog.ammo_for(&outfit) else {
                if outfit.uses_ammo() {
                    warn!(actor = %self.id, outfit = %outfit.name, "ammo_not_in_catalog");
                }
                continue;
            };
            match self.add_ammo(index, &ammo, outfit.ammo_capacity()) {
                Ok(added) => loaded += added,
                Err(e) => warn!(actor = %self.id, outfit = %outfit.name, error = %e, "ammo_fill_failed"),
            }
        }
        loaded
    }

    /// Any fighter bay has fighters out.
    #[must_use]
    pub fn has_deployed(&self) -> bool {
        self.slots
            .iter()
            .filter(|s| s.outfit.as_ref().is_some_and(|o| o.is_fighter_bay()))
            .any(|s| s.ammo().is_some_and(|a| a.deployed > 0))
    }
}
