//! Cargo hold bookkeeping. One tonne of cargo is one unit of mass.

use crate::error::CargoError;

/// A stack of one commodity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CargoItem {
    /// Commodity name.
    pub commodity: String,
    /// Tonnes aboard.
    pub quantity: u32,
    /// Set for mission cargo, which never merges and cannot be sold.
    pub mission_id: Option<u32>,
}

/// An actor's cargo hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CargoHold {
    items: Vec<CargoItem>,
    capacity: u32,
    last_mission_id: u32,
}

impl CargoHold {
    /// Empty hold with the given capacity.
    #[must_use]
    pub const fn new(capacity: u32) -> Self {
        Self {
            items: Vec::new(),
            capacity,
            last_mission_id: 0,
        }
    }

    /// Change the capacity. Cargo already aboard stays aboard.
    pub fn set_capacity(&mut self, capacity: u32) {
        self.capacity = capacity;
    }

    /// Total capacity.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Tonnes aboard.
    #[must_use]
    pub fn used(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Free tonnes.
    #[must_use]
    pub fn free(&self) -> u32 {
        self.capacity.saturating_sub(self.used())
    }

    /// Stacks aboard.
    #[must_use]
    pub fn items(&self) -> &[CargoItem] {
        &self.items
    }

    /// Tonnes of a commodity aboard, excluding mission cargo.
    #[must_use]
    pub fn quantity_of(&self, commodity: &str) -> u32 {
        self.items
            .iter()
            .filter(|i| i.mission_id.is_none() && i.commodity == commodity)
            .map(|i| i.quantity)
            .sum()
    }

    /// Add trade cargo, merging with an existing stack. Returns the amount added,
    /// which is limited by free space.
    pub fn add(&mut self, commodity: &str, quantity: u32) -> u32 {
        let q = quantity.min(self.free());
        if q == 0 {
            return 0;
        }
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|i| i.mission_id.is_none() && i.commodity == commodity)
        {
            item.quantity += q;
        } else {
            self.items.push(CargoItem {
                commodity: commodity.to_string(),
                quantity: q,
                mission_id: None,
            });
        }
        q
    }

    /// Add mission cargo as a separate stack and return its id, or `None`
    /// when the hold has no room for any of it.
    pub fn add_mission(&mut self, commodity: &str, quantity: u32) -> Option<u32> {
        let taken = quantity.min(self.free());
        if taken == 0 {
            return None;
        }
        let max_aboard = self.items.iter().filter_map(|i| i.mission_id).max().unwrap_or(0);
        self.last_mission_id = self.last_mission_id.max(max_aboard) + 1;
        let id = self.last_mission_id;
        self.items.push(CargoItem {
            commodity: commodity.to_string(),
            quantity: taken,
            mission_id: Some(id),
        });
        Some(id)
    }

    /// Remove a mission cargo stack.
    ///
    /// # Errors
    ///
    /// Returns [`CargoError::MissionCargoNotFound`] if no stack has this id.
    pub fn remove_mission(&mut self, id: u32) -> Result<CargoItem, CargoError> {
        let index = self
            .items
            .iter()
            .position(|i| i.mission_id == Some(id))
            .ok_or(CargoError::MissionCargoNotFound(id))?;
        Ok(self.items.remove(index))
    }

    /// Remove trade cargo, never touching mission cargo. Returns the amount removed.
    pub fn remove(&mut self, commodity: &str, quantity: u32) -> u32 {
        let Some(index) = self
            .items
            .iter()
            .position(|i| i.mission_id.is_none() && i.commodity == commodity)
        else {
            return 0;
        };
        let item = &mut self.items[index];
        let q = quantity.min(item.quantity);
        item.quantity -= q;
        if item.quantity == 0 {
            self.items.remove(index);
        }
        q
    }

    /// Empty the hold, returning everything that was aboard.
    pub fn take_all(&mut self) -> Vec<CargoItem> {
        std::mem::take(&mut self.items)
    }
}


/// Kani proofs for the hold arithmetic.
///
/// Run with: `cargo kani`
#[cfg(kani)]
mod kani_proofs {
    use super::*;

    /// Trade and mission cargo together never overfill the hold.
    #[kani::proof]
    #[kani::unwind(3)]
    fn prove_hold_never_overfills() {
        let capacity: u32 = kani::any();
        let trade: u32 = kani::any();
        let mission: u32 = kani::any();
        let mut hold = CargoHold::new(capacity);

        let added = hold.add("Ore", trade);
        let stowed = hold.add_mission("Parcels", mission).is_some();

        assert!(added <= trade);
        assert!(hold.used() <= capacity);
        assert_eq!(stowed, added < capacity && mission > 0);
    }

    /// Removing trade cargo returns at most what was aboard.
    #[kani::proof]
    #[kani::unwind(3)]
    fn prove_remove_is_bounded() {
        let capacity: u32 = kani::any();
        let quantity: u32 = kani::any();
        let taken: u32 = kani::any();
        let mut hold = CargoHold::new(capacity);

        let added = hold.add("Ore", quantity);
        let removed = hold.remove("Ore", taken);

        assert!(removed <= added);
        assert_eq!(hold.used(), added - removed);
    }
}
