//! Outfit slots and their per-category runtime state.

use std::sync::Arc;

use crate::catalog::{Outfit, SlotClass};

/// Ammunition bookkeeping for launchers and fighter bays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmmoState {
    /// Loaded ammunition type. Kept after the magazine runs dry.
    pub ammo: Option<Arc<Outfit>>,
    /// Rounds (or fighters) aboard.
    pub quantity: u32,
    /// Fighters currently launched.
    pub deployed: u32,
}

/// Beam on/off state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BeamState {
    /// Beam firing.
    pub on: bool,
    /// Seconds left before the beam shuts off.
    pub remaining: f64,
}

/// Category-specific slot state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SlotState {
    /// Nothing to track.
    #[default]
    Idle,
    /// Launcher or bay.
    Ammo(AmmoState),
    /// Beam weapon.
    Beam(BeamState),
}

/// One equip point.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    /// Capacity class.
    pub class: SlotClass,
    /// Equipped outfit.
    pub outfit: Option<Arc<Outfit>>,
    /// Cooldown; the weapon may fire once this is at or below zero.
    pub timer: f64,
    /// Runtime state.
    pub state: SlotState,
}

impl Slot {
    /// An empty slot.
    #[must_use]
    pub const fn new(class: SlotClass) -> Self {
        Self {
            class,
            outfit: None,
            timer: 0.0,
            state: SlotState::Idle,
        }
    }

    /// Nothing equipped.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.outfit.is_none()
    }

    /// Ammunition state, for launchers and bays.
    #[must_use]
    pub const fn ammo(&self) -> Option<&AmmoState> {
        match &self.state {
            SlotState::Ammo(a) => Some(a),
            _ => None,
        }
    }

    /// Mutable ammunition state.
    pub fn ammo_mut(&mut self) -> Option<&mut AmmoState> {
        match &mut self.state {
            SlotState::Ammo(a) => Some(a),
            _ => None,
        }
    }

    /// Rounds aboard; zero for non-ammo slots.
    #[must_use]
    pub fn ammo_quantity(&self) -> u32 {
        self.ammo().map_or(0, |a| a.quantity)
    }

    /// Loaded with at least one round.
    #[must_use]
    pub fn has_ammo(&self) -> bool {
        self.ammo().is_some_and(|a| a.ammo.is_some() && a.quantity > 0)
    }

    /// Beam currently firing.
    #[must_use]
    pub const fn beam_on(&self) -> bool {
        matches!(self.state, SlotState::Beam(BeamState { on: true, .. }))
    }

    /// Fresh runtime state for an outfit.
    pub(crate) fn state_for(outfit: &Outfit) -> SlotState {
        if outfit.uses_ammo() {
            SlotState::Ammo(AmmoState::default())
        } else if outfit.is_beam() {
            SlotState::Beam(BeamState::default())
        } else {
            SlotState::Idle
        }
    }
}
