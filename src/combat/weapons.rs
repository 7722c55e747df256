//! Weapon scheduling: cooldowns, the same-delay fairness rule, and the
//! per-category effects of firing a slot.

use std::sync::Arc;

use crate::actor::{Actor, SlotState};
use crate::catalog::{Outfit, OutfitKind, SlotClass};

/// Which primaries fire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FireMode {
    /// Every primary.
    #[default]
    All,
    /// Turrets only.
    Turrets,
    /// Forward mounts only.
    Forward,
}

impl FireMode {
    /// Decode the script-facing number (0 all, 1 turrets, 2 forward).
    #[must_use]
    pub const fn from_index(index: i64) -> Self {
        match index {
            1 => Self::Turrets,
            2 => Self::Forward,
            _ => Self::All,
        }
    }

    const fn accepts(self, outfit: &Outfit) -> bool {
        match self {
            Self::All => true,
            Self::Turrets => outfit.is_turret(),
            Self::Forward => !outfit.is_turret(),
        }
    }
}

/// What a slot produced when it fired. The world turns these into projectiles,
/// beams and escorts.
#[derive(Debug, Clone, PartialEq)]
pub enum Shot {
    /// A bolt left the mount.
    Bolt {
        /// Slot index.
        slot: usize,
        /// Weapon.
        outfit: Arc<Outfit>,
    },
    /// A launcher fired one round.
    Missile {
        /// Slot index.
        slot: usize,
        /// Ammunition fired.
        ammo: Arc<Outfit>,
    },
    /// A beam switched on.
    Beam {
        /// Slot index.
        slot: usize,
    },
    /// A bay launched a fighter.
    Fighter {
        /// Slot index.
        slot: usize,
        /// Fighter outfit launched.
        fighter: Arc<Outfit>,
    },
}

/// Whether the fairness rule lets slot `index` fire now.
///
/// Among high slots sharing the slot's fire delay (launchers and bays count
/// only while loaded), the most recently fired one must have cooled down past
/// `delay * (q - 1) / q`. Identical mounts thereby fire evenly staggered.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn fairness_allows(actor: &Actor, index: usize) -> bool {
    let Some(outfit) = actor.slots.get(index).and_then(|s| s.outfit.as_ref()) else {
        return false;
    };
    if outfit.is_beam() {
        return true;
    }
    let delay = outfit.delay();
    let mut q = 0_u32;
    let mut mint = f64::NEG_INFINITY;
    for slot in actor.slots.iter().filter(|s| s.class == SlotClass::High) {
        let Some(other) = &slot.outfit else { continue };
        if other.delay() != delay {
            continue;
        }
        if other.uses_ammo() && !slot.has_ammo() {
            continue;
        }
        mint = mint.max(slot.timer);
        q += 1;
    }
    if q == 0 {
        return false;
    }
    let q = f64::from(q);
    mint <= delay * (q - 1.0) / q
}

/// Try to fire slot `index`. Rejections (cooldown, fairness, energy, ammo)
/// leave the actor untouched and return `None`.
pub fn fire_slot(actor: &mut Actor, index: usize) -> Option<Shot> {
    let slot = actor.slots.get(index)?;
    let outfit = Arc::clone(slot.outfit.as_ref()?);
    if slot.timer > 0.0 || !fairness_allows(actor, index) {
        return None;
    }

    let shot = match &outfit.kind {
        OutfitKind::Bolt(b) => {
            if b.energy > actor.pools.energy {
                return None;
            }
            actor.pools.energy -= b.energy;
            Shot::Bolt { slot: index, outfit: Arc::clone(&outfit) }
        }
        OutfitKind::Beam(b) => {
            if b.energy > actor.pools.energy {
                return None;
            }
            if let SlotState::Beam(state) = &mut actor.slots[index].state {
                state.on = true;
                state.remaining = b.duration;
            }
            Shot::Beam { slot: index }
        }
        OutfitKind::Launcher(_) => {
            let ammo = actor.slots[index].ammo().filter(|a| a.quantity > 0)?.ammo.clone()?;
            if ammo.is_smart_ammo() && actor.target == actor.id {
                return None;
            }
            if ammo.energy() > actor.pools.energy {
                return None;
            }
            actor.pools.energy -= ammo.energy();
            take_round(actor, index, &ammo, false);
            Shot::Missile { slot: index, ammo }
        }
        OutfitKind::FighterBay(_) => {
            let fighter = actor.slots[index].ammo().filter(|a| a.quantity > 0)?.ammo.clone()?;
            take_round(actor, index, &fighter, true);
            Shot::Fighter { slot: index, fighter }
        }
        _ => return None,
    };

    actor.slots[index].timer += outfit.delay();
    Some(shot)
}

fn take_round(actor: &mut Actor, index: usize, ammo: &Outfit, deploy: bool) {
    if let Some(state) = actor.slots[index].ammo_mut() {
        state.quantity -= 1;
        if deploy {
            state.deployed += 1;
        }
    }
    actor.adjust_outfit_mass(-ammo.mass);
}

/// Primary weapon slots matching `mode`.
#[must_use]
pub fn primary_slots(actor: &Actor, mode: FireMode) -> Vec<usize> {
    actor
        .slots
        .iter()
        .enumerate()
        .filter(|(_, s)| s.class == SlotClass::High)
        .filter_map(|(i, s)| s.outfit.as_ref().map(|o| (i, o)))
        .filter(|(_, o)| o.is_weapon() && !o.is_secondary() && mode.accepts(o))
        .map(|(i, _)| i)
        .collect()
}

/// Every high slot carrying the same outfit as the selected secondary.
#[must_use]
pub fn secondary_slots(actor: &Actor) -> Vec<usize> {
    let Some(selected) = actor.secondary.and_then(|i| actor.slots.get(i)).and_then(|s| s.outfit.as_ref()) else {
        return Vec::new();
    };
    actor
        .slots
        .iter()
        .enumerate()
        .filter(|(_, s)| s.class == SlotClass::High)
        .filter(|(_, s)| s.outfit.as_ref().is_some_and(|o| o.name == selected.name))
        .map(|(i, _)| i)
        .collect()
}

/// Fire a group of slots, collecting what they produced.
pub fn fire_group(actor: &mut Actor, slots: &[usize]) -> Vec<Shot> {
    slots.iter().filter_map(|&i| fire_slot(actor, i)).collect()
}

/// Switch off beams in the primary (or secondary) group. Returns the slots
/// that were switched off.
pub fn stop_beams(actor: &mut Actor, secondary: bool) -> Vec<usize> {
    let group = if secondary {
        secondary_slots(actor)
    } else {
        primary_slots(actor, FireMode::All)
    };
    group.into_iter().filter(|&i| switch_off(actor, i)).collect()
}

/// Switch off every beam on the actor.
pub fn stop_all_beams(actor: &mut Actor) -> Vec<usize> {
    (0..actor.slots.len()).filter(|&i| switch_off(actor, i)).collect()
}

fn switch_off(actor: &mut Actor, index: usize) -> bool {
    match &mut actor.slots[index].state {
        SlotState::Beam(state) if state.on => {
            state.on = false;
            state.remaining = 0.0;
            true
        }
        _ => false,
    }
}

/// Drain energy for active beams and shut off the ones whose duration ran
/// out or that can no longer be powered. Returns the slots switched off.
pub fn update_beams(actor: &mut Actor, dt: f64) -> Vec<usize> {
    let mut stopped = Vec::new();
    for index in 0..actor.slots.len() {
        let cost = match &actor.slots[index].outfit {
            Some(o) if o.is_beam() => o.energy() * dt,
            _ => continue,
        };
        let SlotState::Beam(state) = &mut actor.slots[index].state else { continue };
        if !state.on {
            continue;
        }
        state.remaining -= dt;
        if state.remaining <= 0.0 || actor.pools.energy < cost {
            state.on = false;
            state.remaining = 0.0;
            stopped.push(index);
        } else {
            actor.pools.energy -= cost;
        }
    }
    stopped
}

/// Average speed of the selected secondary's ammunition when it is a dumb
/// launcher, for lead calculations.
#[must_use]
pub fn secondary_lead_speed(actor: &Actor) -> Option<f64> {
    let slot = actor.slots.get(actor.secondary?)?;
    let ammo = slot.ammo()?.ammo.as_ref()?;
    (!ammo.is_smart_ammo()).then(|| ammo.speed())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::actor::fixtures::scout;
    use crate::catalog::fixtures::catalog;

    fn armed(outfits: &[&str]) -> Actor {
        let catalog = catalog();
        let mut actor = scout(2);
        for (offset, name) in outfits.iter().enumerate() {
            actor.add_outfit(3 + offset, catalog.outfit(name).unwrap()).unwrap();
        }
        actor.fill_ammo(&catalog);
        actor
    }

    fn tick_timers(actor: &mut Actor, dt: f64) {
        for slot in &mut actor.slots {
            if slot.timer > 0.0 {
                slot.timer -= dt;
            }
        }
    }

    #[test]
    fn test_two_identical_mounts_stagger() {
        let mut actor = armed(&["Laser", "Laser"]);
        actor.stats.energy_regen = 0.0;
        let dt = 0.01;
        let mut shots = Vec::new();
        for step in 0..400 {
            let t = f64::from(step) * dt;
            actor.pools.energy = 100.0;
            let fired = fire_group(&mut actor, &[3, 4]);
            assert!(fired.len() <= 1, "volley at t={t}");
            if !fired.is_empty() {
                shots.push(t);
            }
            tick_timers(&mut actor, dt);
        }
        assert!(shots.len() >= 6);
        for pair in shots.windows(2).skip(1) {
            assert_relative_eq!(pair[1] - pair[0], 0.5, epsilon = 0.02);
        }
    }

    #[test]
    fn test_bolt_needs_energy() {
        let mut actor = armed(&["Laser"]);
        actor.pools.energy = 4.0;
        assert!(fire_slot(&mut actor, 3).is_none());
        assert_relative_eq!(actor.pools.energy, 4.0);
        actor.pools.energy = 6.0;
        assert!(matches!(fire_slot(&mut actor, 3), Some(Shot::Bolt { slot: 3, .. })));
        assert_relative_eq!(actor.pools.energy, 1.0);
        assert_relative_eq!(actor.slots[3].timer, 1.0);
        assert!(fire_slot(&mut actor, 3).is_none());
    }

    #[test]
    fn test_smart_missile_needs_target() {
        let mut actor = armed(&["Launcher"]);
        assert!(fire_slot(&mut actor, 3).is_none());
        actor.target = crate::actor::ActorId(9);
        let mass = actor.solid.mass;
        assert!(matches!(fire_slot(&mut actor, 3), Some(Shot::Missile { .. })));
        assert_eq!(actor.slots[3].ammo_quantity(), 3);
        assert_relative_eq!(actor.solid.mass, mass - 0.5);
    }

    #[test]
    fn test_empty_launcher_never_fires() {
        let mut actor = armed(&["Launcher"]);
        actor.target = crate::actor::ActorId(9);
        actor.remove_ammo(3, 4);
        assert!(!fairness_allows(&actor, 3));
        assert!(fire_slot(&mut actor, 3).is_none());
    }

    #[test]
    fn test_fighter_bay_deploys() {
        let mut actor = armed(&["Drone Bay"]);
        assert!(matches!(fire_slot(&mut actor, 3), Some(Shot::Fighter { .. })));
        let state = actor.slots[3].ammo().unwrap();
        assert_eq!((state.quantity, state.deployed), (1, 1));
    }

    #[test]
    fn test_beam_runs_for_duration_then_stops() {
        let mut actor = armed(&["Pulse Beam"]);
        assert_eq!(fire_slot(&mut actor, 3), Some(Shot::Beam { slot: 3 }));
        assert!(actor.slots[3].beam_on());
        let mut stopped = Vec::new();
        for _ in 0..20 {
            stopped.extend(update_beams(&mut actor, 0.1));
        }
        assert_eq!(stopped, vec![3]);
        assert!(!actor.slots[3].beam_on());
    }

    #[test]
    fn test_fire_modes() {
        let actor = armed(&["Laser", "Pulse Beam", "Launcher"]);
        assert_eq!(primary_slots(&actor, FireMode::All), vec![3, 4]);
        assert_eq!(primary_slots(&actor, FireMode::Turrets), vec![4]);
        assert_eq!(primary_slots(&actor, FireMode::Forward), vec![3]);
    }

    #[test]
    fn test_secondary_group_and_beam_stop() {
        let mut actor = armed(&["Pulse Beam", "Launcher", "Launcher"]);
        actor.secondary = Some(4);
        assert_eq!(secondary_slots(&actor), vec![4, 5]);
        fire_slot(&mut actor, 3);
        assert_eq!(stop_beams(&mut actor, true), Vec::<usize>::new());
        assert_eq!(stop_beams(&mut actor, false), vec![3]);
    }
}
