//! Derived ship stats and the recompute that produces them.

use std::f64::consts::PI;
use std::sync::Arc;

use serde::Serialize;

use super::Actor;
use crate::catalog::OutfitKind;

/// Current values of the four resource pools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Pools {
    /// Armour.
    pub armour: f64,
    /// Shield.
    pub shield: f64,
    /// Energy.
    pub energy: f64,
    /// Fuel.
    pub fuel: f64,
}

/// Stats derived from the hull plus equipped outfits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ShipStats {
    /// Engine force.
    pub thrust: f64,
    /// Top speed.
    pub speed: f64,
    /// Turn rate in radians per second, scaled by mass.
    pub turn: f64,
    /// Turn rate before mass scaling.
    pub turn_base: f64,
    /// Maximum armour.
    pub armour_max: f64,
    /// Maximum shield.
    pub shield_max: f64,
    /// Maximum energy.
    pub energy_max: f64,
    /// Maximum fuel.
    pub fuel_max: f64,
    /// Armour regeneration per second.
    pub armour_regen: f64,
    /// Shield regeneration per second.
    pub shield_regen: f64,
    /// Energy regeneration per second.
    pub energy_regen: f64,
    /// Energy charging time constant.
    pub energy_tau: f64,
    /// Free CPU.
    pub cpu: f64,
    /// Total CPU including providers.
    pub cpu_max: f64,
    /// Average primary weapon range.
    pub weap_range: f64,
    /// Average primary projectile speed.
    pub weap_speed: f64,
    /// Best jammer range.
    pub jam_range: f64,
    /// Best jammer chance.
    pub jam_chance: f64,
    /// Mass of outfits and loaded ammunition.
    pub mass_outfit: f64,
}

fn ratio(current: f64, max: f64) -> f64 {
    if max > 0.0 { current / max } else { 1.0 }
}

impl Actor {
    /// Recompute every derived stat from the hull and equipped outfits.
    ///
    /// Resource pools keep their fraction of max across the recompute.
    pub fn recalculate_stats(&mut self) {
        let hull = Arc::clone(&self.hull);
        let armour_ratio = ratio(self.pools.armour, self.stats.armour_max);
        let shield_ratio = ratio(self.pools.shield, self.stats.shield_max);
        let energy_ratio = ratio(self.pools.energy, self.stats.energy_max);
        let fuel_ratio = ratio(self.pools.fuel, self.stats.fuel_max);

        let mut s = ShipStats {
            thrust: hull.thrust,
            speed: hull.speed,
            turn_base: hull.turn,
            armour_max: hull.armour,
            shield_max: hull.shield,
            energy_max: hull.energy,
            fuel_max: hull.fuel,
            armour_regen: hull.armour_regen,
            shield_regen: hull.shield_regen,
            energy_regen: hull.energy_regen,
            cpu: hull.cpu,
            cpu_max: hull.cpu,
            ..ShipStats::default()
        };
        let mut cargo = i64::from(hull.cargo);
        let mut weapons = 0_u32;
        let mut afterburner = None;

        for (index, slot) in self.slots.iter().enumerate() {
            let Some(outfit) = &slot.outfit else { continue };
            s.cpu -= outfit.cpu;
            if outfit.cpu < 0.0 {
                s.cpu_max -= outfit.cpu;
            }
            s.mass_outfit += outfit.mass;

            match &outfit.kind {
                OutfitKind::Modification(m) => {
                    s.thrust += m.thrust * hull.mass + m.thrust_rel * hull.thrust;
                    s.turn_base += m.turn + m.turn_rel * hull.turn;
                    s.speed += m.speed + m.speed_rel * hull.speed;
                    s.armour_max += m.armour;
                    s.armour_regen += m.armour_regen;
                    s.shield_max += m.shield;
                    s.shield_regen += m.shield_regen;
                    s.energy_max += m.energy;
                    s.energy_regen += m.energy_regen;
                    s.fuel_max += m.fuel;
                    cargo += m.cargo;
                    s.mass_outfit += m.mass_rel * hull.mass;
                }
                OutfitKind::Afterburner(_) => afterburner = Some(index),
                OutfitKind::Jammer(j) => {
                    if j.chance > s.jam_chance {
                        s.jam_chance = j.chance;
                        s.jam_range = j.range;
                    }
                    s.energy_regen -= j.energy;
                }
                OutfitKind::Bolt(_) | OutfitKind::Beam(_) if !outfit.is_secondary() => {
                    s.weap_range += outfit.range();
                    s.weap_speed += outfit.speed();
                    weapons += 1;
                }
                _ => {}
            }

            if let Some(state) = slot.ammo() {
                if let Some(ammo) = &state.ammo {
                    s.mass_outfit += f64::from(state.quantity) * ammo.mass;
                }
            }
        }

        if weapons > 0 {
            s.weap_range /= f64::from(weapons);
            s.weap_speed /= f64::from(weapons);
        }
        s.turn_base *= PI / 180.0;
        s.energy_tau = if s.energy_regen > 0.0 {
            s.energy_max / s.energy_regen
        } else {
            f64::INFINITY
        };

        self.pools.armour = armour_ratio * s.armour_max;
        self.pools.shield = shield_ratio * s.shield_max;
        self.pools.energy = energy_ratio * s.energy_max;
        self.pools.fuel = fuel_ratio * s.fuel_max;
        self.stats = s;
        self.afterburner = afterburner;
        self.cargo.set_capacity(u32::try_from(cargo.max(0)).unwrap_or(u32::MAX));
        self.update_mass();
    }

    /// Refresh total mass and the mass-scaled turn rate.
    pub fn update_mass(&mut self) {
        let mass = self.hull.mass + f64::from(self.cargo.used()) + self.stats.mass_outfit;
        self.solid.mass = mass;
        self.stats.turn = if mass > 0.0 {
            self.stats.turn_base * self.hull.mass / mass
        } else {
            self.stats.turn_base
        };
    }

    /// Add (or with a negative delta remove) outfit mass, such as ammunition.
    pub fn adjust_outfit_mass(&mut self, delta: f64) {
        self.stats.mass_outfit = (self.stats.mass_outfit + delta).max(0.0);
        self.update_mass();
    }

    /// Names of derived stats that have gone negative.
    #[must_use]
    pub fn sanity_check(&self) -> Vec<&'static str> {
        let s = &self.stats;
        [
            (s.thrust, "thrust"),
            (s.speed, "speed"),
            (s.turn, "turn"),
            (s.armour_max, "armour"),
            (s.armour_regen, "armour regeneration"),
            (s.shield_max, "shield"),
            (s.shield_regen, "shield regeneration"),
            (s.energy_max, "energy"),
            (s.energy_regen, "energy regeneration"),
            (s.fuel_max, "fuel"),
            (s.cpu, "CPU"),
        ]
        .into_iter()
        .filter(|(value, _)| *value < 0.0)
        .map(|(_, name)| name)
        .collect()
    }
}
