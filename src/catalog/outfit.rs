//! Outfit definitions: weapons, ammunition, fighter bays and ship modifications.

use serde::{Deserialize, Serialize};

/// Slot capacity class. Outfits fit any slot of their class or larger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotClass {
    /// Low-capacity slot.
    Low,
    /// Medium-capacity slot.
    Medium,
    /// High-capacity (weapon) slot.
    High,
}

impl SlotClass {
    /// Lower-case name used in messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Kind of damage a weapon inflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    /// Good against shields.
    Energy,
    /// Good against armour, heavy knockback.
    Kinetic,
    /// Weak against armour.
    Ion,
    /// Bypasses shields.
    Radiation,
    /// Harmless to disabled targets.
    Emp,
}

/// Forward-firing or turreted projectile weapon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoltStats {
    /// Seconds between shots.
    pub delay: f64,
    /// Projectile speed.
    pub speed: f64,
    /// Maximum travel distance.
    pub range: f64,
    /// Energy per shot.
    #[serde(default)]
    pub energy: f64,
    /// Damage per hit.
    pub damage: f64,
    /// Damage kind.
    pub damage_type: DamageType,
    /// Whether the mount tracks its target.
    #[serde(default)]
    pub turret: bool,
}

/// Continuous beam weapon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamStats {
    /// Cooldown between activations.
    pub delay: f64,
    /// Beam length.
    pub range: f64,
    /// Seconds the beam stays on per activation.
    pub duration: f64,
    /// Energy drained per second while on.
    pub energy: f64,
    /// Damage per second.
    pub damage: f64,
    /// Damage kind.
    pub damage_type: DamageType,
    /// Whether the mount tracks its target.
    #[serde(default)]
    pub turret: bool,
}

/// Ammunition-fed launcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LauncherStats {
    /// Seconds between launches.
    pub delay: f64,
    /// Name of the ammunition outfit.
    pub ammo: String,
    /// Ammunition capacity.
    pub capacity: u32,
}

/// Projectile fired by a launcher.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmmoStats {
    /// Cruise speed.
    pub speed: f64,
    /// Seconds of flight before the projectile expires.
    pub duration: f64,
    /// Energy per launch.
    #[serde(default)]
    pub energy: f64,
    /// Damage per hit.
    pub damage: f64,
    /// Damage kind.
    pub damage_type: DamageType,
    /// Smart ammunition homes on the shooter's target.
    #[serde(default)]
    pub smart: bool,
    /// Homing turn rate in degrees per second.
    #[serde(default)]
    pub turn: f64,
}

/// Bay that launches fighter escorts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterBayStats {
    /// Seconds between launches.
    pub delay: f64,
    /// Name of the fighter outfit.
    pub ammo: String,
    /// Number of fighters the bay holds.
    pub capacity: u32,
}

/// Ship modification. Every field is a delta; `_rel` fields are fractions of the hull base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModStats {
    /// Thrust per unit of hull mass.
    pub thrust: f64,
    /// Fraction of hull thrust.
    pub thrust_rel: f64,
    /// Turn rate in degrees per second.
    pub turn: f64,
    /// Fraction of hull turn rate.
    pub turn_rel: f64,
    /// Top speed.
    pub speed: f64,
    /// Fraction of hull top speed.
    pub speed_rel: f64,
    /// Maximum armour.
    pub armour: f64,
    /// Armour regeneration per second.
    pub armour_regen: f64,
    /// Maximum shield.
    pub shield: f64,
    /// Shield regeneration per second.
    pub shield_regen: f64,
    /// Maximum energy.
    pub energy: f64,
    /// Energy regeneration per second.
    pub energy_regen: f64,
    /// Maximum fuel.
    pub fuel: f64,
    /// Cargo capacity in tonnes.
    pub cargo: i64,
    /// Fraction of hull mass added.
    pub mass_rel: f64,
}

/// Afterburner that raises the speed cap at an energy cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AfterburnerStats {
    /// Thrust multiplier while engaged.
    pub thrust: f64,
    /// Speed cap multiplier while engaged.
    pub speed: f64,
    /// Energy drained per second.
    pub energy: f64,
}

/// Missile jammer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JammerStats {
    /// Effective range.
    pub range: f64,
    /// Chance per second to break a lock.
    pub chance: f64,
    /// Energy regeneration consumed while active.
    pub energy: f64,
}

/// What an outfit does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutfitKind {
    /// Projectile weapon.
    Bolt(BoltStats),
    /// Beam weapon.
    Beam(BeamStats),
    /// Ammunition launcher.
    Launcher(LauncherStats),
    /// Launcher ammunition.
    Ammo(AmmoStats),
    /// Fighter bay.
    FighterBay(FighterBayStats),
    /// Fighter carried by a bay; `hull` is the fighter's hull.
    Fighter {
        /// Hull the fighter flies.
        hull: String,
    },
    /// Stat modification.
    Modification(ModStats),
    /// Afterburner.
    Afterburner(AfterburnerStats),
    /// Jammer.
    Jammer(JammerStats),
}

/// A catalog outfit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outfit {
    /// Unique name.
    pub name: String,
    /// Sale price.
    #[serde(default)]
    pub price: u64,
    /// Mass in tonnes.
    #[serde(default)]
    pub mass: f64,
    /// CPU used. Negative values provide CPU.
    #[serde(default)]
    pub cpu: f64,
    /// Slot class the outfit needs.
    #[serde(default = "default_slot")]
    pub slot: SlotClass,
    /// Marks bolts and beams as secondary weapons.
    #[serde(default)]
    pub secondary: bool,
    /// Behavior.
    #[serde(flatten)]
    pub kind: OutfitKind,
}

const fn default_slot() -> SlotClass {
    SlotClass::High
}

impl Outfit {
    /// Seconds between shots, or zero for non-weapons.
    #[must_use]
    pub fn delay(&self) -> f64 {
        match &self.kind {
            OutfitKind::Bolt(b) => b.delay,
            OutfitKind::Beam(b) => b.delay,
            OutfitKind::Launcher(l) => l.delay,
            OutfitKind::FighterBay(f) => f.delay,
            _ => 0.0,
        }
    }

    /// Whether this is a bolt weapon.
    #[must_use]
    pub const fn is_bolt(&self) -> bool {
        matches!(self.kind, OutfitKind::Bolt(_))
    }

    /// Whether this is a beam weapon.
    #[must_use]
    pub const fn is_beam(&self) -> bool {
        matches!(self.kind, OutfitKind::Beam(_))
    }

    /// Whether this is an ammunition launcher.
    #[must_use]
    pub const fn is_launcher(&self) -> bool {
        matches!(self.kind, OutfitKind::Launcher(_))
    }

    /// Whether this is a fighter bay.
    #[must_use]
    pub const fn is_fighter_bay(&self) -> bool {
        matches!(self.kind, OutfitKind::FighterBay(_))
    }

    /// Whether this outfit fires (bolt, beam, launcher or bay).
    #[must_use]
    pub const fn is_weapon(&self) -> bool {
        matches!(
            self.kind,
            OutfitKind::Bolt(_) | OutfitKind::Beam(_) | OutfitKind::Launcher(_) | OutfitKind::FighterBay(_)
        )
    }

    /// Whether the outfit takes ammunition.
    #[must_use]
    pub const fn uses_ammo(&self) -> bool {
        matches!(self.kind, OutfitKind::Launcher(_) | OutfitKind::FighterBay(_))
    }

    /// Launchers and bays are always secondary; bolts and beams when flagged.
    #[must_use]
    pub const fn is_secondary(&self) -> bool {
        self.uses_ammo() || (self.secondary && self.is_weapon())
    }

    /// Whether the mount is a turret.
    #[must_use]
    pub const fn is_turret(&self) -> bool {
        match &self.kind {
            OutfitKind::Bolt(b) => b.turret,
            OutfitKind::Beam(b) => b.turret,
            _ => false,
        }
    }

    /// Name of the ammunition for launchers and bays.
    #[must_use]
    pub fn ammo_name(&self) -> Option<&str> {
        match &self.kind {
            OutfitKind::Launcher(l) => Some(&l.ammo),
            OutfitKind::FighterBay(f) => Some(&f.ammo),
            _ => None,
        }
    }

    /// Ammunition capacity for launchers and bays.
    #[must_use]
    pub const fn ammo_capacity(&self) -> u32 {
        match &self.kind {
            OutfitKind::Launcher(l) => l.capacity,
            OutfitKind::FighterBay(f) => f.capacity,
            _ => 0,
        }
    }

    /// Energy cost: per shot for bolts and ammunition, per second for beams.
    #[must_use]
    pub const fn energy(&self) -> f64 {
        match &self.kind {
            OutfitKind::Bolt(b) => b.energy,
            OutfitKind::Beam(b) => b.energy,
            OutfitKind::Ammo(a) => a.energy,
            OutfitKind::Afterburner(a) => a.energy,
            OutfitKind::Jammer(j) => j.energy,
            _ => 0.0,
        }
    }

    /// Effective range for weapons and ammunition.
    #[must_use]
    pub fn range(&self) -> f64 {
        match &self.kind {
            OutfitKind::Bolt(b) => b.range,
            OutfitKind::Beam(b) => b.range,
            OutfitKind::Ammo(a) => a.speed * a.duration,
            _ => 0.0,
        }
    }

    /// Projectile speed; beams are instantaneous and report zero.
    #[must_use]
    pub const fn speed(&self) -> f64 {
        match &self.kind {
            OutfitKind::Bolt(b) => b.speed,
            OutfitKind::Ammo(a) => a.speed,
            _ => 0.0,
        }
    }

    /// Whether this is smart (homing) ammunition.
    #[must_use]
    pub const fn is_smart_ammo(&self) -> bool {
        matches!(&self.kind, OutfitKind::Ammo(a) if a.smart)
    }

    /// Modification deltas, if this is a modification.
    #[must_use]
    pub const fn modification(&self) -> Option<&ModStats> {
        match &self.kind {
            OutfitKind::Modification(m) => Some(m),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outfit_deserializes_with_tag() {
        let json = r#"{
            "name": "Laser Cannon",
            "mass": 2.0,
            "cpu": 5.0,
            "type": "bolt",
            "delay": 0.9,
            "speed": 800.0,
            "range": 600.0,
            "energy": 4.0,
            "damage": 12.0,
            "damage_type": "energy"
        }"#;
        let outfit: Outfit = serde_json::from_str(json).unwrap();
        assert!(outfit.is_bolt());
        assert_eq!(outfit.slot, SlotClass::High);
        assert!(!outfit.is_secondary());
        assert!((outfit.delay() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_launcher_is_secondary() {
        let json = r#"{
            "name": "Seeker Launcher",
            "type": "launcher",
            "delay": 2.0,
            "ammo": "Seeker Missile",
            "capacity": 10
        }"#;
        let outfit: Outfit = serde_json::from_str(json).unwrap();
        assert!(outfit.is_secondary());
        assert_eq!(outfit.ammo_name(), Some("Seeker Missile"));
        assert_eq!(outfit.ammo_capacity(), 10);
    }

    #[test]
    fn test_modification_defaults() {
        let json = r#"{ "name": "Shield Capacitor", "slot": "low", "type": "modification", "shield": 25.0 }"#;
        let outfit: Outfit = serde_json::from_str(json).unwrap();
        let m = outfit.modification().unwrap();
        assert!((m.shield - 25.0).abs() < 1e-12);
        assert!(m.thrust.abs() < 1e-12);
        assert!(!outfit.is_weapon());
    }
}
