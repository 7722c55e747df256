//! Faction standings.
//!
//! Faction 0 is always the player's faction. Each other faction carries a
//! standing towards the player in `[-100, 100]`; relations between NPC
//! factions are explicit ally and enemy lists.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Index into the faction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactionId(pub u32);

/// The player's faction.
pub const PLAYER_FACTION: FactionId = FactionId(0);

/// Standing at or above which a faction counts as allied to the player.
pub const ALLY_STANDING: f64 = 70.0;

/// Standing below which a faction counts as hostile to the player.
pub const ENEMY_STANDING: f64 = 0.0;

impl fmt::Display for FactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "faction#{}", self.0)
    }
}

/// One faction.
#[derive(Debug, Clone, PartialEq)]
pub struct Faction {
    /// Display name.
    pub name: String,
    /// Standing towards the player.
    pub player_standing: f64,
    allies: Vec<FactionId>,
    enemies: Vec<FactionId>,
}

/// All factions of a simulation.
#[derive(Debug, Clone)]
pub struct FactionTable {
    factions: Vec<Faction>,
}

impl Default for FactionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FactionTable {
    /// Table holding only the player faction.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factions: vec![Faction {
                name: "Player".to_string(),
                player_standing: 100.0,
                allies: Vec::new(),
                enemies: Vec::new(),
            }],
        }
    }

    /// Add a faction with an initial player standing.
    pub fn add(&mut self, name: impl Into<String>, player_standing: f64) -> FactionId {
        let id = FactionId(u32::try_from(self.factions.len()).unwrap_or(u32::MAX));
        self.factions.push(Faction {
            name: name.into(),
            player_standing: player_standing.clamp(-100.0, 100.0),
            allies: Vec::new(),
            enemies: Vec::new(),
        });
        id
    }

    /// Find a faction by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<FactionId> {
        self.factions
            .iter()
            .position(|f| f.name == name)
            .and_then(|i| u32::try_from(i).ok())
            .map(FactionId)
    }

    /// Look up a faction.
    #[must_use]
    pub fn get(&self, id: FactionId) -> Option<&Faction> {
        self.factions.get(id.0 as usize)
    }

    /// Name of a faction, or `"Unknown"`.
    #[must_use]
    pub fn name(&self, id: FactionId) -> &str {
        self.get(id).map_or("Unknown", |f| f.name.as_str())
    }

    /// Number of factions, including the player's.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factions.len()
    }

    /// Always false: the player faction is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factions.is_empty()
    }

    /// Mark two factions as mutual allies.
    pub fn set_allies(&mut self, a: FactionId, b: FactionId) {
        if a == b {
            return;
        }
        for (x, y) in [(a, b), (b, a)] {
            if let Some(f) = self.factions.get_mut(x.0 as usize) {
                f.enemies.retain(|&e| e != y);
                if !f.allies.contains(&y) {
                    f.allies.push(y);
                }
            }
        }
    }

    /// Mark two factions as mutual enemies.
    pub fn set_enemies(&mut self, a: FactionId, b: FactionId) {
        if a == b {
            return;
        }
        for (x, y) in [(a, b), (b, a)] {
            if let Some(f) = self.factions.get_mut(x.0 as usize) {
                f.allies.retain(|&e| e != y);
                if !f.enemies.contains(&y) {
                    f.enemies.push(y);
                }
            }
        }
    }

    /// Standing of a faction towards the player. The player faction reports 100.
    #[must_use]
    pub fn player_standing(&self, id: FactionId) -> f64 {
        self.get(id).map_or(0.0, |f| f.player_standing)
    }

    /// Adjust the player's standing with a faction.
    ///
    /// Allies of the faction shift by the same amount, its enemies by the
    /// opposite amount. The player faction itself never changes.
    pub fn mod_player(&mut self, id: FactionId, amount: f64) {
        if id == PLAYER_FACTION {
            return;
        }
        let Some(faction) = self.get(id) else {
            return;
        };
        let allies = faction.allies.clone();
        let enemies = faction.enemies.clone();
        self.mod_player_raw(id, amount);
        for ally in allies {
            self.mod_player_raw(ally, amount);
        }
        for enemy in enemies {
            self.mod_player_raw(enemy, -amount);
        }
    }

    fn mod_player_raw(&mut self, id: FactionId, amount: f64) {
        if id == PLAYER_FACTION {
            return;
        }
        if let Some(f) = self.factions.get_mut(id.0 as usize) {
            f.player_standing = (f.player_standing + amount).clamp(-100.0, 100.0);
            debug!(faction = %f.name, standing = f.player_standing, "player_standing_changed");
        }
    }

    /// Whether two factions are hostile to each other.
    #[must_use]
    pub fn are_enemies(&self, a: FactionId, b: FactionId) -> bool {
        if a == b {
            return false;
        }
        if a == PLAYER_FACTION {
            return self.player_standing(b) < ENEMY_STANDING;
        }
        if b == PLAYER_FACTION {
            return self.player_standing(a) < ENEMY_STANDING;
        }
        self.get(a).is_some_and(|f| f.enemies.contains(&b))
    }

    /// Whether two factions are allied. A faction is its own ally.
    #[must_use]
    pub fn are_allies(&self, a: FactionId, b: FactionId) -> bool {
        if a == b {
            return true;
        }
        if a == PLAYER_FACTION {
            return self.player_standing(b) >= ALLY_STANDING;
        }
        if b == PLAYER_FACTION {
            return self.player_standing(a) >= ALLY_STANDING;
        }
        self.get(a).is_some_and(|f| f.allies.contains(&b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_relations_follow_standing() {
        let mut table = FactionTable::new();
        let pirates = table.add("Pirate", -20.0);
        let empire = table.add("Empire", 80.0);
        let traders = table.add("Trader", 10.0);

        assert!(table.are_enemies(PLAYER_FACTION, pirates));
        assert!(table.are_enemies(pirates, PLAYER_FACTION));
        assert!(table.are_allies(PLAYER_FACTION, empire));
        assert!(!table.are_enemies(PLAYER_FACTION, traders));
        assert!(!table.are_allies(PLAYER_FACTION, traders));
    }

    #[test]
    fn test_mod_player_clamps_and_propagates() {
        let mut table = FactionTable::new();
        let empire = table.add("Empire", 95.0);
        let navy = table.add("Navy", 50.0);
        let rebels = table.add("Rebels", 0.0);
        table.set_allies(empire, navy);
        table.set_enemies(empire, rebels);

        table.mod_player(empire, 20.0);
        assert!((table.player_standing(empire) - 100.0).abs() < 1e-12);
        assert!((table.player_standing(navy) - 70.0).abs() < 1e-12);
        assert!((table.player_standing(rebels) + 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_npc_relations_are_symmetric() {
        let mut table = FactionTable::new();
        let a = table.add("A", 0.0);
        let b = table.add("B", 0.0);
        table.set_enemies(a, b);
        assert!(table.are_enemies(b, a));
        table.set_allies(a, b);
        assert!(!table.are_enemies(a, b));
        assert!(table.are_allies(b, a));
    }
}
