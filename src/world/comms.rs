//! Messages, broadcasts and distress calls.

use tracing::debug;

use super::{Notification, World};
use crate::actor::ActorId;
use crate::events::WorldEvent;

impl World {
    /// Send `text` from `from` to `to`. Only messages to the player are
    /// recorded, and only when the sender is on the player's sensors.
    pub fn comm(&mut self, from: ActorId, to: ActorId, text: &str) {
        if to != ActorId::PLAYER || !self.player_hears(from) {
            return;
        }
        self.events.push(WorldEvent::Message { from, to, text: text.to_string() });
    }

    /// Broadcast `text` to anyone listening. Recorded when the player is in
    /// range.
    pub fn broadcast(&mut self, from: ActorId, text: &str) {
        if !self.player_hears(from) {
            return;
        }
        self.events.push(WorldEvent::Broadcast { from, text: text.to_string() });
    }

    fn player_hears(&self, from: ActorId) -> bool {
        match (self.actors.get(from), self.player()) {
            (Some(sender), Some(player)) => sender.id == player.id || self.in_range(player, sender),
            _ => false,
        }
    }

    /// Call for help. Every other actor in range hears it; the first call
    /// against the player with a witness in range costs player standing.
    pub fn distress(&mut self, from: ActorId, text: &str) {
        if !text.is_empty() {
            self.broadcast(from, text);
        }
        let Some(sender) = self.actors.get(from) else {
            return;
        };
        let attacker = sender.target;
        let faction = sender.faction;
        let pos = sender.solid.pos;
        let mass = sender.hull.mass;
        let already = sender.flags.distressed;

        let mut witnessed = self
            .system
            .planets
            .iter()
            .any(|p| p.landable && self.system.in_sensor_range(pos, p.pos) && !self.factions.are_enemies(faction, p.faction));

        let mut listeners = Vec::new();
        for actor in self.actors.iter().filter(|a| a.id != from) {
            if !self.system.in_sensor_range(pos, actor.solid.pos) {
                continue;
            }
            if actor.behavior.is_some() {
                listeners.push(actor.id);
            }
            if !self.factions.are_enemies(faction, actor.faction) {
                witnessed = true;
            }
        }

        self.events.push(WorldEvent::Distress { from, attacker });
        for receiver in listeners {
            self.notify(Notification::Distress { receiver, sender: from, attacker });
        }

        if !already {
            if attacker == ActorId::PLAYER && witnessed {
                let penalty = mass.powf(0.2) - 1.0;
                self.factions.mod_player(faction, -penalty);
                debug!(actor = %from, penalty, "distress_standing_penalty");
            }
            if let Some(sender) = self.actors.get_mut(from) {
                sender.flags.distressed = true;
            }
        }
    }
}
