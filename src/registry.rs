//! The actor registry: every live actor, sorted ascending by id.
//!
//! Ids are handed out monotonically and never reused. Lookups are binary
//! searches. The backing vector only changes at tick boundaries: insertions
//! land in id order and deletions compact the vector after the tick's pass.

use crate::actor::{Actor, ActorId};
use crate::error::RegistryError;

/// First id available to non-player actors.
const FIRST_ID: u32 = 2;

/// Sorted collection of actors.
#[derive(Debug, Clone)]
pub struct Registry {
    actors: Vec<Actor>,
    next_id: u32,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            actors: Vec::new(),
            next_id: FIRST_ID,
        }
    }
}

impl Registry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next id.
    pub fn allocate_id(&mut self) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Insert an actor whose id came from [`Registry::allocate_id`].
    pub fn insert(&mut self, actor: Actor) -> ActorId {
        let id = actor.id;
        match self.actors.binary_search_by_key(&id, |a| a.id) {
            Ok(index) => self.actors[index] = actor,
            Err(index) => self.actors.insert(index, actor),
        }
        self.next_id = self.next_id.max(id.0 + 1);
        id
    }

    /// Insert the player-controlled actor under the reserved player id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::PlayerExists`] if a player is already present.
    pub fn insert_player(&mut self, mut actor: Actor) -> Result<ActorId, RegistryError> {
        if self.contains(ActorId::PLAYER) {
            return Err(RegistryError::PlayerExists);
        }
        actor.id = ActorId::PLAYER;
        actor.target = ActorId::PLAYER;
        actor.flags.player = true;
        actor.behavior = None;
        let at = self.actors.partition_point(|a| a.id < ActorId::PLAYER);
        self.actors.insert(at, actor);
        Ok(ActorId::PLAYER)
    }

    fn index_of(&self, id: ActorId) -> Option<usize> {
        self.actors.binary_search_by_key(&id, |a| a.id).ok()
    }

    /// Whether an actor with this id is present.
    #[must_use]
    pub fn contains(&self, id: ActorId) -> bool {
        self.index_of(id).is_some()
    }

    /// Look up an actor.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.index_of(id).map(|i| &self.actors[i])
    }

    /// Look up an actor mutably.
    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.index_of(id).map(|i| &mut self.actors[i])
    }

    /// Borrow two distinct actors mutably.
    pub fn get_pair_mut(&mut self, a: ActorId, b: ActorId) -> Option<(&mut Actor, &mut Actor)> {
        let ia = self.index_of(a)?;
        let ib = self.index_of(b)?;
        if ia == ib {
            return None;
        }
        if ia < ib {
            let (left, right) = self.actors.split_at_mut(ib);
            Some((&mut left[ia], &mut right[0]))
        } else {
            let (left, right) = self.actors.split_at_mut(ia);
            Some((&mut right[0], &mut left[ib]))
        }
    }

    /// Ids in ascending order, snapshotted for iteration while mutating.
    #[must_use]
    pub fn ids(&self) -> Vec<ActorId> {
        self.actors.iter().map(|a| a.id).collect()
    }

    /// Iterate in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter()
    }

    /// Iterate mutably in ascending id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Actor> {
        self.actors.iter_mut()
    }

    /// Number of actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// No actors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Remove every actor flagged for deletion and return their ids.
    pub fn purge_deleted(&mut self) -> Vec<ActorId> {
        let removed: Vec<ActorId> = self.actors.iter().filter(|a| a.flags.delete).map(|a| a.id).collect();
        if !removed.is_empty() {
            self.actors.retain(|a| !a.flags.delete);
        }
        removed
    }

    /// Strictly ascending ids.
    #[must_use]
    pub fn is_sorted(&self) -> bool {
        self.actors.windows(2).all(|w| w[0].id < w[1].id)
    }
}
