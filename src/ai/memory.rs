//! Per-actor memory records, kept apart from the shared compiled profiles.

use std::collections::HashMap;

use rhai::{Dynamic, Map};

use crate::actor::ActorId;

/// Memory records keyed by actor id.
///
/// A record is created from its profile's template when the actor is bound
/// and dropped when the actor is purged. While one of the actor's routines
/// runs the record is checked out with [`take`](Self::take) and bound to the
/// routine as `this`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: HashMap<ActorId, Dynamic>,
}

impl MemoryStore {
    /// Give `id` a fresh copy of `template`, replacing any old record.
    pub fn create(&mut self, id: ActorId, template: &Map) {
        self.records.insert(id, Dynamic::from_map(template.clone()));
    }

    /// Check a record out for an invocation.
    pub fn take(&mut self, id: ActorId) -> Option<Dynamic> {
        self.records.remove(&id)
    }

    /// Return a checked-out record.
    pub fn put(&mut self, id: ActorId, record: Dynamic) {
        self.records.insert(id, record);
    }

    /// Drop the record of a removed actor.
    pub fn forget(&mut self, id: ActorId) {
        self.records.remove(&id);
    }

    /// Read a record.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&Dynamic> {
        self.records.get(&id)
    }

    /// Actors holding a record.
    pub fn ids(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.records.keys().copied()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_are_independent_copies() {
        let mut template = Map::new();
        template.insert("aggressive".into(), Dynamic::TRUE);
        let mut store = MemoryStore::default();
        store.create(ActorId(2), &template);
        store.create(ActorId(3), &template);

        let mut record = store.take(ActorId(2)).unwrap();
        if let Some(mut map) = record.write_lock::<Map>() {
            map.insert("aggressive".into(), Dynamic::FALSE);
        }
        store.put(ActorId(2), record);

        let read = |store: &MemoryStore, id| store.get(id).unwrap().clone_cast::<Map>()["aggressive"].as_bool().unwrap();
        assert!(!read(&store, ActorId(2)));
        assert!(read(&store, ActorId(3)));
        assert_eq!(template["aggressive"].as_bool(), Ok(true));
    }

    #[test]
    fn test_forget_drops_record() {
        let mut store = MemoryStore::default();
        store.create(ActorId(2), &Map::new());
        store.forget(ActorId(2));
        assert!(store.is_empty());
        assert!(store.take(ActorId(2)).is_none());
    }
}
