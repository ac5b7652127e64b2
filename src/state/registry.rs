use crate::entity::Entity;
use crate::state::store::{EntityStore, RegistryError};
use crate::telemetry::{Snapshot, Timestamp};
use std::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Result of applying a snapshot to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// First sighting; a new entity was appended
    Inserted,
    /// An existing entity was updated in place
    Updated,
}

/// Registry is the shared in-memory store of all tracked entities.
///
/// All mutations go through one write lock, so there is exactly one writer
/// at a time. Readers receive clones taken under the read lock. Constructed
/// once at startup and shared via `Arc`.
#[derive(Debug, Default)]
pub struct Registry {
    store: RwLock<EntityStore>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new entity; fails if the identifier is already present
    pub fn insert(&self, entity: Entity) -> Result<(), RegistryError> {
        self.store.write().unwrap().insert(entity)
    }

    /// Remove an entity; fails if the identifier is unknown
    pub fn delete(&self, id: Uuid) -> Result<Entity, RegistryError> {
        self.store.write().unwrap().delete(id)
    }

    /// Get entity by ID
    pub fn find(&self, id: Uuid) -> Option<Entity> {
        self.store.read().unwrap().find(id).cloned()
    }

    /// All entities in display (insertion) order
    pub fn enumerate(&self) -> Vec<Entity> {
        self.store.read().unwrap().iter().cloned().collect()
    }

    /// Entities that have not moved for more than `threshold_seconds`
    pub fn stationary(&self, now: Timestamp, threshold_seconds: f64) -> Vec<Entity> {
        self.store
            .read()
            .unwrap()
            .iter()
            .filter(|entity| entity.is_stationary(now, threshold_seconds))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.store.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.read().unwrap().is_empty()
    }

    /// Apply a decoded snapshot (core state mutation).
    ///
    /// Updates the matching entity in place, or inserts a new one on first
    /// sighting. Lookup and mutation happen under the same write lock. The
    /// last applied snapshot always wins, whatever its send timestamp.
    pub fn apply(&self, snapshot: &Snapshot) -> Result<Applied, RegistryError> {
        let mut store = self.store.write().unwrap();

        if let Some(entity) = store.find_mut(snapshot.id()) {
            entity.apply(snapshot);
            return Ok(Applied::Updated);
        }

        store.insert(Entity::from_snapshot(snapshot))?;
        debug!(entity_id = %snapshot.id(), entities = store.len(), "New entity registered");

        Ok(Applied::Inserted)
    }
}
