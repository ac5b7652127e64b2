use crate::entity::Entity;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Entity store contract violations
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// An entity with this identifier is already stored
    DuplicateIdentifier(Uuid),
    /// No entity with this identifier is stored
    UnknownObject(Uuid),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateIdentifier(id) => {
                write!(f, "entity {} is already registered", id)
            }
            RegistryError::UnknownObject(id) => write!(f, "entity {} is not registered", id),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Ordered entity storage with an identifier index.
///
/// Insertion order is display order and is never re-sorted. Every stored
/// identifier maps to exactly one valid position in `entities`.
///
/// Not synchronized; see `Registry` for the shared, locked wrapper.
#[derive(Debug, Default)]
pub struct EntityStore {
    entities: Vec<Entity>,
    index: HashMap<Uuid, usize>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new entity. Never overwrites an existing one.
    pub fn insert(&mut self, entity: Entity) -> Result<(), RegistryError> {
        let id = entity.id();
        if self.index.contains_key(&id) {
            return Err(RegistryError::DuplicateIdentifier(id));
        }

        self.entities.push(entity);
        self.index.insert(id, self.entities.len() - 1);

        Ok(())
    }

    /// Remove an entity, returning it.
    ///
    /// Entities positioned after the removed one shift down by one, and their
    /// index entries are re-pointed accordingly.
    pub fn delete(&mut self, id: Uuid) -> Result<Entity, RegistryError> {
        let position = self
            .index
            .remove(&id)
            .ok_or(RegistryError::UnknownObject(id))?;

        let removed = self.entities.remove(position);

        for shifted in &self.entities[position..] {
            if let Some(slot) = self.index.get_mut(&shifted.id()) {
                *slot -= 1;
            }
        }

        Ok(removed)
    }

    pub fn find(&self, id: Uuid) -> Option<&Entity> {
        self.index.get(&id).map(|&position| &self.entities[position])
    }

    pub fn find_mut(&mut self, id: Uuid) -> Option<&mut Entity> {
        let position = *self.index.get(&id)?;
        self.entities.get_mut(position)
    }

    /// Display position of an entity
    pub fn position(&self, id: Uuid) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Entities in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
