use super::*;
use crate::entity::Entity;
use crate::telemetry::{Location, Snapshot, Speed, Timestamp};
use std::sync::Arc;
use std::thread;
use uuid::Uuid;

fn snapshot(id: Uuid, seconds: f64, latitude: f64) -> Snapshot {
    Snapshot::new(
        id,
        Timestamp::from_secs_f64(seconds),
        Some(Location::new(latitude, -115.8, 25.0)),
        Some(Speed::from_meters_per_second(3.0)),
    )
}

fn assert_index_consistent(store: &EntityStore) {
    for (position, entity) in store.iter().enumerate() {
        assert_eq!(store.position(entity.id()), Some(position));
        assert_eq!(store.find(entity.id()).map(|e| e.id()), Some(entity.id()));
    }
}

#[test]
fn test_insert_and_find() {
    let mut store = EntityStore::new();
    let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();

    for id in &ids {
        store.insert(Entity::new(*id)).unwrap();
    }

    assert_eq!(store.len(), 5);
    for id in &ids {
        assert_eq!(store.find(*id).unwrap().id(), *id);
    }

    let order: Vec<Uuid> = store.iter().map(|e| e.id()).collect();
    assert_eq!(order, ids);
    assert_index_consistent(&store);
}

#[test]
fn test_duplicate_insert_rejected() {
    let mut store = EntityStore::new();
    let id = Uuid::new_v4();

    let mut first = Entity::new(id);
    first.update(
        Some(Location::new(1.0, 2.0, 3.0)),
        None,
        Timestamp::from_secs_f64(1.0),
    );
    store.insert(first.clone()).unwrap();

    let result = store.insert(Entity::new(id));
    assert_eq!(result, Err(RegistryError::DuplicateIdentifier(id)));

    // First entity untouched
    assert_eq!(store.find(id), Some(&first));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_delete_unknown_fails() {
    let mut store = EntityStore::new();
    let id = Uuid::new_v4();
    assert_eq!(store.delete(id), Err(RegistryError::UnknownObject(id)));
}

#[test]
fn test_delete_repairs_shifted_positions() {
    let mut store = EntityStore::new();
    let ids: Vec<Uuid> = (0..6).map(|_| Uuid::new_v4()).collect();
    for id in &ids {
        store.insert(Entity::new(*id)).unwrap();
    }

    // Remove from the middle, the front and the back
    store.delete(ids[2]).unwrap();
    assert_index_consistent(&store);
    store.delete(ids[0]).unwrap();
    assert_index_consistent(&store);
    store.delete(ids[5]).unwrap();
    assert_index_consistent(&store);

    let order: Vec<Uuid> = store.iter().map(|e| e.id()).collect();
    assert_eq!(order, vec![ids[1], ids[3], ids[4]]);
    assert!(store.find(ids[2]).is_none());

    // Re-inserting a deleted identifier appends it at the end
    store.insert(Entity::new(ids[2])).unwrap();
    assert_eq!(store.position(ids[2]), Some(3));
    assert_index_consistent(&store);
}

#[test]
fn test_registry_apply_inserts_then_updates() {
    let registry = Registry::new();
    let id = Uuid::new_v4();

    assert_eq!(registry.apply(&snapshot(id, 10.0, 37.0)), Ok(Applied::Inserted));
    assert_eq!(registry.apply(&snapshot(id, 11.0, 37.5)), Ok(Applied::Updated));

    assert_eq!(registry.len(), 1);
    let entity = registry.find(id).unwrap();
    assert_eq!(entity.location().unwrap().latitude, 37.5);
    assert_eq!(entity.last_movement(), Some(Timestamp::from_secs_f64(11.0)));
}

#[test]
fn test_registry_last_applied_wins() {
    let registry = Registry::new();
    let id = Uuid::new_v4();

    registry.apply(&snapshot(id, 20.0, 37.0)).unwrap();
    // Older send timestamp, applied later
    registry.apply(&snapshot(id, 5.0, 36.0)).unwrap();

    let entity = registry.find(id).unwrap();
    assert_eq!(entity.location().unwrap().latitude, 36.0);
    assert_eq!(entity.last_report(), Some(Timestamp::from_secs_f64(5.0)));
}

#[test]
fn test_registry_enumerate_in_insertion_order() {
    let registry = Registry::new();
    let ids: Vec<Uuid> = (0..20).map(|_| Uuid::new_v4()).collect();

    for (i, id) in ids.iter().enumerate() {
        registry.apply(&snapshot(*id, i as f64, 30.0 + i as f64)).unwrap();
    }
    // Updates do not reorder
    registry.apply(&snapshot(ids[0], 100.0, 0.0)).unwrap();

    let listed: Vec<Uuid> = registry.enumerate().iter().map(|e| e.id()).collect();
    assert_eq!(listed, ids);
    for id in &ids {
        assert_eq!(registry.find(*id).unwrap().id(), *id);
    }
}

#[test]
fn test_registry_insert_and_delete() {
    let registry = Registry::new();
    let id = Uuid::new_v4();

    registry.insert(Entity::new(id)).unwrap();
    assert_eq!(
        registry.insert(Entity::new(id)),
        Err(RegistryError::DuplicateIdentifier(id))
    );

    let removed = registry.delete(id).unwrap();
    assert_eq!(removed.id(), id);
    assert!(registry.is_empty());
    assert_eq!(registry.delete(id), Err(RegistryError::UnknownObject(id)));
}

#[test]
fn test_registry_stationary_filter() {
    let registry = Registry::new();
    let still = Uuid::new_v4();
    let moving = Uuid::new_v4();

    registry.apply(&snapshot(still, 100.0, 37.0)).unwrap();
    registry.apply(&snapshot(moving, 100.0, 38.0)).unwrap();
    registry.apply(&snapshot(still, 115.0, 37.0)).unwrap();
    registry.apply(&snapshot(moving, 115.0, 38.1)).unwrap();

    let stale = registry.stationary(Timestamp::from_secs_f64(116.0), 10.0);
    assert_eq!(stale.len(), 1);
    assert_eq!(stale[0].id(), still);
}

#[test]
fn test_concurrent_apply() {
    let registry = Arc::new(Registry::new());
    let mut handles = vec![];

    // 10 writers, each owning one identifier and reporting 50 times
    for i in 0..10 {
        let registry_clone = Arc::clone(&registry);
        let handle = thread::spawn(move || {
            let id = Uuid::new_v4();
            for tick in 0..50 {
                registry_clone
                    .apply(&snapshot(id, tick as f64, i as f64 + tick as f64 * 0.001))
                    .unwrap();
            }
            id
        });
        handles.push(handle);
    }

    let ids: Vec<Uuid> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(registry.len(), 10);
    for id in ids {
        let entity = registry.find(id).unwrap();
        assert_eq!(entity.last_report(), Some(Timestamp::from_secs_f64(49.0)));
    }
}

#[test]
fn test_concurrent_first_sighting_same_identifier() {
    let registry = Arc::new(Registry::new());
    let id = Uuid::new_v4();
    let mut handles = vec![];

    for i in 0..8 {
        let registry_clone = Arc::clone(&registry);
        handles.push(thread::spawn(move || {
            registry_clone.apply(&snapshot(id, i as f64, 37.0)).unwrap()
        }));
    }

    let outcomes: Vec<Applied> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let inserted = outcomes.iter().filter(|o| **o == Applied::Inserted).count();

    assert_eq!(inserted, 1);
    assert_eq!(registry.len(), 1);
}
