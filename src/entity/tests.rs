use super::*;

fn at(seconds: f64) -> Timestamp {
    Timestamp::from_secs_f64(seconds)
}

fn location(latitude: f64) -> Location {
    Location::new(latitude, -115.8, 25.0)
}

#[test]
fn test_new_entity_knows_nothing() {
    let id = Uuid::new_v4();
    let entity = Entity::new(id);

    assert_eq!(entity.id(), id);
    assert!(entity.location().is_none());
    assert!(entity.speed().is_none());
    assert!(entity.last_movement().is_none());
    assert!(entity.last_report().is_none());
}

#[test]
fn test_first_known_location_sets_movement() {
    let mut entity = Entity::new(Uuid::new_v4());
    entity.update(Some(location(37.0)), Some(Speed::zero()), at(100.0));

    assert_eq!(entity.location(), Some(location(37.0)));
    assert_eq!(entity.last_movement(), Some(at(100.0)));
    assert_eq!(entity.last_report(), Some(at(100.0)));
}

#[test]
fn test_same_location_keeps_movement_timestamp() {
    let mut entity = Entity::new(Uuid::new_v4());
    entity.update(Some(location(37.0)), None, at(100.0));
    entity.update(
        Some(location(37.0)),
        Some(Speed::from_meters_per_second(1.0)),
        at(105.0),
    );

    assert_eq!(entity.last_movement(), Some(at(100.0)));
    assert_eq!(entity.last_report(), Some(at(105.0)));
    assert_eq!(entity.speed(), Some(Speed::from_meters_per_second(1.0)));
}

#[test]
fn test_changed_location_advances_movement() {
    let mut entity = Entity::new(Uuid::new_v4());
    entity.update(Some(location(37.0)), None, at(100.0));
    entity.update(Some(location(37.001)), None, at(101.0));

    assert_eq!(entity.location(), Some(location(37.001)));
    assert_eq!(entity.last_movement(), Some(at(101.0)));
}

#[test]
fn test_unknown_location_is_not_movement() {
    let mut entity = Entity::new(Uuid::new_v4());
    entity.update(Some(location(37.0)), None, at(100.0));
    entity.update(None, Some(Speed::zero()), at(102.0));

    assert!(entity.location().is_none());
    assert_eq!(entity.last_movement(), Some(at(100.0)));

    // Location reappearing after being unknown counts as movement
    entity.update(Some(location(37.0)), None, at(103.0));
    assert_eq!(entity.last_movement(), Some(at(103.0)));
}

#[test]
fn test_from_snapshot_applies_first_report() {
    let snapshot = Snapshot::new(
        Uuid::new_v4(),
        at(50.0),
        Some(location(10.0)),
        Some(Speed::from_meters_per_second(7.5)),
    );
    let entity = Entity::from_snapshot(&snapshot);

    assert_eq!(entity.id(), snapshot.id());
    assert_eq!(entity.location(), snapshot.location());
    assert_eq!(entity.speed(), snapshot.speed());
    assert_eq!(entity.last_movement(), Some(at(50.0)));
}

#[test]
fn test_stationary_threshold() {
    let mut entity = Entity::new(Uuid::new_v4());
    assert!(!entity.is_stationary(at(1_000.0), 10.0));

    entity.update(Some(location(37.0)), None, at(100.0));
    assert!(!entity.is_stationary(at(105.0), 10.0));
    assert!(!entity.is_stationary(at(110.0), 10.0));
    assert!(entity.is_stationary(at(110.5), 10.0));
}
