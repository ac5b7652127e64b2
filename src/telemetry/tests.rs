use super::*;
use uuid::Uuid;

fn sample_location() -> Location {
    Location::new(37.234332396, -115.80666344, 25.0)
}

fn snapshot_with(location: Option<Location>, speed: Option<Speed>) -> Snapshot {
    Snapshot::new(
        Uuid::new_v4(),
        Timestamp::from_secs_f64(1_707_668_400.125),
        location,
        speed,
    )
}

#[test]
fn test_encoded_length_is_fixed() {
    let full = encode(&snapshot_with(
        Some(sample_location()),
        Some(Speed::from_meters_per_second(12.5)),
    ));
    let empty = encode(&snapshot_with(None, None));

    assert_eq!(full.len(), ENCODED_LEN);
    assert_eq!(empty.len(), ENCODED_LEN);
}

#[test]
fn test_round_trip_with_optional_fields_independent() {
    let cases = [
        (Some(sample_location()), Some(Speed::from_meters_per_second(3.25))),
        (Some(sample_location()), None),
        (None, Some(Speed::zero())),
        (None, None),
    ];

    for (location, speed) in cases {
        let original = snapshot_with(location, speed);
        let decoded = decode(&encode(&original)).unwrap();

        assert_eq!(decoded, original);
        assert_eq!(decoded.location(), location);
        assert_eq!(decoded.speed(), speed);
        assert_eq!(decoded.version(), FORMAT_VERSION);
    }
}

#[test]
fn test_wire_layout_is_big_endian() {
    let id = Uuid::new_v4();
    let snapshot = Snapshot::new(
        id,
        Timestamp::from_secs_f64(2.0),
        Some(Location::new(1.0, 2.0, 3.0)),
        None,
    );
    let bytes = encode(&snapshot);

    assert_eq!(&bytes[0..8], &1.0f64.to_be_bytes());
    assert_eq!(&bytes[8..16], &2.0f64.to_be_bytes());
    assert_eq!(&bytes[16..32], id.as_bytes());
    assert_eq!(&bytes[32..40], &1.0f64.to_be_bytes());
    assert_eq!(&bytes[40..48], &2.0f64.to_be_bytes());
    assert_eq!(&bytes[48..56], &3.0f64.to_be_bytes());
    assert_eq!(&bytes[56..64], &UNKNOWN.to_be_bytes());
}

#[test]
fn test_unsupported_version_rejected() {
    let mut bytes = encode(&snapshot_with(Some(sample_location()), None));

    for version in [0.0f64, 2.0, -1.0, 1.5, f64::NAN] {
        bytes[0..8].copy_from_slice(&version.to_be_bytes());
        match decode(&bytes) {
            Err(DecodeError::UnsupportedVersion(_)) => {}
            other => panic!("expected UnsupportedVersion for {}, got {:?}", version, other),
        }
    }
}

#[test]
fn test_every_truncation_fails_with_length_error() {
    let bytes = encode(&snapshot_with(
        Some(sample_location()),
        Some(Speed::from_meters_per_second(1.0)),
    ));

    for len in 0..ENCODED_LEN {
        assert_eq!(
            decode(&bytes[..len]),
            Err(DecodeError::PrematureEndOfData {
                needed: ENCODED_LEN,
                available: len,
            })
        );
    }
}

#[test]
fn test_single_unknown_component_hides_location() {
    let mut bytes = encode(&snapshot_with(
        Some(sample_location()),
        Some(Speed::from_meters_per_second(4.0)),
    ));
    bytes[48..56].copy_from_slice(&UNKNOWN.to_be_bytes());

    let decoded = decode(&bytes).unwrap();
    assert_eq!(decoded.location(), None);
    assert_eq!(decoded.speed(), Some(Speed::from_meters_per_second(4.0)));
}

#[test]
fn test_trailing_bytes_ignored() {
    let original = snapshot_with(None, Some(Speed::from_meters_per_second(9.0)));
    let mut bytes = encode(&original).to_vec();
    bytes.extend_from_slice(&[0xAB; 8]);

    assert_eq!(decode(&bytes).unwrap(), original);
}

#[test]
fn test_snapshot_of_entity_copies_state() {
    let mut entity = crate::entity::Entity::new(Uuid::new_v4());
    entity.update(
        Some(sample_location()),
        Some(Speed::from_meters_per_second(2.0)),
        Timestamp::from_secs_f64(10.0),
    );

    let snapshot = Snapshot::of(&entity, Timestamp::from_secs_f64(11.0));
    assert_eq!(snapshot.id(), entity.id());
    assert_eq!(snapshot.location(), Some(sample_location()));
    assert_eq!(snapshot.speed(), Some(Speed::from_meters_per_second(2.0)));
    assert_eq!(snapshot.timestamp(), Timestamp::from_secs_f64(11.0));
}

#[test]
fn test_timestamp_datetime_conversion() {
    let ts = Timestamp::from_secs_f64(1_707_668_400.5);
    let dt = ts.to_datetime().unwrap();
    assert_eq!(dt.timestamp(), 1_707_668_400);
    assert_eq!(dt.timestamp_subsec_millis(), 500);
    assert_eq!(Timestamp::from_datetime(dt), ts);

    assert!(Timestamp::from_secs_f64(f64::NAN).to_datetime().is_none());
    assert!(Timestamp::from_secs_f64(UNKNOWN).to_datetime().is_none());
}
