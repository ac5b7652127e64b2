use super::{Location, Snapshot, Speed, Timestamp};
use std::fmt;
use uuid::Uuid;

/// The only layout version this build reads or writes
pub const FORMAT_VERSION: u8 = 1;

/// Size of one encoded snapshot on the wire
pub const ENCODED_LEN: usize = 64;

/// Stand-in for "unknown" in location and speed fields.
///
/// None of the encoded quantities is ever this negative, so it cannot collide
/// with a real measurement.
pub const UNKNOWN: f64 = -f64::MAX;

const FIELD_LEN: usize = 8;
const ID_LEN: usize = 16;

const VERSION_OFFSET: usize = 0;
const TIMESTAMP_OFFSET: usize = 8;
const ID_OFFSET: usize = 16;
const LATITUDE_OFFSET: usize = 32;
const LONGITUDE_OFFSET: usize = 40;
const ALTITUDE_OFFSET: usize = 48;
const SPEED_OFFSET: usize = 56;

/// Snapshot decoding errors
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Buffer is shorter than the fixed layout
    PrematureEndOfData { needed: usize, available: usize },
    /// Declared layout version is not `FORMAT_VERSION`
    UnsupportedVersion(f64),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::PrematureEndOfData { needed, available } => write!(
                f,
                "premature end of data: need {} bytes, got {}",
                needed, available
            ),
            DecodeError::UnsupportedVersion(version) => write!(
                f,
                "unsupported format version {} (expected {})",
                version, FORMAT_VERSION
            ),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Encode a snapshot into its fixed 64-byte wire form.
///
/// Layout (doubles big-endian):
/// `[version][timestamp][id:16]{latitude}{longitude}{altitude}{speed}`
pub fn encode(snapshot: &Snapshot) -> [u8; ENCODED_LEN] {
    let mut buf = [0u8; ENCODED_LEN];

    put_f64(&mut buf, VERSION_OFFSET, f64::from(snapshot.version()));
    put_f64(&mut buf, TIMESTAMP_OFFSET, snapshot.timestamp().as_secs_f64());
    buf[ID_OFFSET..ID_OFFSET + ID_LEN].copy_from_slice(snapshot.id().as_bytes());

    let location = snapshot.location();
    put_f64(
        &mut buf,
        LATITUDE_OFFSET,
        location.map_or(UNKNOWN, |l| l.latitude),
    );
    put_f64(
        &mut buf,
        LONGITUDE_OFFSET,
        location.map_or(UNKNOWN, |l| l.longitude),
    );
    put_f64(
        &mut buf,
        ALTITUDE_OFFSET,
        location.map_or(UNKNOWN, |l| l.altitude),
    );
    put_f64(
        &mut buf,
        SPEED_OFFSET,
        snapshot.speed().map_or(UNKNOWN, |s| s.meters_per_second()),
    );

    buf
}

/// Decode a snapshot from wire bytes.
///
/// Length is checked before anything else, so every truncated buffer fails
/// with `PrematureEndOfData` regardless of its contents. Bytes past
/// `ENCODED_LEN` are ignored.
pub fn decode(bytes: &[u8]) -> Result<Snapshot, DecodeError> {
    if bytes.len() < ENCODED_LEN {
        return Err(DecodeError::PrematureEndOfData {
            needed: ENCODED_LEN,
            available: bytes.len(),
        });
    }

    let version = get_f64(bytes, VERSION_OFFSET);
    if version != f64::from(FORMAT_VERSION) {
        return Err(DecodeError::UnsupportedVersion(version));
    }

    let timestamp = Timestamp::from_secs_f64(get_f64(bytes, TIMESTAMP_OFFSET));

    let mut id = [0u8; ID_LEN];
    id.copy_from_slice(&bytes[ID_OFFSET..ID_OFFSET + ID_LEN]);
    let id = Uuid::from_bytes(id);

    let latitude = get_f64(bytes, LATITUDE_OFFSET);
    let longitude = get_f64(bytes, LONGITUDE_OFFSET);
    let altitude = get_f64(bytes, ALTITUDE_OFFSET);

    // A single unknown component makes the whole position unknown
    let location = if latitude == UNKNOWN || longitude == UNKNOWN || altitude == UNKNOWN {
        None
    } else {
        Some(Location::new(latitude, longitude, altitude))
    };

    let speed = match get_f64(bytes, SPEED_OFFSET) {
        value if value == UNKNOWN => None,
        value => Some(Speed::from_meters_per_second(value)),
    };

    Ok(Snapshot::new(id, timestamp, location, speed))
}

fn put_f64(buf: &mut [u8; ENCODED_LEN], offset: usize, value: f64) {
    buf[offset..offset + FIELD_LEN].copy_from_slice(&value.to_be_bytes());
}

fn get_f64(bytes: &[u8], offset: usize) -> f64 {
    let mut raw = [0u8; FIELD_LEN];
    raw.copy_from_slice(&bytes[offset..offset + FIELD_LEN]);
    f64::from_be_bytes(raw)
}
