// Telemetry value types and the fixed-layout snapshot codec

mod codec;

#[cfg(test)]
mod tests;

pub use codec::{decode, encode, DecodeError, ENCODED_LEN, FORMAT_VERSION, UNKNOWN};

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::entity::Entity;

/// 3-D position of a transmitter
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Location {
    /// Degrees
    pub latitude: f64,
    /// Degrees
    pub longitude: f64,
    /// Meters
    pub altitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }
}

/// Ground speed in meters per second
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Speed(f64);

impl Speed {
    pub fn from_meters_per_second(value: f64) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(0.0)
    }

    pub fn meters_per_second(&self) -> f64 {
        self.0
    }
}

/// Seconds since the UNIX epoch.
///
/// Stored as the same `f64` that travels on the wire so a decoded timestamp
/// compares bit-for-bit with the one that was encoded.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Timestamp(f64);

impl Timestamp {
    pub fn from_secs_f64(seconds: f64) -> Self {
        Self(seconds)
    }

    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.timestamp_micros() as f64 / 1_000_000.0)
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0
    }

    /// Seconds elapsed from `earlier` to `self` (negative if `earlier` is later)
    pub fn seconds_since(&self, earlier: Timestamp) -> f64 {
        self.0 - earlier.0
    }

    /// None when the value is outside chrono's representable range
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        if !self.0.is_finite() {
            return None;
        }
        let micros = (self.0 * 1_000_000.0).round();
        if micros < i64::MIN as f64 || micros > i64::MAX as f64 {
            return None;
        }
        Utc.timestamp_micros(micros as i64).single()
    }
}

/// Immutable point-in-time copy of one transmitter's state (a "memento").
///
/// Created fresh for every outbound report and every inbound decode.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    version: u8,
    timestamp: Timestamp,
    id: Uuid,
    location: Option<Location>,
    speed: Option<Speed>,
}

impl Snapshot {
    pub fn new(
        id: Uuid,
        timestamp: Timestamp,
        location: Option<Location>,
        speed: Option<Speed>,
    ) -> Self {
        Self {
            version: FORMAT_VERSION,
            timestamp,
            id,
            location,
            speed,
        }
    }

    /// Copy the current state of `entity`, stamped with `at`
    pub fn of(entity: &Entity, at: Timestamp) -> Self {
        Self::new(entity.id(), at, entity.location(), entity.speed())
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn speed(&self) -> Option<Speed> {
        self.speed
    }
}
