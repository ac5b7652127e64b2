use crate::telemetry::{Location, Snapshot, Speed, Timestamp};
use uuid::Uuid;

#[cfg(test)]
mod tests;

/// Entity represents one tracked transmitter's last known state.
///
/// Location and speed are independently optional; `None` means "not yet
/// known" and is never replaced by a zero default.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    /// Assigned at first sighting, never changes
    id: Uuid,

    location: Option<Location>,

    speed: Option<Speed>,

    /// Set only when the location changes (or first becomes known)
    last_movement: Option<Timestamp>,

    /// Timestamp of the last applied report, moving or not
    last_report: Option<Timestamp>,
}

impl Entity {
    /// Create an entity with nothing known about it yet
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            location: None,
            speed: None,
            last_movement: None,
            last_report: None,
        }
    }

    /// Create an entity from its first decoded snapshot
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut entity = Self::new(snapshot.id());
        entity.apply(snapshot);
        entity
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

    pub fn last_movement(&self) -> Option<Timestamp> {
        self.last_movement
    }

    pub fn last_report(&self) -> Option<Timestamp> {
        self.last_report
    }

    /// Replace location and speed with a newer report.
    ///
    /// The movement timestamp advances to `at` when a known location differs
    /// from the previous one, including the first time a location is known.
    /// An unknown location never counts as movement.
    pub fn update(&mut self, location: Option<Location>, speed: Option<Speed>, at: Timestamp) {
        if let Some(new_location) = location {
            if self.location != Some(new_location) {
                self.last_movement = Some(at);
            }
        }

        self.location = location;
        self.speed = speed;
        self.last_report = Some(at);
    }

    /// Apply a decoded snapshot for this entity's identifier
    pub fn apply(&mut self, snapshot: &Snapshot) {
        self.update(snapshot.location(), snapshot.speed(), snapshot.timestamp());
    }

    /// True when the entity has moved at some point but not within the last
    /// `threshold_seconds`. Entities with no known movement are not stationary.
    pub fn is_stationary(&self, now: Timestamp, threshold_seconds: f64) -> bool {
        match self.last_movement {
            Some(moved_at) => now.seconds_since(moved_at) > threshold_seconds,
            None => false,
        }
    }
}
