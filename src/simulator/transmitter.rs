use crate::entity::Entity;
use crate::telemetry::{Location, Snapshot, Speed, Timestamp};
use rand::Rng;
use std::time::Duration;
use uuid::Uuid;

/// Approximate length of one degree of latitude
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// How a simulated transmitter behaves over time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionPolicy {
    /// Moves on every relocation
    Normal,
    /// Moves for this many relocations, then freezes while still reporting
    FailsAfter(u32),
}

/// A fake transmitter that wanders from its start location.
///
/// Owns its own state; the server only ever sees it through encoded reports.
#[derive(Debug, Clone)]
pub struct SimulatedTransmitter {
    state: Entity,
    policy: MotionPolicy,
    ticks: u32,
}

impl SimulatedTransmitter {
    pub fn new(
        id: Uuid,
        location: Option<Location>,
        speed: Option<Speed>,
        policy: MotionPolicy,
    ) -> Self {
        let mut state = Entity::new(id);
        state.update(location, speed, Timestamp::now());

        Self {
            state,
            policy,
            ticks: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.state.id()
    }

    pub fn state(&self) -> &Entity {
        &self.state
    }

    pub fn policy(&self) -> MotionPolicy {
        self.policy
    }

    /// Successful relocations so far
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Move by a random speed in `[0, max_speed)` for one `interval`.
    ///
    /// Returns whether the transmitter moved. Nothing changes while the
    /// location is unknown or once a `FailsAfter` budget is spent.
    pub fn relocate<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        interval: Duration,
        max_speed: Speed,
        now: Timestamp,
    ) -> bool {
        if let MotionPolicy::FailsAfter(limit) = self.policy {
            if self.ticks >= limit {
                return false;
            }
        }

        let Some(location) = self.state.location() else {
            return false;
        };

        let speed = rng.gen::<f64>() * max_speed.meters_per_second();
        let distance = interval.as_secs_f64() * speed;
        let degrees = distance / METERS_PER_DEGREE;

        // Always north-east and upwards
        let moved = Location::new(
            location.latitude + degrees,
            location.longitude + degrees,
            location.altitude + distance,
        );

        self.state
            .update(Some(moved), Some(Speed::from_meters_per_second(speed)), now);
        self.ticks = self.ticks.saturating_add(1);
        true
    }

    /// Report of the current state stamped with `at`
    pub fn snapshot(&self, at: Timestamp) -> Snapshot {
        Snapshot::of(&self.state, at)
    }
}
