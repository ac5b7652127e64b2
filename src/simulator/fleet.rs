use crate::config::SimulatorConfig;
use crate::entity::Entity;
use crate::simulator::reporter::Reporter;
use crate::simulator::transmitter::{MotionPolicy, SimulatedTransmitter};
use crate::telemetry::{Location, Speed, Timestamp};
use anyhow::Result;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};
use uuid::Uuid;

type Transmitters = Arc<Mutex<HashMap<Uuid, SimulatedTransmitter>>>;

/// A group of simulated transmitters reporting to one ingest endpoint.
///
/// Each flying transmitter gets its own recurring task. Tasks hold only the
/// transmitter's identifier and look it up on every tick.
pub struct Fleet {
    transmitters: Transmitters,
    /// Insertion order, for stable listing
    order: Mutex<Vec<Uuid>>,
    reporter: Arc<Reporter>,
    interval: Duration,
    max_speed: Speed,
    tasks: Mutex<HashMap<Uuid, JoinHandle<()>>>,
}

impl Fleet {
    pub fn new(reporter: Arc<Reporter>, interval: Duration, max_speed: Speed) -> Self {
        Self {
            transmitters: Arc::new(Mutex::new(HashMap::new())),
            order: Mutex::new(Vec::new()),
            reporter,
            // Tokio intervals reject a zero period
            interval: interval.max(Duration::from_millis(1)),
            max_speed,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Build the configured fleet: every transmitter starts motionless at
    /// the configured location, and every `broken_every`-th one (starting
    /// with the first) fails after `fail_after_ticks`.
    pub async fn from_config(config: &SimulatorConfig, target: SocketAddr) -> Result<Self> {
        let reporter = Arc::new(Reporter::bind(target).await?);
        let fleet = Self::new(
            reporter,
            Duration::from_millis(config.report_interval_ms),
            Speed::from_meters_per_second(config.max_speed_mps),
        );

        let start = Location::new(config.latitude, config.longitude, config.altitude);

        for index in 0..config.transmitter_count {
            let broken = config.broken_every > 0 && index % config.broken_every == 0;
            let policy = if broken {
                MotionPolicy::FailsAfter(config.fail_after_ticks)
            } else {
                MotionPolicy::Normal
            };

            fleet.add(SimulatedTransmitter::new(
                Uuid::new_v4(),
                Some(start),
                Some(Speed::zero()),
                policy,
            ));
        }

        info!(
            count = config.transmitter_count,
            target = %target,
            "Simulated fleet ready"
        );

        Ok(fleet)
    }

    /// Add a transmitter. Replaces any transmitter with the same identifier.
    pub fn add(&self, transmitter: SimulatedTransmitter) {
        let id = transmitter.id();
        let previous = self.transmitters.lock().unwrap().insert(id, transmitter);
        if previous.is_none() {
            self.order.lock().unwrap().push(id);
        }
    }

    /// Identifiers in insertion order
    pub fn ids(&self) -> Vec<Uuid> {
        self.order.lock().unwrap().clone()
    }

    /// Current state of one transmitter
    pub fn state(&self, id: Uuid) -> Option<Entity> {
        self.transmitters
            .lock()
            .unwrap()
            .get(&id)
            .map(|t| t.state().clone())
    }

    pub fn policy(&self, id: Uuid) -> Option<MotionPolicy> {
        self.transmitters.lock().unwrap().get(&id).map(|t| t.policy())
    }

    pub fn len(&self) -> usize {
        self.transmitters.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start the recurring relocate-and-report task for every transmitter
    /// that is not already flying.
    pub fn fly(&self) {
        let mut tasks = self.tasks.lock().unwrap();

        for id in self.ids() {
            if tasks.contains_key(&id) {
                continue;
            }

            let handle = tokio::spawn(tick_loop(
                id,
                Arc::clone(&self.transmitters),
                Arc::clone(&self.reporter),
                self.interval,
                self.max_speed,
            ));
            tasks.insert(id, handle);
        }

        debug!(flying = tasks.len(), "Fleet flying");
    }

    /// Stop every recurring task. Transmitter state is kept.
    pub fn halt(&self) {
        let mut tasks = self.tasks.lock().unwrap();

        for (_, handle) in tasks.drain() {
            handle.abort();
        }

        debug!("Fleet halted");
    }

    pub fn is_flying(&self) -> bool {
        !self.tasks.lock().unwrap().is_empty()
    }
}

impl Drop for Fleet {
    fn drop(&mut self) {
        self.halt();
    }
}

async fn tick_loop(
    id: Uuid,
    transmitters: Transmitters,
    reporter: Arc<Reporter>,
    period: Duration,
    max_speed: Speed,
) {
    // First report one period after takeoff
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let snapshot = {
            let mut transmitters = transmitters.lock().unwrap();
            let Some(transmitter) = transmitters.get_mut(&id) else {
                debug!(entity_id = %id, "Transmitter gone, stopping");
                return;
            };

            let now = Timestamp::now();
            transmitter.relocate(&mut rand::thread_rng(), period, max_speed, now);
            transmitter.snapshot(now)
        };

        reporter.report_now(&snapshot).await;
    }
}
