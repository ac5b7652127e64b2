use crate::entity::Entity;
use crate::state::Registry;
use crate::telemetry::Timestamp;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

/// Periodically log every tracked entity in display order.
///
/// Entities that have not moved for more than `stale_after_seconds` are
/// logged at warn level. Runs until the task is aborted.
pub async fn run_status_reporter(
    registry: Arc<Registry>,
    interval_seconds: u64,
    stale_after_seconds: f64,
) {
    let mut ticker = interval(Duration::from_secs(interval_seconds.max(1)));

    // Skip missed ticks to prevent backlog under load
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let now = Timestamp::now();
        let entities = registry.enumerate();
        let stationary = entities
            .iter()
            .filter(|entity| entity.is_stationary(now, stale_after_seconds))
            .count();

        info!(
            entities = entities.len(),
            stationary = stationary,
            "Registry status"
        );

        for (position, entity) in entities.iter().enumerate() {
            log_entity(position, entity, now, stale_after_seconds);
        }
    }
}

fn log_entity(position: usize, entity: &Entity, now: Timestamp, stale_after_seconds: f64) {
    let location = entity
        .location()
        .map(|l| format!("{:.6},{:.6} @ {:.1}m", l.latitude, l.longitude, l.altitude))
        .unwrap_or_else(|| "unknown".to_string());
    let speed = entity
        .speed()
        .map(|s| format!("{:.2}m/s", s.meters_per_second()))
        .unwrap_or_else(|| "unknown".to_string());

    if entity.is_stationary(now, stale_after_seconds) {
        let idle_seconds = entity
            .last_movement()
            .map(|moved_at| now.seconds_since(moved_at))
            .unwrap_or_default();
        warn!(
            position = position,
            entity_id = %entity.id(),
            location = %location,
            speed = %speed,
            idle_seconds = idle_seconds,
            "Entity stationary"
        );
    } else {
        info!(
            position = position,
            entity_id = %entity.id(),
            location = %location,
            speed = %speed,
            "Entity"
        );
    }
}
