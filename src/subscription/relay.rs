use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Outbound queue depth per subscriber; pushes beyond this are dropped
pub const RELAY_QUEUE_DEPTH: usize = 64;

/// Identifies one relay connection
pub type ConnectionId = u64;

/// Subscription errors
#[derive(Debug, Clone, PartialEq)]
pub enum RelayError {
    /// Another connection already holds the subscriber slot
    OverCapacity { active: ConnectionId },
    /// This connection already holds the slot
    AlreadySubscribed,
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::OverCapacity { active } => write!(
                f,
                "relay over capacity: connection {} is already subscribed",
                active
            ),
            RelayError::AlreadySubscribed => write!(f, "connection is already subscribed"),
        }
    }
}

impl std::error::Error for RelayError {}

struct Subscriber {
    connection_id: ConnectionId,
    tx: mpsc::Sender<Vec<u8>>,
}

/// Single-subscriber relay of raw encoded snapshots.
///
/// At most one connection holds the subscriber slot. Subscribe, unsubscribe
/// and push all take the same mutex, so a push never reaches a subscriber
/// that is being detached. Pushes with no subscriber, or to a full queue, are
/// dropped.
pub struct Relay {
    slot: Mutex<Option<Subscriber>>,
    next_connection_id: AtomicU64,
}

impl Relay {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            next_connection_id: AtomicU64::new(1),
        }
    }

    /// Allocate an identifier for a new connection
    pub fn next_connection_id(&self) -> ConnectionId {
        self.next_connection_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Attach `connection_id` as the sole subscriber.
    ///
    /// Returns the receiving end of its data queue. The existing subscriber
    /// is left untouched when the slot is taken.
    pub fn subscribe(
        &self,
        connection_id: ConnectionId,
    ) -> Result<mpsc::Receiver<Vec<u8>>, RelayError> {
        let mut slot = self.slot.lock().unwrap();

        if let Some(active) = slot.as_ref() {
            if active.connection_id == connection_id {
                return Err(RelayError::AlreadySubscribed);
            }
            return Err(RelayError::OverCapacity {
                active: active.connection_id,
            });
        }

        let (tx, rx) = mpsc::channel(RELAY_QUEUE_DEPTH);
        *slot = Some(Subscriber { connection_id, tx });

        info!(connection_id = connection_id, "Relay subscriber attached");
        Ok(rx)
    }

    /// Detach `connection_id` if it holds the slot.
    ///
    /// Returns false (and changes nothing) for any other connection.
    pub fn unsubscribe(&self, connection_id: ConnectionId) -> bool {
        let mut slot = self.slot.lock().unwrap();

        match slot.as_ref() {
            Some(active) if active.connection_id == connection_id => {
                *slot = None;
                info!(connection_id = connection_id, "Relay subscriber detached");
                true
            }
            _ => false,
        }
    }

    /// Push one encoded snapshot to the current subscriber.
    ///
    /// Fire-and-forget: returns whether the payload was queued. A subscriber
    /// whose receiver is gone is detached.
    pub fn broadcast(&self, payload: &[u8]) -> bool {
        let mut slot = self.slot.lock().unwrap();

        let Some(active) = slot.as_ref() else {
            return false;
        };

        match active.tx.try_send(payload.to_vec()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!(
                    connection_id = active.connection_id,
                    "Relay subscriber queue full, dropping report"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(
                    connection_id = active.connection_id,
                    "Relay subscriber gone, detaching"
                );
                *slot = None;
                false
            }
        }
    }

    /// Connection currently holding the slot
    pub fn subscriber(&self) -> Option<ConnectionId> {
        self.slot.lock().unwrap().as_ref().map(|s| s.connection_id)
    }

    pub fn has_subscriber(&self) -> bool {
        self.slot.lock().unwrap().is_some()
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self::new()
    }
}
