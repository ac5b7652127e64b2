// Single-subscriber WebSocket relay of raw snapshots

pub mod manager;
pub mod protocol;
pub mod relay;

pub use manager::ConnectionManager;
pub use protocol::{ControlCommand, ProtocolError};
pub use relay::{ConnectionId, Relay, RelayError, RELAY_QUEUE_DEPTH};
