// Simulated transmitters generating test traffic for the ingest endpoint

mod fleet;
mod reporter;
mod transmitter;

pub use fleet::Fleet;
pub use reporter::Reporter;
pub use transmitter::{MotionPolicy, SimulatedTransmitter, METERS_PER_DEGREE};
