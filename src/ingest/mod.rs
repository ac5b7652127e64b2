// UDP ingest of transmitter reports

mod listener;

pub use listener::{process_datagram, IngestHandler, IngestListener};
