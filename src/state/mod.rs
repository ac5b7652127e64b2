// Entity registry (the shared in-memory world state)

mod registry;
mod status_reporter;
mod store;

pub use registry::{Applied, Registry};
pub use status_reporter::run_status_reporter;
pub use store::{EntityStore, RegistryError};

#[cfg(test)]
mod tests;
