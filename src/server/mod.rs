// Coordinator wiring ingest into the registry and the relay

use crate::api::RelayServer;
use crate::config::{ConfigError, ServerConfig};
use crate::ingest::{IngestHandler, IngestListener};
use crate::state::{Applied, Registry};
use crate::subscription::Relay;
use crate::telemetry::Snapshot;
use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, trace};


/// Applies decoded snapshots to the registry and mirrors the raw datagram to
/// the relay.
pub struct SnapshotSink {
    registry: Arc<Registry>,
    relay: Arc<Relay>,
}

impl SnapshotSink {
    pub fn new(registry: Arc<Registry>, relay: Arc<Relay>) -> Self {
        Self { registry, relay }
    }
}

impl IngestHandler for SnapshotSink {
    fn on_snapshot(&self, snapshot: Snapshot, raw: &[u8], source: SocketAddr) {
        match self.registry.apply(&snapshot) {
            Ok(Applied::Inserted) => {
                info!(entity_id = %snapshot.id(), source = %source, "New transmitter");
            }
            Ok(Applied::Updated) => {
                trace!(entity_id = %snapshot.id(), "Transmitter updated");
            }
            Err(e) => {
                error!(entity_id = %snapshot.id(), error = %e, "Failed to apply report");
            }
        }

        // Forwarded even when the registry rejected it
        self.relay.broadcast(raw);
    }
}

/// Owns the UDP ingest listener and the relay server.
pub struct TrackingServer {
    registry: Arc<Registry>,
    relay: Arc<Relay>,
    ingest: IngestListener,
    relay_server: RelayServer,
}

impl TrackingServer {
    /// Build both endpoints against `config`. Nothing is bound until `start`.
    pub fn new(
        config: &ServerConfig,
        registry: Arc<Registry>,
        stale_after_seconds: f64,
    ) -> Result<Self, ConfigError> {
        let relay = Arc::new(Relay::new());

        let ingest = IngestListener::new(config.ingest_addr()?);
        let relay_server = RelayServer::new(
            config.relay_addr()?,
            Arc::clone(&relay),
            Arc::clone(&registry),
            stale_after_seconds,
        );

        Ok(Self {
            registry,
            relay,
            ingest,
            relay_server,
        })
    }

    /// Start the ingest listener and the relay.
    ///
    /// Both are attempted; a failure of one leaves the other running and the
    /// first error is returned. Calling again retries whichever is stopped.
    pub async fn start(&self) -> Result<()> {
        let sink = Arc::new(SnapshotSink::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.relay),
        ));

        let ingest = self.ingest.start(sink).await;
        if let Err(e) = &ingest {
            error!(error = %e, "Ingest listener failed to start");
        }

        let relay = self.relay_server.start().await;
        if let Err(e) = &relay {
            error!(error = %e, "Relay failed to start");
        }

        ingest?;
        relay?;
        Ok(())
    }

    /// Stop both endpoints. Safe to call repeatedly.
    pub async fn stop(&self) {
        self.ingest.stop().await;
        self.relay_server.stop().await;
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn relay(&self) -> &Arc<Relay> {
        &self.relay
    }

    /// Bound UDP address while the ingest listener runs
    pub async fn ingest_addr(&self) -> Option<SocketAddr> {
        self.ingest.local_addr().await
    }

    /// Bound TCP address while the relay runs
    pub async fn relay_addr(&self) -> Option<SocketAddr> {
        self.relay_server.local_addr().await
    }
}
