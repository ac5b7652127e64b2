use crate::telemetry::{self, Snapshot};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::error;

/// Sends encoded reports to the ingest endpoint. Connectionless, no acks.
pub struct Reporter {
    socket: UdpSocket,
    target: SocketAddr,
}

impl Reporter {
    /// Bind an ephemeral local socket for sending to `target`
    pub async fn bind(target: SocketAddr) -> Result<Self> {
        let local: SocketAddr = if target.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };

        let socket = UdpSocket::bind(local)
            .await
            .context("Failed to bind reporter socket")?;

        Ok(Self { socket, target })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// Encode and send one report. Send failures are logged, never retried.
    pub async fn report_now(&self, snapshot: &Snapshot) -> bool {
        let bytes = telemetry::encode(snapshot);

        match self.socket.send_to(&bytes, self.target).await {
            Ok(_) => true,
            Err(e) => {
                error!(
                    entity_id = %snapshot.id(),
                    target = %self.target,
                    error = %e,
                    "UDP send failure"
                );
                false
            }
        }
    }
}
