use crate::telemetry::{self, Snapshot, ENCODED_LEN};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Receives every successfully decoded snapshot.
///
/// Called from the listener task, one datagram at a time. `raw` is the exact
/// datagram that decoded into `snapshot`.
pub trait IngestHandler: Send + Sync + 'static {
    fn on_snapshot(&self, snapshot: Snapshot, raw: &[u8], source: SocketAddr);
}

/// UDP ingest listener.
///
/// State machine: Stopped --start--> Running --stop--> Stopped. Starting a
/// running listener and stopping a stopped one are both no-ops.
pub struct IngestListener {
    bind_addr: SocketAddr,
    running: Mutex<Option<RunningListener>>,
}

struct RunningListener {
    local_addr: SocketAddr,
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl IngestListener {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            running: Mutex::new(None),
        }
    }

    /// Bind the socket and spawn the receive loop.
    ///
    /// Returns the bound address (useful when binding port 0). Bind failure
    /// is returned to the caller and leaves the listener stopped.
    pub async fn start(&self, handler: Arc<dyn IngestHandler>) -> Result<SocketAddr> {
        let mut running = self.running.lock().await;

        if let Some(listener) = running.as_ref() {
            debug!(addr = %listener.local_addr, "Ingest listener already running");
            return Ok(listener.local_addr);
        }

        let socket = UdpSocket::bind(self.bind_addr)
            .await
            .with_context(|| format!("Failed to bind ingest socket on {}", self.bind_addr))?;
        let local_addr = socket
            .local_addr()
            .context("Failed to read ingest socket address")?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(receive_loop(socket, handler, shutdown_rx));

        info!(addr = %local_addr, "UDP ingest started");

        *running = Some(RunningListener {
            local_addr,
            shutdown_tx,
            handle,
        });

        Ok(local_addr)
    }

    /// Stop the receive loop and wait for it to exit.
    ///
    /// Safe to call from any task, any number of times, started or not. The
    /// pending receive is cancelled, so this does not wait for a datagram.
    pub async fn stop(&self) {
        let listener = self.running.lock().await.take();

        let Some(listener) = listener else {
            return;
        };

        let _ = listener.shutdown_tx.send(true);
        if let Err(e) = listener.handle.await {
            if !e.is_cancelled() {
                error!(error = %e, "Ingest task failed");
            }
        }

        info!(addr = %listener.local_addr, "UDP ingest stopped");
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    /// Bound address while running
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.running.lock().await.as_ref().map(|l| l.local_addr)
    }
}

async fn receive_loop(
    socket: UdpSocket,
    handler: Arc<dyn IngestHandler>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    // One spare byte so an oversized datagram shows up as too long
    let mut buf = [0u8; ENCODED_LEN + 1];

    loop {
        tokio::select! {
            _ = shutdown_rx.wait_for(|stop| *stop) => break,

            recv = socket.recv_from(&mut buf) => {
                match recv {
                    Ok((len, source)) => process_datagram(&buf[..len], source, handler.as_ref()),
                    Err(e) => {
                        // One failed receive never ends the loop
                        warn!(error = %e, "UDP receive failed");
                    }
                }
            }
        }
    }

    debug!("Ingest receive loop exited");
}

/// Decode one datagram and hand it to the handler; malformed data is logged
/// and dropped. A report is exactly `ENCODED_LEN` bytes, so longer datagrams
/// are rejected rather than truncated.
pub fn process_datagram(bytes: &[u8], source: SocketAddr, handler: &dyn IngestHandler) {
    if bytes.len() > ENCODED_LEN {
        error!(
            source = %source,
            len = bytes.len(),
            "Dropping oversized report"
        );
        return;
    }

    match telemetry::decode(bytes) {
        Ok(snapshot) => handler.on_snapshot(snapshot, bytes, source),
        Err(e) => {
            error!(
                source = %source,
                len = bytes.len(),
                error = %e,
                "Dropping undecodable report"
            );
        }
    }
}
