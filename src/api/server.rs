use crate::api::query::{create_query_router, QueryAppState};
use crate::api::websocket::{create_ws_router, WsAppState};
use crate::state::Registry;
use crate::subscription::Relay;
use anyhow::{Context, Result};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// How long `stop` waits for open connections to close before aborting
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Build the relay endpoint router: WebSocket at `/`, entity queries under
/// `/api/entities`.
pub fn create_relay_router(
    relay: Arc<Relay>,
    registry: Arc<Registry>,
    stale_after_seconds: f64,
    shutdown_rx: watch::Receiver<bool>,
) -> Router {
    let ws_state = Arc::new(WsAppState { relay, shutdown_rx });
    let query_state = Arc::new(QueryAppState {
        registry,
        stale_after_seconds,
    });

    create_ws_router(ws_state).merge(create_query_router(query_state))
}

/// HTTP/WebSocket server hosting the relay.
///
/// Same lifecycle as the ingest listener: start while running and stop while
/// stopped are no-ops.
pub struct RelayServer {
    bind_addr: SocketAddr,
    relay: Arc<Relay>,
    registry: Arc<Registry>,
    stale_after_seconds: f64,
    running: Mutex<Option<RunningServer>>,
}

struct RunningServer {
    local_addr: SocketAddr,
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl RelayServer {
    pub fn new(
        bind_addr: SocketAddr,
        relay: Arc<Relay>,
        registry: Arc<Registry>,
        stale_after_seconds: f64,
    ) -> Self {
        Self {
            bind_addr,
            relay,
            registry,
            stale_after_seconds,
            running: Mutex::new(None),
        }
    }

    /// Bind the TCP listener and spawn the accept loop.
    pub async fn start(&self) -> Result<SocketAddr> {
        let mut running = self.running.lock().await;

        if let Some(server) = running.as_ref() {
            debug!(addr = %server.local_addr, "Relay server already running");
            return Ok(server.local_addr);
        }

        let listener = TcpListener::bind(self.bind_addr)
            .await
            .with_context(|| format!("Failed to bind relay port on {}", self.bind_addr))?;
        let local_addr = listener
            .local_addr()
            .context("Failed to read relay socket address")?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let router = create_relay_router(
            Arc::clone(&self.relay),
            Arc::clone(&self.registry),
            self.stale_after_seconds,
            shutdown_rx.clone(),
        );

        let handle = tokio::spawn(async move {
            let mut shutdown_rx = shutdown_rx;
            let shutdown = async move {
                let _ = shutdown_rx.wait_for(|stop| *stop).await;
            };

            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!(error = %e, "Relay server error");
            }
        });

        info!(addr = %local_addr, "Relay listening");

        *running = Some(RunningServer {
            local_addr,
            shutdown_tx,
            handle,
        });

        Ok(local_addr)
    }

    /// Close open connections and stop accepting new ones.
    pub async fn stop(&self) {
        let server = self.running.lock().await.take();

        let Some(mut server) = server else {
            return;
        };

        let _ = server.shutdown_tx.send(true);
        match tokio::time::timeout(SHUTDOWN_GRACE, &mut server.handle).await {
            Ok(Err(e)) if !e.is_cancelled() => {
                error!(error = %e, "Relay server task failed");
            }
            Ok(_) => {}
            Err(_) => {
                warn!("Relay connections did not close in time, aborting");
                server.handle.abort();
            }
        }

        info!(addr = %server.local_addr, "Relay stopped");
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.running.lock().await.as_ref().map(|s| s.local_addr)
    }
}
