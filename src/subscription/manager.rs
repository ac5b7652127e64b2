use crate::subscription::protocol::ControlCommand;
use crate::subscription::relay::{ConnectionId, Relay, RelayError};
use axum::extract::ws::{Message, WebSocket};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// Manages a single relay WebSocket connection.
///
/// Text frames carry control commands; binary frames carry snapshot data
/// out to the client once it holds the subscriber slot.
pub struct ConnectionManager {
    connection_id: ConnectionId,
    relay: Arc<Relay>,
    /// Present while this connection is the relay's subscriber
    data_rx: Option<mpsc::Receiver<Vec<u8>>>,
}

impl ConnectionManager {
    pub fn new(relay: Arc<Relay>) -> Self {
        Self {
            connection_id: relay.next_connection_id(),
            relay,
            data_rx: None,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Handle WebSocket connection lifecycle.
    ///
    /// Runs until the client disconnects or `shutdown_rx` flips to true. The
    /// subscriber slot is released on exit if this connection held it.
    pub async fn handle(mut self, mut socket: WebSocket, mut shutdown_rx: watch::Receiver<bool>) {
        info!(connection_id = self.connection_id, "Relay connection established");

        loop {
            tokio::select! {
                // Handle incoming client messages
                msg = socket.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            self.handle_control_message(&text);
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!(connection_id = self.connection_id, "Relay client disconnected");
                            break;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if let Err(e) = socket.send(Message::Pong(data)).await {
                                error!(error = %e, "Failed to send pong");
                                break;
                            }
                        }
                        Some(Ok(_)) => {
                            // Ignore binary, pong messages
                        }
                        Some(Err(e)) => {
                            warn!(connection_id = self.connection_id, error = %e, "WebSocket error");
                            break;
                        }
                    }
                }

                // Forward relayed snapshots while subscribed
                payload = recv_data(&mut self.data_rx) => {
                    match payload {
                        Some(payload) => {
                            if let Err(e) = socket.send(Message::Binary(payload)).await {
                                error!(error = %e, "Failed to send snapshot");
                                break;
                            }
                        }
                        None => {
                            // Relay dropped our queue
                            self.data_rx = None;
                        }
                    }
                }

                _ = shutdown_requested(&mut shutdown_rx) => {
                    debug!(connection_id = self.connection_id, "Relay shutting down connection");
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                }
            }
        }

        self.relay.unsubscribe(self.connection_id);
        info!(connection_id = self.connection_id, "Relay connection closed");
    }

    /// Apply one control command.
    ///
    /// Malformed commands and over-capacity subscribes are logged; the
    /// connection stays open in its current state.
    pub fn handle_control_message(&mut self, text: &str) {
        let command = match text.parse::<ControlCommand>() {
            Ok(command) => command,
            Err(e) => {
                warn!(connection_id = self.connection_id, error = %e, "Ignoring relay command");
                return;
            }
        };

        match command {
            ControlCommand::Subscribe => match self.relay.subscribe(self.connection_id) {
                Ok(rx) => {
                    self.data_rx = Some(rx);
                }
                Err(RelayError::AlreadySubscribed) => {
                    debug!(connection_id = self.connection_id, "Already subscribed");
                }
                Err(e) => {
                    error!(
                        connection_id = self.connection_id,
                        error = %e,
                        "Incoming subscription ignored"
                    );
                }
            },
            ControlCommand::Unsubscribe => {
                if !self.relay.unsubscribe(self.connection_id) {
                    debug!(connection_id = self.connection_id, "Unsubscribe without subscription");
                }
                self.data_rx = None;
            }
        }
    }

    /// True while this connection holds the subscriber slot
    pub fn is_subscribed(&self) -> bool {
        self.data_rx.is_some()
    }
}

/// Resolves once shutdown is signalled (or the sender is gone)
async fn shutdown_requested(shutdown_rx: &mut watch::Receiver<bool>) {
    // The borrowed value guard is not Send; release it before returning
    let _ = shutdown_rx.wait_for(|stop| *stop).await;
}

async fn recv_data(data_rx: &mut Option<mpsc::Receiver<Vec<u8>>>) -> Option<Vec<u8>> {
    match data_rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
