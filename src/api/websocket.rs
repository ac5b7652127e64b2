use crate::subscription::{ConnectionManager, Relay};
use axum::{
    extract::{
        ws::{WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Shared application state for the relay WebSocket handler
#[derive(Clone)]
pub struct WsAppState {
    pub relay: Arc<Relay>,
    /// Flips to true when the relay server is stopping
    pub shutdown_rx: watch::Receiver<bool>,
}

/// GET / - WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<WsAppState>>) -> Response {
    info!("WebSocket upgrade request received");
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Create WebSocket router
pub fn create_ws_router(state: Arc<WsAppState>) -> Router {
    Router::new().route("/", get(ws_handler)).with_state(state)
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<WsAppState>) {
    let manager = ConnectionManager::new(Arc::clone(&state.relay));

    manager.handle(socket, state.shutdown_rx.clone()).await;
}
