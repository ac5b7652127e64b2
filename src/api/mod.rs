// Relay endpoint: WebSocket subscriptions and read-only entity queries

pub mod query;
pub mod server;
pub mod websocket;

pub use query::{create_query_router, EntityResponse, QueryAppState};
pub use server::{create_relay_router, RelayServer, SHUTDOWN_GRACE};
pub use websocket::{create_ws_router, ws_handler, WsAppState};
