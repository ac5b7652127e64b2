// Wire format and value types
pub mod telemetry;

// Tracked entities and the shared registry
pub mod entity;
pub mod state;

// Configuration
pub mod config;

// UDP ingest
pub mod ingest;

// WebSocket relay
pub mod subscription;

// HTTP/WebSocket server
pub mod api;

// Ingest-to-registry-and-relay coordinator
pub mod server;

// Simulated transmitters
pub mod simulator;
