use serde::Deserialize;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Complete tracker configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
    #[serde(default)]
    pub status: StatusConfig,
}

/// Network endpoints: UDP ingest and WebSocket relay share one bind address
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_ingest_port")]
    pub ingest_port: u16,
    #[serde(default = "default_relay_port")]
    pub relay_port: u16,
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

// 49152-65535 is the dynamic/private range
fn default_ingest_port() -> u16 {
    50000
}

fn default_relay_port() -> u16 {
    60000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            ingest_port: default_ingest_port(),
            relay_port: default_relay_port(),
        }
    }
}

impl ServerConfig {
    fn ip(&self) -> Result<IpAddr, ConfigError> {
        self.address
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::InvalidAddress(self.address.clone()))
    }

    pub fn ingest_addr(&self) -> Result<SocketAddr, ConfigError> {
        Ok(SocketAddr::new(self.ip()?, self.ingest_port))
    }

    pub fn relay_addr(&self) -> Result<SocketAddr, ConfigError> {
        Ok(SocketAddr::new(self.ip()?, self.relay_port))
    }
}

/// Simulated transmitter fleet (test traffic generator)
#[derive(Debug, Clone, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_transmitter_count")]
    pub transmitter_count: usize,
    /// How often each transmitter relocates and reports (milliseconds)
    #[serde(default = "default_report_interval_ms")]
    pub report_interval_ms: u64,
    #[serde(default = "default_max_speed_mps")]
    pub max_speed_mps: f64,
    /// Every Nth transmitter (starting with the first) stops moving; 0 disables
    #[serde(default = "default_broken_every")]
    pub broken_every: usize,
    /// Relocations before a broken transmitter stops moving
    #[serde(default = "default_fail_after_ticks")]
    pub fail_after_ticks: u32,
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default = "default_altitude")]
    pub altitude: f64,
}

fn default_transmitter_count() -> usize {
    5
}

fn default_report_interval_ms() -> u64 {
    300
}

// Consumer drones top out around 17 m/s
fn default_max_speed_mps() -> f64 {
    17.0
}

fn default_broken_every() -> usize {
    5
}

// About five seconds of motion at the default report interval
fn default_fail_after_ticks() -> u32 {
    (5_000 / default_report_interval_ms()) as u32
}

fn default_latitude() -> f64 {
    37.234332396
}

fn default_longitude() -> f64 {
    -115.80666344
}

fn default_altitude() -> f64 {
    25.0
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            transmitter_count: default_transmitter_count(),
            report_interval_ms: default_report_interval_ms(),
            max_speed_mps: default_max_speed_mps(),
            broken_every: default_broken_every(),
            fail_after_ticks: default_fail_after_ticks(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            altitude: default_altitude(),
        }
    }
}

/// Periodic registry status logging
#[derive(Debug, Clone, Deserialize)]
pub struct StatusConfig {
    #[serde(default = "default_status_enabled")]
    pub enabled: bool,
    #[serde(default = "default_status_interval")]
    pub interval_seconds: u64,
    /// Entities that have not moved for this long are flagged stationary
    #[serde(default = "default_stale_after")]
    pub stale_after_seconds: f64,
}

fn default_status_enabled() -> bool {
    true
}

fn default_status_interval() -> u64 {
    5
}

fn default_stale_after() -> f64 {
    10.0
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            enabled: default_status_enabled(),
            interval_seconds: default_status_interval(),
            stale_after_seconds: default_stale_after(),
        }
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    InvalidAddress(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse config file: {}", e),
            ConfigError::InvalidAddress(address) => {
                write!(f, "invalid bind address '{}'", address)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::InvalidAddress(_) => None,
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<TrackerConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&contents).map_err(ConfigError::Parse)
}

impl TrackerConfig {
    /// Build from `SKYTRACK_CONFIG` (if set) plus env var overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = match std::env::var("SKYTRACK_CONFIG") {
            Ok(path) => load_config(&path)?,
            Err(_) => Self::default(),
        };
        cfg.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Apply overrides from a key lookup. Unparseable values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SKYTRACK_ADDRESS") {
            self.server.address = v;
        }
        if let Some(v) = lookup("SKYTRACK_INGEST_PORT") {
            if let Ok(port) = v.parse::<u16>() {
                self.server.ingest_port = port;
            }
        }
        if let Some(v) = lookup("SKYTRACK_RELAY_PORT") {
            if let Ok(port) = v.parse::<u16>() {
                self.server.relay_port = port;
            }
        }
        if let Some(v) = lookup("SKYTRACK_SIMULATE") {
            if let Ok(b) = v.parse::<bool>() {
                self.simulator.enabled = b;
            }
        }
    }
}
