use anyhow::{Context, Result};
use skytrack::config::TrackerConfig;
use skytrack::server::TrackingServer;
use skytrack::simulator::Fleet;
use skytrack::state::{run_status_reporter, Registry};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skytrack=info".into()),
        )
        .init();

    info!("Skytrack starting...");

    let config = TrackerConfig::from_env().context("Failed to load configuration")?;
    info!(
        address = %config.server.address,
        ingest_port = config.server.ingest_port,
        relay_port = config.server.relay_port,
        simulate = config.simulator.enabled,
        "Configuration loaded"
    );

    let registry = Arc::new(Registry::new());
    let server = TrackingServer::new(
        &config.server,
        Arc::clone(&registry),
        config.status.stale_after_seconds,
    )
    .context("Invalid server configuration")?;

    // One endpoint failing to bind does not take the other down
    if let Err(e) = server.start().await {
        warn!(error = %e, "Server started with errors");
    }

    let status_handle = config.status.enabled.then(|| {
        tokio::spawn(run_status_reporter(
            Arc::clone(&registry),
            config.status.interval_seconds,
            config.status.stale_after_seconds,
        ))
    });

    let mut fleet = None;
    if config.simulator.enabled {
        match server.ingest_addr().await {
            Some(target) => match Fleet::from_config(&config.simulator, target).await {
                Ok(simulated) => {
                    simulated.fly();
                    fleet = Some(simulated);
                }
                Err(e) => error!(error = %e, "Failed to start simulated fleet"),
            },
            None => warn!("Ingest listener not running, simulator disabled"),
        }
    }

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c signal")?;
    info!("Shutdown signal received");

    if let Some(fleet) = &fleet {
        fleet.halt();
    }
    if let Some(handle) = status_handle {
        handle.abort();
    }
    server.stop().await;

    info!(entities = registry.len(), "Skytrack stopped");

    Ok(())
}
