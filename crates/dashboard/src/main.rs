//! Fleet dashboard - simulated telemetry backend
//!
//! This binary simulates a monitored fleet and serves its rolling
//! telemetry, task and alert state over an HTTP API for the live
//! dashboard UI.

use anyhow::Result;
use std::sync::Arc;
use telemetry_lib::{SystemState, TelemetryEngine, UpdateScheduler};
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting fleet-dashboard");

    // Load configuration
    let config = config::DashboardConfig::load()?;
    info!(
        port = config.port,
        nodes = config.node_count,
        "Dashboard configured"
    );

    // One process-scoped state instance, injected into scheduler and engine
    let system = SystemState::shared();

    let engine_config = config.engine_config();
    let tick_interval = engine_config.tick_interval;
    let engine = Arc::new(RwLock::new(TelemetryEngine::new(
        engine_config,
        system.clone(),
    )));

    // Start the update pipeline
    let mut scheduler = UpdateScheduler::new(engine.clone(), system.clone(), tick_interval);
    scheduler.start();

    // Start the API server
    let state = Arc::new(api::AppState::new(engine, system));
    let _api_server = tokio::spawn(api::serve(config.port, state));

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    scheduler.stop();
    info!("Shutting down");

    Ok(())
}
