//! Dashboard server configuration

use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;
use telemetry_lib::EngineConfig;

/// Dashboard configuration, read from `DASHBOARD_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// API server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Update tick interval in milliseconds
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Number of simulated nodes
    #[serde(default = "default_node_count")]
    pub node_count: usize,
}

fn default_port() -> u16 {
    8080
}

fn default_tick_interval_ms() -> u64 {
    1500
}

fn default_node_count() -> usize {
    8
}

impl DashboardConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("DASHBOARD"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_else(|_| DashboardConfig {
            port: default_port(),
            tick_interval_ms: default_tick_interval_ms(),
            node_count: default_node_count(),
        }))
    }

    /// Engine configuration derived from the server settings
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            node_count: self.node_count,
            ..EngineConfig::default()
        }
    }
}
