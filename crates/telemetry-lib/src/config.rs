//! Engine configuration

use crate::ledger::TransitionRates;
use std::time::Duration;

/// Default interval between update ticks
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1500);

/// Default per-node history capacity (5 minutes at the default interval
/// plus headroom; matches the dashboard chart window)
pub const DEFAULT_HISTORY_CAPACITY: usize = 300;

/// Default cap on the alert ledger
pub const DEFAULT_ALERT_CAP: usize = 50;

/// Default upper bound on historical look-back windows
pub const DEFAULT_LOOKBACK_CAP_MINUTES: u64 = 15;

/// Default number of simulated nodes
pub const DEFAULT_NODE_COUNT: usize = 8;

/// Fixed fleet naming: additional nodes beyond this table get generated names
pub const NODE_NAMES: [&str; 8] = [
    "web-server-01",
    "web-server-02",
    "db-primary",
    "db-replica",
    "cache-node-01",
    "cache-node-02",
    "api-gateway",
    "load-balancer",
];

/// Regions cycled over the fleet
pub const NODE_REGIONS: [&str; 4] = ["us-east-1", "us-west-2", "eu-west-1", "ap-southeast-1"];

/// Seed task names for the task ledger
pub const TASK_NAMES: [&str; 8] = [
    "Database Backup",
    "Log Rotation",
    "Cache Cleanup",
    "Security Scan",
    "Performance Analysis",
    "Data Migration",
    "System Update",
    "Health Check",
];

/// Configuration for the telemetry engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Interval between update ticks
    pub tick_interval: Duration,
    /// Maximum samples retained per node history buffer
    pub history_capacity: usize,
    /// Maximum entries in the alert ledger
    pub alert_cap: usize,
    /// Upper bound on historical snapshot look-back windows
    pub lookback_cap_minutes: u64,
    /// Number of simulated nodes (fixed for the engine's lifetime,
    /// reconfigurable only through a full refresh)
    pub node_count: usize,
    /// Probabilistic transition rates for the task and alert ledgers
    pub rates: TransitionRates,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            alert_cap: DEFAULT_ALERT_CAP,
            lookback_cap_minutes: DEFAULT_LOOKBACK_CAP_MINUTES,
            node_count: DEFAULT_NODE_COUNT,
            rates: TransitionRates::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_default() {
        let config = EngineConfig::default();
        assert_eq!(config.tick_interval, Duration::from_millis(1500));
        assert_eq!(config.history_capacity, 300);
        assert_eq!(config.alert_cap, 50);
        assert_eq!(config.lookback_cap_minutes, 15);
        assert_eq!(config.node_count, NODE_NAMES.len());
    }
}
