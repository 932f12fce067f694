//! Process-wide view preferences shared with the dashboard surface
//!
//! The run/pause flag and the preferred metric are owned by the embedding
//! process (the dashboard binary); the engine and scheduler only read them.
//! One instance is created at startup and injected everywhere it is needed,
//! rather than living in a hidden global.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Metric highlighted by the dashboard charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Cpu,
    Memory,
    Disk,
}

/// Run/pause flag plus metric-selection preference
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SystemState {
    pub running: bool,
    pub selected_metric: MetricKind,
}

impl Default for SystemState {
    fn default() -> Self {
        Self {
            running: true,
            selected_metric: MetricKind::Cpu,
        }
    }
}

impl SystemState {
    /// Create the single process-scoped shared instance
    pub fn shared() -> SharedSystemState {
        Arc::new(RwLock::new(SystemState::default()))
    }
}

/// Handle to the process-scoped state, cloned into the scheduler and engine
pub type SharedSystemState = Arc<RwLock<SystemState>>;
