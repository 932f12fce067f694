//! Core data models for the telemetry engine

use serde::{Deserialize, Serialize};

/// One synthetic metrics sample for a monitored node
///
/// `cpu`, `memory` and `disk` are percentages clamped to `[0, 100]`;
/// `load1m` is non-negative. Timestamps are Unix milliseconds and are
/// kept non-decreasing within a history buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
    pub network_in: f64,
    pub network_out: f64,
    pub load1m: f64,
    pub timestamp: i64,
}

impl MetricSample {
    /// Neutral sample used when aggregation is requested for an empty fleet
    pub fn placeholder(timestamp: i64) -> Self {
        Self {
            cpu: 0.0,
            memory: 0.0,
            disk: 0.0,
            network_in: 0.0,
            network_out: 0.0,
            load1m: 0.0,
            timestamp,
        }
    }
}

/// Health tier derived from the fixed classification thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Healthy,
    Warning,
    Error,
}

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeStatus::Healthy => write!(f, "healthy"),
            NodeStatus::Warning => write!(f, "warning"),
            NodeStatus::Error => write!(f, "error"),
        }
    }
}

/// A monitored node: immutable identity plus the latest classified sample
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerNode {
    pub id: String,
    pub name: String,
    pub region: String,
    pub metrics: MetricSample,
    pub status: NodeStatus,
}

/// Lifecycle state of a simulated background task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Queued,
    Running,
    Failed,
    Completed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Queued => write!(f, "queued"),
            TaskStatus::Running => write!(f, "running"),
            TaskStatus::Failed => write!(f, "failed"),
            TaskStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A simulated background task
///
/// Invariant: `progress == 100` implies `status == Completed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub cluster: String,
    pub status: TaskStatus,
    pub progress: f64,
    pub start_time: i64,
}

/// Alert severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Low => write!(f, "low"),
            AlertSeverity::Medium => write!(f, "medium"),
            AlertSeverity::High => write!(f, "high"),
            AlertSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// An alert raised against a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub timestamp: i64,
    pub source: String,
    pub severity: AlertSeverity,
    pub message: String,
}

/// Inclusive timestamp range in Unix milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

impl TimeRange {
    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }
}

/// Fleet-wide health summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall: NodeStatus,
    pub message: String,
}

/// Load distribution verdict across the fleet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadBalance {
    Balanced,
    Skewed,
}

/// Load balance diagnostics with a human-readable message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadBalanceReport {
    pub status: LoadBalance,
    pub message: String,
}

/// Status of the periodic update pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatus {
    pub is_updating: bool,
    pub last_update: i64,
    pub update_interval_ms: u64,
}
