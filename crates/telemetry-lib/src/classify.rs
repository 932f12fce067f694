//! Health classification from fixed thresholds

use crate::models::{MetricSample, NodeStatus};

/// Error tier thresholds (checked first; strictly more severe)
pub const CPU_ERROR_THRESHOLD: f64 = 85.0;
pub const MEMORY_ERROR_THRESHOLD: f64 = 90.0;
pub const LOAD_ERROR_THRESHOLD: f64 = 5.0;

/// Warning tier thresholds
pub const CPU_WARNING_THRESHOLD: f64 = 70.0;
pub const MEMORY_WARNING_THRESHOLD: f64 = 80.0;
pub const LOAD_WARNING_THRESHOLD: f64 = 3.0;

/// Map a sample to its health tier
///
/// Boundaries are exclusive: a sample sitting exactly on a threshold
/// classifies into the lower tier.
pub fn classify(sample: &MetricSample) -> NodeStatus {
    if sample.cpu > CPU_ERROR_THRESHOLD
        || sample.memory > MEMORY_ERROR_THRESHOLD
        || sample.load1m > LOAD_ERROR_THRESHOLD
    {
        NodeStatus::Error
    } else if sample.cpu > CPU_WARNING_THRESHOLD
        || sample.memory > MEMORY_WARNING_THRESHOLD
        || sample.load1m > LOAD_WARNING_THRESHOLD
    {
        NodeStatus::Warning
    } else {
        NodeStatus::Healthy
    }
}
