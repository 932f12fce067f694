//! Telemetry engine for the fleet dashboard
//!
//! This crate provides the core functionality for:
//! - Synthetic metric sampling per simulated node
//! - Health classification from fixed thresholds
//! - Bounded rolling history with live and playback stores
//! - Fleet aggregation and load-imbalance diagnostics
//! - Task and alert ledgers with randomized transitions
//! - Live vs. historical view-mode state and filtering
//! - Tick scheduling with failure tolerance

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod ledger;
pub mod models;
pub mod observability;
pub mod sampler;
pub mod scheduler;
pub mod snapshot;
pub mod state;
pub mod view;

pub use config::EngineConfig;
pub use engine::TelemetryEngine;
pub use error::EngineError;
pub use models::*;
pub use observability::EngineMetrics;
pub use scheduler::UpdateScheduler;
pub use snapshot::HistoricalSnapshot;
pub use state::{MetricKind, SharedSystemState, SystemState};
pub use view::ViewMode;
