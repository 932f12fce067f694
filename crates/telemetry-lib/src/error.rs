//! Engine error types
//!
//! Tick-level failures travel as `anyhow::Error` and are caught at the
//! scheduler; only caller mistakes surface as typed errors here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Rejected at the setter so a bad range never silently produces an
    /// empty filtered result later.
    #[error("invalid time range: start {start} is after end {end}")]
    InvalidTimeRange { start: i64, end: i64 },

    /// Historical mode cannot be entered without a look-back window.
    #[error("historical mode requires a look-back window")]
    MissingLookback,
}
