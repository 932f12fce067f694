//! Update scheduling
//!
//! Drives one engine tick per interval, honoring the shared run/pause
//! flag. A failed tick is logged and counted but never stops the loop;
//! stopping the scheduler cancels the timer while preserving all buffers
//! and the last update time.

use crate::engine::TelemetryEngine;
use crate::observability::EngineMetrics;
use crate::state::SharedSystemState;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

pub struct UpdateScheduler {
    engine: Arc<RwLock<TelemetryEngine>>,
    system: SharedSystemState,
    tick_interval: Duration,
    metrics: EngineMetrics,
    handle: Option<JoinHandle<()>>,
}

impl UpdateScheduler {
    pub fn new(
        engine: Arc<RwLock<TelemetryEngine>>,
        system: SharedSystemState,
        tick_interval: Duration,
    ) -> Self {
        Self {
            engine,
            system,
            tick_interval,
            metrics: EngineMetrics::new(),
            handle: None,
        }
    }

    /// Start ticking. Restarting replaces any existing timer; two timers
    /// are never stacked.
    pub fn start(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }

        let engine = Arc::clone(&self.engine);
        let system = Arc::clone(&self.system);
        let metrics = self.metrics.clone();
        let tick_interval = self.tick_interval;

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval(tick_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut tick_count = 0u64;

            loop {
                ticker.tick().await;

                let running = system.read().map(|s| s.running).unwrap_or(false);
                if !running {
                    trace!("updates paused, skipping tick");
                    continue;
                }

                let start = Instant::now();
                let mut engine = engine.write().await;
                match engine.tick() {
                    Ok(()) => {
                        metrics.observe_tick_latency(start.elapsed().as_secs_f64());
                        metrics.inc_ticks_completed();
                        metrics.set_nodes_monitored(engine.node_count() as i64);
                        metrics.set_alerts_active(engine.alert_count() as i64);
                        tick_count += 1;
                        // Every minute at the default interval
                        if tick_count % 40 == 0 {
                            debug!(
                                ticks = tick_count,
                                elapsed_ms = start.elapsed().as_millis() as u64,
                                "update cycle checkpoint"
                            );
                        }
                    }
                    Err(e) => {
                        metrics.inc_tick_errors();
                        warn!(error = %e, "update tick failed, continuing");
                    }
                }
            }
        }));

        info!(
            interval_ms = self.tick_interval.as_millis() as u64,
            "update scheduler started"
        );
    }

    /// Cancel the timer; buffers and the last update time are preserved,
    /// so a later `start()` resumes with no data loss.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("update scheduler stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for UpdateScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
