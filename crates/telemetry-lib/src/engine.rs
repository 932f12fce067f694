//! Telemetry engine facade
//!
//! Owns the fleet, the live history, the ledgers and the view state, and
//! exposes the synchronous query surface consumed by the dashboard API.
//! All mutation happens inside `tick()` and the explicit setters; ticks
//! run to completion before the next one is scheduled, so readers never
//! observe a half-updated store.

use crate::aggregate;
use crate::classify::classify;
use crate::config::{EngineConfig, NODE_NAMES, NODE_REGIONS, TASK_NAMES};
use crate::error::EngineError;
use crate::history::HistoryStore;
use crate::ledger::{AlertLedger, TaskLedger, ALERT_CATALOG};
use crate::models::{
    Alert, AlertSeverity, HealthReport, LoadBalanceReport, MetricSample, ServerNode, Task,
    TaskStatus, TimeRange, UpdateStatus,
};
use crate::sampler::{Sampler, SyntheticSampler};
use crate::snapshot::build_snapshot;
use crate::state::SharedSystemState;
use crate::view::{ViewMode, ViewStateMachine};
use anyhow::{Context, Result};
use chrono::Utc;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

pub struct TelemetryEngine {
    config: EngineConfig,
    sampler: Box<dyn Sampler>,
    rng: SmallRng,
    nodes: Vec<ServerNode>,
    live: HistoryStore,
    tasks: TaskLedger,
    alerts: AlertLedger,
    view: ViewStateMachine,
    system: SharedSystemState,
    last_update: i64,
}

impl TelemetryEngine {
    /// Engine with entropy-seeded generators
    pub fn new(config: EngineConfig, system: SharedSystemState) -> Self {
        Self::build(
            config,
            system,
            Box::new(SyntheticSampler::new()),
            SmallRng::from_entropy(),
        )
    }

    /// Fully deterministic engine for tests
    pub fn seeded(config: EngineConfig, system: SharedSystemState, seed: u64) -> Self {
        Self::build(
            config,
            system,
            Box::new(SyntheticSampler::with_seed(seed)),
            SmallRng::seed_from_u64(seed),
        )
    }

    fn build(
        config: EngineConfig,
        system: SharedSystemState,
        sampler: Box<dyn Sampler>,
        rng: SmallRng,
    ) -> Self {
        let capacity = config.history_capacity;
        let mut engine = Self {
            sampler,
            rng,
            nodes: Vec::new(),
            live: HistoryStore::new(capacity),
            tasks: TaskLedger::new(Vec::new(), config.rates),
            alerts: AlertLedger::new(config.alert_cap, config.rates.alert_probability),
            view: ViewStateMachine::new(capacity),
            system,
            last_update: 0,
            config,
        };
        engine.refresh_data();
        engine
    }

    /// Replace the sample source (tests inject failing or scripted ones)
    pub fn set_sampler(&mut self, sampler: Box<dyn Sampler>) {
        self.sampler = sampler;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn view(&self) -> &ViewStateMachine {
        &self.view
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.len()
    }

    /// Run one update: sample, classify and append for every node, then
    /// advance the ledgers. A failure leaves already-updated nodes in
    /// place and is reported to the scheduler, which logs and keeps going.
    pub fn tick(&mut self) -> Result<()> {
        let now = Utc::now().timestamp_millis();

        for node in &mut self.nodes {
            let sample = self
                .sampler
                .sample(Some(&node.metrics))
                .with_context(|| format!("sampling {}", node.id))?;
            node.status = classify(&sample);
            node.metrics = sample.clone();
            self.live.append(&node.id, sample);
        }

        self.tasks.tick(&mut self.rng, now);
        self.alerts.tick(&mut self.rng, &self.nodes, now);
        self.last_update = now;
        Ok(())
    }

    /// Full reset: regenerate nodes, tasks, alerts and pre-filled history.
    ///
    /// The replacement state is built completely before anything is swapped
    /// in, so no reader can observe some buffers cleared and others not.
    pub fn refresh_data(&mut self) {
        let now = Utc::now().timestamp_millis();
        let interval_ms = self.config.tick_interval.as_millis() as i64;
        let capacity = self.config.history_capacity;

        let mut nodes = Vec::with_capacity(self.config.node_count);
        let mut live = HistoryStore::new(capacity);

        for index in 0..self.config.node_count {
            let id = format!("server-{}", index + 1);
            let name = NODE_NAMES
                .get(index)
                .map(|n| n.to_string())
                .unwrap_or_else(|| format!("node-{:02}", index + 1));
            let region = NODE_REGIONS[index % NODE_REGIONS.len()].to_string();

            // Pre-fill history so look-back windows have data immediately,
            // back-dating one interval per step up to the present.
            let mut previous: Option<MetricSample> = None;
            for step in 0..capacity {
                let timestamp = now - (capacity - 1 - step) as i64 * interval_ms;
                let mut sample = match self.sampler.sample(previous.as_ref()) {
                    Ok(sample) => sample,
                    Err(e) => {
                        debug!(node = %id, error = %e, "sampler failed during prefill");
                        MetricSample::placeholder(timestamp)
                    }
                };
                sample.timestamp = timestamp;
                live.append(&id, sample.clone());
                previous = Some(sample);
            }

            let latest = previous.unwrap_or_else(|| MetricSample::placeholder(now));
            let status = classify(&latest);
            nodes.push(ServerNode {
                id,
                name,
                region,
                metrics: latest,
                status,
            });
        }

        let mut tasks = Vec::with_capacity(TASK_NAMES.len());
        for (index, name) in TASK_NAMES.iter().enumerate() {
            let status = match self.rng.gen_range(0..4) {
                0 => TaskStatus::Queued,
                1 => TaskStatus::Running,
                2 => TaskStatus::Failed,
                _ => TaskStatus::Completed,
            };
            let progress = if status == TaskStatus::Completed {
                100.0
            } else {
                self.rng.gen_range(0.0..100.0)
            };
            tasks.push(Task {
                id: format!("task-{}", index + 1),
                name: name.to_string(),
                cluster: format!("cluster-{}", index % 3 + 1),
                status,
                progress,
                start_time: now - self.rng.gen_range(0..3_600_000i64),
            });
        }

        let mut alerts = AlertLedger::new(self.config.alert_cap, self.config.rates.alert_probability);
        if !nodes.is_empty() {
            for (index, message) in ALERT_CATALOG.iter().take(5).enumerate() {
                let node = &nodes[self.rng.gen_range(0..nodes.len())];
                let severity = match index % 4 {
                    0 => AlertSeverity::Critical,
                    1 => AlertSeverity::High,
                    2 => AlertSeverity::Medium,
                    _ => AlertSeverity::Low,
                };
                let timestamp = now - self.rng.gen_range(0..1_800_000i64);
                alerts.raise(&node.name, severity, message, timestamp);
            }
        }

        self.nodes = nodes;
        self.live = live;
        self.tasks = TaskLedger::new(tasks, self.config.rates);
        self.alerts = alerts;
        self.view = ViewStateMachine::new(capacity);
        self.last_update = now;

        info!(nodes = self.nodes.len(), "telemetry data refreshed");
    }

    /// The fleet with each node's latest classified sample
    pub fn servers(&self) -> Vec<ServerNode> {
        self.nodes.clone()
    }

    /// One node's history, optionally restricted to an inclusive range;
    /// unknown ids yield an empty series.
    pub fn server_history(&self, node_id: &str, range: Option<TimeRange>) -> Vec<MetricSample> {
        self.live.get(node_id, range.as_ref())
    }

    /// Fleet-wide mean sample; a placeholder when the fleet is empty
    pub fn aggregated_metrics(&self) -> MetricSample {
        let now = Utc::now().timestamp_millis();
        aggregate::fleet_average(&self.nodes, now)
            .unwrap_or_else(|| MetricSample::placeholder(now))
    }

    pub fn health_status(&self) -> HealthReport {
        aggregate::fleet_health(&self.nodes)
    }

    pub fn load_balance_status(&self) -> LoadBalanceReport {
        aggregate::load_balance(&self.nodes)
    }

    pub fn tasks(&self, filter: Option<&str>) -> Vec<Task> {
        self.tasks.tasks(filter)
    }

    /// All alerts, newest first
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.alerts()
    }

    /// Freeze the trailing window and enter historical playback
    pub fn create_historical_snapshot(&mut self, lookback_minutes: u64) {
        let now = Utc::now().timestamp_millis();
        let (snapshot, slices) = build_snapshot(
            &self.nodes,
            &self.live,
            lookback_minutes,
            self.config.lookback_cap_minutes,
            now,
        );
        info!(
            lookback_minutes,
            window_start = snapshot.time_range.start,
            "historical snapshot created"
        );
        self.view.enter_historical(snapshot, slices);
    }

    /// Switch view mode; entering historical requires a look-back window
    pub fn set_view_mode(
        &mut self,
        mode: ViewMode,
        lookback_minutes: Option<u64>,
    ) -> Result<(), EngineError> {
        match mode {
            ViewMode::Live => {
                self.view.return_to_live();
                Ok(())
            }
            ViewMode::Historical => {
                let lookback = lookback_minutes.ok_or(EngineError::MissingLookback)?;
                self.create_historical_snapshot(lookback);
                Ok(())
            }
        }
    }

    pub fn set_selected_node(&mut self, node_id: Option<String>) {
        self.view.set_selected_node(node_id);
    }

    pub fn set_time_range(&mut self, range: Option<TimeRange>) -> Result<(), EngineError> {
        self.view.set_time_range(range)
    }

    pub fn set_playback_index(&mut self, index: usize) {
        self.view.set_playback_index(index);
    }

    /// Apply the full view-state derivation over the active source
    pub fn filtered_time_series(&self) -> Vec<MetricSample> {
        self.view.active_history(&self.live)
    }

    pub fn update_status(&self) -> UpdateStatus {
        let running = self.system.read().map(|s| s.running).unwrap_or(false);
        UpdateStatus {
            is_updating: running,
            last_update: self.last_update,
            update_interval_ms: self.config.tick_interval.as_millis() as u64,
        }
    }
}
