//! Live vs. historical view state
//!
//! Holds the view mode, the entity/time filters and the playback cursor,
//! and derives the active data source from them. The derivation is a pure
//! function of current state plus the stores and is recomputed on every
//! call; nothing here is cached across a mode switch, which removes the
//! stale-mode failure class entirely. The machine owns the playback store
//! and the current snapshot and never mutates live buffers.

use crate::error::EngineError;
use crate::history::HistoryStore;
use crate::models::{MetricSample, TimeRange};
use crate::snapshot::HistoricalSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Cap on the combined series returned by the active-history derivation
pub const MAX_SERIES_POINTS: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Live,
    Historical,
}

/// State machine over {live, historical} plus the active filters
#[derive(Debug)]
pub struct ViewStateMachine {
    mode: ViewMode,
    selected_node: Option<String>,
    time_range: Option<TimeRange>,
    playback_index: usize,
    playback: HistoryStore,
    snapshot: Option<HistoricalSnapshot>,
}

impl ViewStateMachine {
    pub fn new(capacity: usize) -> Self {
        Self {
            mode: ViewMode::Live,
            selected_node: None,
            time_range: None,
            playback_index: 0,
            playback: HistoryStore::new(capacity),
            snapshot: None,
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn selected_node(&self) -> Option<&str> {
        self.selected_node.as_deref()
    }

    pub fn time_range(&self) -> Option<TimeRange> {
        self.time_range
    }

    pub fn playback_index(&self) -> usize {
        self.playback_index
    }

    pub fn snapshot(&self) -> Option<&HistoricalSnapshot> {
        self.snapshot.as_ref()
    }

    /// Enter historical mode: seed the playback store from the snapshot's
    /// window slices and rewind the playback cursor.
    pub fn enter_historical(
        &mut self,
        snapshot: HistoricalSnapshot,
        slices: HashMap<String, Vec<MetricSample>>,
    ) {
        self.playback.clear();
        for (node_id, slice) in slices {
            self.playback.seed(&node_id, slice);
        }
        self.snapshot = Some(snapshot);
        self.playback_index = 0;
        self.mode = ViewMode::Historical;
    }

    /// Return to live mode, dropping the snapshot and the playback buffers
    pub fn return_to_live(&mut self) {
        self.mode = ViewMode::Live;
        self.playback.clear();
        self.snapshot = None;
        self.playback_index = 0;
    }

    pub fn set_selected_node(&mut self, node_id: Option<String>) {
        self.selected_node = node_id;
    }

    /// Set or clear the time-window filter; a reversed range is rejected
    /// here so it can never silently empty a later query.
    pub fn set_time_range(&mut self, range: Option<TimeRange>) -> Result<(), EngineError> {
        if let Some(range) = range {
            if range.start > range.end {
                return Err(EngineError::InvalidTimeRange {
                    start: range.start,
                    end: range.end,
                });
            }
        }
        self.time_range = range;
        Ok(())
    }

    pub fn set_playback_index(&mut self, index: usize) {
        self.playback_index = index;
    }

    /// Derive the active series from the current state and the given live
    /// store:
    ///
    /// 1. source is the playback store in historical mode, else live;
    /// 2. in historical mode with a nonzero cursor, each buffer is cut to
    ///    its first `playback_index` samples (play-forward reveal);
    /// 3. restricted to the selected node when one is set;
    /// 4. filtered to the inclusive time range when one is set;
    /// 5. capped at the most recent [`MAX_SERIES_POINTS`] samples overall,
    ///    in chronological order.
    pub fn active_history(&self, live: &HistoryStore) -> Vec<MetricSample> {
        let source = match self.mode {
            ViewMode::Historical => &self.playback,
            ViewMode::Live => live,
        };

        let ids = match &self.selected_node {
            Some(id) => vec![id.clone()],
            None => source.ids(),
        };

        let mut combined = Vec::new();
        for id in &ids {
            let mut series = source.get(id, None);
            if self.mode == ViewMode::Historical && self.playback_index > 0 {
                series.truncate(self.playback_index);
            }
            if let Some(range) = &self.time_range {
                series.retain(|s| range.contains(s.timestamp));
            }
            combined.extend(series);
        }

        combined.sort_by_key(|s| s.timestamp);
        if combined.len() > MAX_SERIES_POINTS {
            combined.drain(..combined.len() - MAX_SERIES_POINTS);
        }
        combined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NodeStatus, ServerNode};
    use crate::snapshot::build_snapshot;

    fn sample_at(timestamp: i64, cpu: f64) -> MetricSample {
        MetricSample {
            cpu,
            memory: 50.0,
            disk: 40.0,
            network_in: 100.0,
            network_out: 100.0,
            load1m: 1.0,
            timestamp,
        }
    }

    fn node(id: &str) -> ServerNode {
        ServerNode {
            id: id.to_string(),
            name: id.to_string(),
            region: "us-east-1".to_string(),
            metrics: MetricSample::placeholder(0),
            status: NodeStatus::Healthy,
        }
    }

    fn live_store(node_ids: &[&str], samples_per_node: i64) -> HistoryStore {
        let mut store = HistoryStore::new(300);
        for id in node_ids {
            for i in 0..samples_per_node {
                store.append(id, sample_at(i * 1_000, i as f64));
            }
        }
        store
    }

    fn enter_historical(machine: &mut ViewStateMachine, live: &HistoryStore, node_ids: &[&str]) {
        let nodes: Vec<ServerNode> = node_ids.iter().map(|id| node(id)).collect();
        // The 15-minute window ending at t=50s covers every test sample
        let (snapshot, slices) = build_snapshot(&nodes, live, 15, 15, 50_000);
        machine.enter_historical(snapshot, slices);
    }

    #[test]
    fn test_live_mode_reads_live_store() {
        let live = live_store(&["a"], 5);
        let machine = ViewStateMachine::new(300);

        let series = machine.active_history(&live);
        assert_eq!(series.len(), 5);
    }

    #[test]
    fn test_playback_cursor_truncates_per_node() {
        let live = live_store(&["a", "b"], 50);
        let mut machine = ViewStateMachine::new(300);
        enter_historical(&mut machine, &live, &["a", "b"]);

        machine.set_playback_index(10);
        let series = machine.active_history(&live);
        // At most 10 per node
        assert_eq!(series.len(), 20);

        // Revealed data grows monotonically with the cursor
        machine.set_playback_index(20);
        assert_eq!(machine.active_history(&live).len(), 40);
    }

    #[test]
    fn test_playback_index_zero_reveals_everything() {
        let live = live_store(&["a"], 30);
        let mut machine = ViewStateMachine::new(300);
        enter_historical(&mut machine, &live, &["a"]);

        assert_eq!(machine.active_history(&live).len(), 30);
    }

    #[test]
    fn test_selected_node_restricts_output() {
        let live = live_store(&["a", "b"], 5);
        let mut machine = ViewStateMachine::new(300);

        machine.set_selected_node(Some("a".to_string()));
        assert_eq!(machine.active_history(&live).len(), 5);

        machine.set_selected_node(Some("missing".to_string()));
        assert!(machine.active_history(&live).is_empty());
    }

    #[test]
    fn test_time_range_filters_inclusively() {
        let live = live_store(&["a"], 10);
        let mut machine = ViewStateMachine::new(300);

        machine
            .set_time_range(Some(TimeRange {
                start: 2_000,
                end: 4_000,
            }))
            .unwrap();
        let series = machine.active_history(&live);
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn test_reversed_time_range_rejected_at_setter() {
        let mut machine = ViewStateMachine::new(300);
        let err = machine
            .set_time_range(Some(TimeRange {
                start: 5_000,
                end: 1_000,
            }))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidTimeRange { .. }));
        // State unchanged
        assert!(machine.time_range().is_none());
    }

    #[test]
    fn test_combined_output_capped_at_most_recent() {
        let mut live = HistoryStore::new(300);
        for id in ["a", "b"] {
            for i in 0..200 {
                live.append(id, sample_at(i * 1_000, 0.0));
            }
        }
        let machine = ViewStateMachine::new(300);

        let series = machine.active_history(&live);
        assert_eq!(series.len(), MAX_SERIES_POINTS);
        // The most recent samples survive the cap
        assert_eq!(series.last().unwrap().timestamp, 199_000);
        // Chronological order is preserved
        assert!(series.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_mode_switch_never_mutates_live_store() {
        let live = live_store(&["a"], 40);
        let before = live.get("a", None);

        let mut machine = ViewStateMachine::new(300);
        enter_historical(&mut machine, &live, &["a"]);
        machine.set_playback_index(5);
        let _ = machine.active_history(&live);
        machine.return_to_live();

        assert_eq!(live.get("a", None), before);
    }

    #[test]
    fn test_return_to_live_discards_playback_and_snapshot() {
        let live = live_store(&["a"], 10);
        let mut machine = ViewStateMachine::new(300);
        enter_historical(&mut machine, &live, &["a"]);
        machine.set_playback_index(3);

        machine.return_to_live();
        assert_eq!(machine.mode(), ViewMode::Live);
        assert!(machine.snapshot().is_none());
        assert_eq!(machine.playback_index(), 0);
        // Live source is active again
        assert_eq!(machine.active_history(&live).len(), 10);
    }

    #[test]
    fn test_derivation_recomputed_after_mode_switch() {
        // The primary failure class: output cached under one mode leaking
        // into the other. Drive the same machine through both modes and
        // check each read reflects the current mode's source.
        let live = live_store(&["a"], 50);
        let mut machine = ViewStateMachine::new(300);

        let live_len = machine.active_history(&live).len();
        assert_eq!(live_len, 50);

        enter_historical(&mut machine, &live, &["a"]);
        machine.set_playback_index(7);
        assert_eq!(machine.active_history(&live).len(), 7);

        machine.return_to_live();
        assert_eq!(machine.active_history(&live).len(), live_len);
    }
}
