//! Historical snapshot construction
//!
//! A snapshot freezes the fleet and a per-minute aggregated series for a
//! requested look-back window, reading only the live store. The builder
//! also yields the per-node window slices used to seed the playback store;
//! everything is copied by value so the live buffers stay untouched.

use crate::history::HistoryStore;
use crate::models::{MetricSample, ServerNode, TimeRange};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

const MS_PER_MINUTE: i64 = 60_000;

/// Frozen fleet state plus an aggregated series over the look-back window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalSnapshot {
    pub nodes: Vec<ServerNode>,
    pub aggregated_series: Vec<MetricSample>,
    pub time_range: TimeRange,
}

/// Build a snapshot over the trailing `lookback_minutes`, clamped to
/// `cap_minutes`. Rebuilt unconditionally on every call; there is no
/// caching across snapshots.
pub fn build_snapshot(
    nodes: &[ServerNode],
    live: &HistoryStore,
    lookback_minutes: u64,
    cap_minutes: u64,
    now: i64,
) -> (HistoricalSnapshot, HashMap<String, Vec<MetricSample>>) {
    let lookback = if lookback_minutes > cap_minutes {
        debug!(
            requested = lookback_minutes,
            cap = cap_minutes,
            "look-back window clamped to cap"
        );
        cap_minutes
    } else {
        lookback_minutes
    };

    let time_range = TimeRange {
        start: now - lookback as i64 * MS_PER_MINUTE,
        end: now,
    };

    let mut slices = HashMap::with_capacity(nodes.len());
    for node in nodes {
        slices.insert(node.id.clone(), live.get(&node.id, Some(&time_range)));
    }

    let snapshot = HistoricalSnapshot {
        nodes: nodes.to_vec(),
        aggregated_series: aggregate_by_minute(&slices),
        time_range,
    };

    (snapshot, slices)
}

/// Mean of each metric field per minute bucket, across all nodes
fn aggregate_by_minute(slices: &HashMap<String, Vec<MetricSample>>) -> Vec<MetricSample> {
    let mut buckets: BTreeMap<i64, (MetricSample, usize)> = BTreeMap::new();

    for slice in slices.values() {
        for sample in slice {
            let minute = sample.timestamp / MS_PER_MINUTE;
            let (sum, count) = buckets
                .entry(minute)
                .or_insert_with(|| (MetricSample::placeholder(minute * MS_PER_MINUTE), 0));
            sum.cpu += sample.cpu;
            sum.memory += sample.memory;
            sum.disk += sample.disk;
            sum.network_in += sample.network_in;
            sum.network_out += sample.network_out;
            sum.load1m += sample.load1m;
            *count += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(minute, (sum, count))| {
            let n = count as f64;
            MetricSample {
                cpu: sum.cpu / n,
                memory: sum.memory / n,
                disk: sum.disk / n,
                network_in: sum.network_in / n,
                network_out: sum.network_out / n,
                load1m: sum.load1m / n,
                timestamp: minute * MS_PER_MINUTE,
            }
        })
        .collect()
}
