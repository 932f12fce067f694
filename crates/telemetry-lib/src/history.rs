//! Bounded per-node sample history
//!
//! Each node owns one FIFO ring buffer of samples capped at a shared
//! capacity. Two independent store instances exist at runtime (live and
//! playback); they never share buffer identity, so copying between them
//! is always by value.

use crate::models::{MetricSample, TimeRange};
use std::collections::HashMap;
use std::collections::VecDeque;

/// Ring-buffer store of recent samples, keyed by node id
#[derive(Debug, Clone)]
pub struct HistoryStore {
    buffers: HashMap<String, VecDeque<MetricSample>>,
    capacity: usize,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffers: HashMap::new(),
            capacity,
        }
    }

    /// Append one sample to a node's buffer, evicting the oldest entry
    /// when the buffer is full.
    ///
    /// Timestamps are kept non-decreasing within a buffer: a sample dated
    /// before the current tail is clamped to the tail's timestamp.
    pub fn append(&mut self, node_id: &str, mut sample: MetricSample) {
        let buffer = self
            .buffers
            .entry(node_id.to_string())
            .or_insert_with(|| VecDeque::with_capacity(self.capacity + 1));

        if let Some(last) = buffer.back() {
            if sample.timestamp < last.timestamp {
                sample.timestamp = last.timestamp;
            }
        }

        buffer.push_back(sample);
        if buffer.len() > self.capacity {
            buffer.pop_front();
        }
    }

    /// Read a node's buffer in chronological order, optionally restricted
    /// to an inclusive timestamp range. Unknown ids yield an empty vec.
    pub fn get(&self, node_id: &str, range: Option<&TimeRange>) -> Vec<MetricSample> {
        let Some(buffer) = self.buffers.get(node_id) else {
            return Vec::new();
        };

        match range {
            None => buffer.iter().cloned().collect(),
            Some(range) => buffer
                .iter()
                .filter(|s| range.contains(s.timestamp))
                .cloned()
                .collect(),
        }
    }

    /// Replace a node's buffer wholesale (playback seeding); keeps the
    /// newest `capacity` samples when given more.
    pub fn seed(&mut self, node_id: &str, samples: Vec<MetricSample>) {
        let mut buffer: VecDeque<MetricSample> = samples.into();
        while buffer.len() > self.capacity {
            buffer.pop_front();
        }
        self.buffers.insert(node_id.to_string(), buffer);
    }

    /// Drop all buffers
    pub fn clear(&mut self) {
        self.buffers.clear();
    }

    /// Node ids with a buffer, sorted for deterministic iteration
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.buffers.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of samples held for one node
    pub fn len(&self, node_id: &str) -> usize {
        self.buffers.get(node_id).map(VecDeque::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
