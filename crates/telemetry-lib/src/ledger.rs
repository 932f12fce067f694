//! Task and alert ledgers
//!
//! Bounded collections with randomized state transitions, decoupled from
//! the metric pipeline but driven by the same tick. All transition
//! probabilities are named parameters so tests can force deterministic
//! sequences.

use crate::models::{Alert, AlertSeverity, ServerNode, Task, TaskStatus};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

/// Message catalog for synthetic alerts
pub const ALERT_CATALOG: [&str; 8] = [
    "High CPU usage detected",
    "Memory usage above threshold",
    "Disk space running low",
    "Network latency increased",
    "Service response time degraded",
    "Database connection pool exhausted",
    "Cache miss rate high",
    "Load balancer health check failed",
];

const SEVERITIES: [AlertSeverity; 4] = [
    AlertSeverity::Low,
    AlertSeverity::Medium,
    AlertSeverity::High,
    AlertSeverity::Critical,
];

/// Per-tick transition probabilities and step sizes
#[derive(Debug, Clone, Copy)]
pub struct TransitionRates {
    /// Probability that a queued task starts running
    pub queued_to_running: f64,
    /// Probability that a completed task re-queues (recurring jobs)
    pub completed_requeue: f64,
    /// Probability of emitting one new alert
    pub alert_probability: f64,
    /// Upper bound on per-tick progress advancement, exclusive
    pub max_progress_step: f64,
}

impl Default for TransitionRates {
    fn default() -> Self {
        Self {
            queued_to_running: 0.1,
            completed_requeue: 0.05,
            alert_probability: 0.02,
            max_progress_step: 5.0,
        }
    }
}

/// Bounded collection of simulated background tasks
#[derive(Debug, Clone)]
pub struct TaskLedger {
    tasks: Vec<Task>,
    rates: TransitionRates,
}

impl TaskLedger {
    pub fn new(tasks: Vec<Task>, rates: TransitionRates) -> Self {
        Self { tasks, rates }
    }

    /// Advance every task one tick
    pub fn tick<R: Rng>(&mut self, rng: &mut R, now: i64) {
        for task in &mut self.tasks {
            match task.status {
                TaskStatus::Running => {
                    task.progress =
                        (task.progress + rng.gen_range(0.0..self.rates.max_progress_step)).min(100.0);
                    if task.progress >= 100.0 {
                        task.progress = 100.0;
                        task.status = TaskStatus::Completed;
                    }
                }
                TaskStatus::Queued => {
                    if rng.gen_bool(self.rates.queued_to_running) {
                        task.status = TaskStatus::Running;
                    }
                }
                TaskStatus::Completed => {
                    if rng.gen_bool(self.rates.completed_requeue) {
                        task.status = TaskStatus::Queued;
                        task.progress = 0.0;
                        task.start_time = now;
                    }
                }
                TaskStatus::Failed => {}
            }
        }
    }

    /// Tasks matching a case-insensitive substring filter over
    /// name, cluster and status; all tasks when no filter is given.
    pub fn tasks(&self, filter: Option<&str>) -> Vec<Task> {
        match filter {
            None => self.tasks.clone(),
            Some(filter) => {
                let needle = filter.to_lowercase();
                self.tasks
                    .iter()
                    .filter(|t| {
                        t.name.to_lowercase().contains(&needle)
                            || t.cluster.to_lowercase().contains(&needle)
                            || t.status.to_string().contains(&needle)
                    })
                    .cloned()
                    .collect()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Newest-first alert ledger capped by tail truncation
#[derive(Debug, Clone)]
pub struct AlertLedger {
    alerts: VecDeque<Alert>,
    cap: usize,
    alert_probability: f64,
    next_id: u64,
}

impl AlertLedger {
    pub fn new(cap: usize, alert_probability: f64) -> Self {
        Self {
            alerts: VecDeque::new(),
            cap,
            alert_probability,
            next_id: 1,
        }
    }

    /// Maybe emit one alert for a random node this tick
    pub fn tick<R: Rng>(&mut self, rng: &mut R, nodes: &[ServerNode], now: i64) {
        if nodes.is_empty() || !rng.gen_bool(self.alert_probability) {
            return;
        }

        let node = &nodes[rng.gen_range(0..nodes.len())];
        let severity = *SEVERITIES.choose(rng).unwrap_or(&AlertSeverity::Medium);
        let message = ALERT_CATALOG
            .choose(rng)
            .copied()
            .unwrap_or(ALERT_CATALOG[0]);

        self.raise(&node.name, severity, message, now);
    }

    /// Insert an alert at the front and truncate from the tail
    pub fn raise(&mut self, source: &str, severity: AlertSeverity, message: &str, timestamp: i64) {
        let alert = Alert {
            id: format!("alert-{}", self.next_id),
            timestamp,
            source: source.to_string(),
            severity,
            message: message.to_string(),
        };
        self.next_id += 1;

        self.alerts.push_front(alert);
        while self.alerts.len() > self.cap {
            self.alerts.pop_back();
        }
    }

    /// All alerts, newest first
    pub fn alerts(&self) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = self.alerts.iter().cloned().collect();
        alerts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        alerts
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetricSample;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn task(id: &str, status: TaskStatus, progress: f64) -> Task {
        Task {
            id: id.to_string(),
            name: format!("Task {}", id),
            cluster: "cluster-1".to_string(),
            status,
            progress,
            start_time: 0,
        }
    }

    fn node(name: &str) -> ServerNode {
        ServerNode {
            id: name.to_string(),
            name: name.to_string(),
            region: "us-east-1".to_string(),
            metrics: MetricSample::placeholder(0),
            status: crate::models::NodeStatus::Healthy,
        }
    }

    fn forced(p: f64) -> TransitionRates {
        TransitionRates {
            queued_to_running: p,
            completed_requeue: p,
            alert_probability: p,
            max_progress_step: 5.0,
        }
    }

    #[test]
    fn test_running_task_progress_caps_at_hundred() {
        let mut rng = SmallRng::seed_from_u64(1);
        let rates = TransitionRates {
            completed_requeue: 0.0,
            ..TransitionRates::default()
        };
        let mut ledger = TaskLedger::new(vec![task("t1", TaskStatus::Running, 98.0)], rates);

        // Enough ticks to cross 100 with steps drawn from [0, 5)
        for _ in 0..50 {
            ledger.tick(&mut rng, 0);
        }

        let tasks = ledger.tasks(None);
        assert_eq!(tasks[0].progress, 100.0);
        assert_eq!(tasks[0].status, TaskStatus::Completed);
    }

    #[test]
    fn test_queued_task_starts_with_forced_probability() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut ledger = TaskLedger::new(vec![task("t1", TaskStatus::Queued, 0.0)], forced(1.0));

        ledger.tick(&mut rng, 0);
        assert_eq!(ledger.tasks(None)[0].status, TaskStatus::Running);
    }

    #[test]
    fn test_completed_task_requeues_with_forced_probability() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut ledger =
            TaskLedger::new(vec![task("t1", TaskStatus::Completed, 100.0)], forced(1.0));

        ledger.tick(&mut rng, 777);
        let t = &ledger.tasks(None)[0];
        assert_eq!(t.status, TaskStatus::Queued);
        assert_eq!(t.progress, 0.0);
        assert_eq!(t.start_time, 777);
    }

    #[test]
    fn test_zero_probability_freezes_transitions() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut ledger = TaskLedger::new(
            vec![
                task("t1", TaskStatus::Queued, 0.0),
                task("t2", TaskStatus::Completed, 100.0),
            ],
            forced(0.0),
        );

        for _ in 0..50 {
            ledger.tick(&mut rng, 0);
        }

        let tasks = ledger.tasks(None);
        assert_eq!(tasks[0].status, TaskStatus::Queued);
        assert_eq!(tasks[1].status, TaskStatus::Completed);
    }

    #[test]
    fn test_failed_tasks_never_transition() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut ledger = TaskLedger::new(vec![task("t1", TaskStatus::Failed, 30.0)], forced(1.0));

        for _ in 0..20 {
            ledger.tick(&mut rng, 0);
        }
        assert_eq!(ledger.tasks(None)[0].status, TaskStatus::Failed);
    }

    #[test]
    fn test_task_filter_matches_name_cluster_and_status() {
        let ledger = TaskLedger::new(
            vec![
                task("t1", TaskStatus::Running, 10.0),
                task("t2", TaskStatus::Queued, 0.0),
            ],
            TransitionRates::default(),
        );

        assert_eq!(ledger.tasks(Some("task t1")).len(), 1);
        assert_eq!(ledger.tasks(Some("CLUSTER-1")).len(), 2);
        assert_eq!(ledger.tasks(Some("queued")).len(), 1);
        assert!(ledger.tasks(Some("no-match")).is_empty());
    }

    #[test]
    fn test_alert_tick_emits_one_with_forced_probability() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut ledger = AlertLedger::new(50, 1.0);
        let nodes = vec![node("web-server-01")];

        ledger.tick(&mut rng, &nodes, 100);
        assert_eq!(ledger.len(), 1);

        let alerts = ledger.alerts();
        assert_eq!(alerts[0].source, "web-server-01");
        assert!(ALERT_CATALOG.contains(&alerts[0].message.as_str()));
    }

    #[test]
    fn test_alert_tick_zero_probability_is_silent() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut ledger = AlertLedger::new(50, 0.0);
        let nodes = vec![node("web-server-01")];

        for _ in 0..100 {
            ledger.tick(&mut rng, &nodes, 0);
        }
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_alert_cap_truncates_from_tail() {
        let mut ledger = AlertLedger::new(50, 0.02);
        for i in 0..60 {
            ledger.raise("src", AlertSeverity::Low, "m", i);
        }

        assert_eq!(ledger.len(), 50);
        let alerts = ledger.alerts();
        // Newest first; the 10 oldest were dropped
        assert_eq!(alerts[0].timestamp, 59);
        assert_eq!(alerts[49].timestamp, 10);
    }

    #[test]
    fn test_alert_ids_are_unique_and_monotonic() {
        let mut ledger = AlertLedger::new(50, 0.02);
        ledger.raise("src", AlertSeverity::Low, "m", 0);
        ledger.raise("src", AlertSeverity::Low, "m", 1);

        let alerts = ledger.alerts();
        assert_eq!(alerts[0].id, "alert-2");
        assert_eq!(alerts[1].id, "alert-1");
    }
}
