//! Fleet-wide aggregation and diagnostics

use crate::classify::{
    classify, CPU_WARNING_THRESHOLD, LOAD_WARNING_THRESHOLD, MEMORY_WARNING_THRESHOLD,
};
use crate::models::{
    HealthReport, LoadBalance, LoadBalanceReport, MetricSample, NodeStatus, ServerNode,
};

/// max/min network-total ratio above which the fleet counts as skewed
pub const LOAD_SKEW_RATIO: f64 = 3.0;

/// Arithmetic mean of each numeric field over the fleet's latest samples.
/// `None` for an empty fleet; the engine substitutes a placeholder there
/// so callers never see a division by zero.
pub fn fleet_average(nodes: &[ServerNode], now: i64) -> Option<MetricSample> {
    if nodes.is_empty() {
        return None;
    }

    let n = nodes.len() as f64;
    let mut sum = MetricSample::placeholder(now);
    for node in nodes {
        sum.cpu += node.metrics.cpu;
        sum.memory += node.metrics.memory;
        sum.disk += node.metrics.disk;
        sum.network_in += node.metrics.network_in;
        sum.network_out += node.metrics.network_out;
        sum.load1m += node.metrics.load1m;
    }

    Some(MetricSample {
        cpu: sum.cpu / n,
        memory: sum.memory / n,
        disk: sum.disk / n,
        network_in: sum.network_in / n,
        network_out: sum.network_out / n,
        load1m: sum.load1m / n,
        timestamp: now,
    })
}

/// Compare per-node network totals and flag skew above [`LOAD_SKEW_RATIO`]
pub fn load_balance(nodes: &[ServerNode]) -> LoadBalanceReport {
    let mut min: Option<(&ServerNode, f64)> = None;
    let mut max: Option<(&ServerNode, f64)> = None;

    for node in nodes {
        let total = node.metrics.network_in + node.metrics.network_out;
        if min.map(|(_, t)| total < t).unwrap_or(true) {
            min = Some((node, total));
        }
        if max.map(|(_, t)| total > t).unwrap_or(true) {
            max = Some((node, total));
        }
    }

    let (Some((min_node, min_total)), Some((max_node, max_total))) = (min, max) else {
        return LoadBalanceReport {
            status: LoadBalance::Balanced,
            message: "Load distribution normal".to_string(),
        };
    };

    if min_total == 0.0 {
        return LoadBalanceReport {
            status: LoadBalance::Balanced,
            message: "Load distribution normal".to_string(),
        };
    }

    let ratio = max_total / min_total;
    if ratio > LOAD_SKEW_RATIO {
        LoadBalanceReport {
            status: LoadBalance::Skewed,
            message: format!(
                "Load imbalance detected: {} carries {:.2}x the traffic of {}",
                max_node.name, ratio, min_node.name
            ),
        }
    } else {
        LoadBalanceReport {
            status: LoadBalance::Balanced,
            message: format!("Load distribution balanced (ratio: {:.2}x)", ratio),
        }
    }
}

/// Fold per-node classifications into one fleet verdict
pub fn fleet_health(nodes: &[ServerNode]) -> HealthReport {
    let errors: Vec<&ServerNode> = nodes
        .iter()
        .filter(|n| classify(&n.metrics) == NodeStatus::Error)
        .collect();

    if !errors.is_empty() {
        let detail = errors
            .iter()
            .map(|n| {
                format!(
                    "{} (cpu {:.1}%, memory {:.1}%, load1m {:.2})",
                    n.id, n.metrics.cpu, n.metrics.memory, n.metrics.load1m
                )
            })
            .collect::<Vec<_>>()
            .join("; ");
        return HealthReport {
            overall: NodeStatus::Error,
            message: format!("{} node(s) in critical state: {}", errors.len(), detail),
        };
    }

    let warnings = nodes
        .iter()
        .filter(|n| classify(&n.metrics) == NodeStatus::Warning)
        .count();

    if warnings > 0 {
        HealthReport {
            overall: NodeStatus::Warning,
            message: format!(
                "{} node(s) above warning thresholds (cpu > {}%, memory > {}% or load1m > {})",
                warnings, CPU_WARNING_THRESHOLD, MEMORY_WARNING_THRESHOLD, LOAD_WARNING_THRESHOLD
            ),
        }
    } else {
        HealthReport {
            overall: NodeStatus::Healthy,
            message: format!("All {} nodes operational", nodes.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, cpu: f64, memory: f64, load1m: f64, net_in: f64, net_out: f64) -> ServerNode {
        let metrics = MetricSample {
            cpu,
            memory,
            disk: 40.0,
            network_in: net_in,
            network_out: net_out,
            load1m,
            timestamp: 0,
        };
        ServerNode {
            id: id.to_string(),
            name: id.to_string(),
            region: "us-east-1".to_string(),
            status: classify(&metrics),
            metrics,
        }
    }

    #[test]
    fn test_fleet_average_is_arithmetic_mean() {
        let nodes = vec![
            node("a", 20.0, 40.0, 1.0, 100.0, 100.0),
            node("b", 40.0, 60.0, 3.0, 300.0, 300.0),
        ];

        let avg = fleet_average(&nodes, 123).unwrap();
        assert_eq!(avg.cpu, 30.0);
        assert_eq!(avg.memory, 50.0);
        assert_eq!(avg.load1m, 2.0);
        assert_eq!(avg.network_in, 200.0);
        assert_eq!(avg.timestamp, 123);
    }

    #[test]
    fn test_fleet_average_empty_fleet() {
        assert!(fleet_average(&[], 0).is_none());
    }

    #[test]
    fn test_load_balance_identical_totals() {
        let nodes = vec![
            node("a", 50.0, 50.0, 1.0, 200.0, 300.0),
            node("b", 50.0, 50.0, 1.0, 100.0, 400.0),
        ];
        let report = load_balance(&nodes);
        assert_eq!(report.status, LoadBalance::Balanced);
    }

    #[test]
    fn test_load_balance_ratio_six_is_skewed() {
        let nodes = vec![
            node("busy", 50.0, 50.0, 1.0, 2000.0, 1000.0),
            node("idle", 50.0, 50.0, 1.0, 200.0, 300.0),
        ];
        let report = load_balance(&nodes);
        assert_eq!(report.status, LoadBalance::Skewed);
        assert!(report.message.contains("busy"));
        assert!(report.message.contains("idle"));
        assert!(report.message.contains("6.00"));
    }

    #[test]
    fn test_load_balance_zero_min_is_balanced() {
        let nodes = vec![
            node("a", 50.0, 50.0, 1.0, 0.0, 0.0),
            node("b", 50.0, 50.0, 1.0, 500.0, 500.0),
        ];
        assert_eq!(load_balance(&nodes).status, LoadBalance::Balanced);
    }

    #[test]
    fn test_load_balance_empty_fleet() {
        assert_eq!(load_balance(&[]).status, LoadBalance::Balanced);
    }

    #[test]
    fn test_fleet_health_all_healthy() {
        let nodes = vec![
            node("a", 50.0, 50.0, 1.0, 100.0, 100.0),
            node("b", 30.0, 40.0, 0.5, 100.0, 100.0),
        ];
        let report = fleet_health(&nodes);
        assert_eq!(report.overall, NodeStatus::Healthy);
        assert!(report.message.contains("2 nodes"));
    }

    #[test]
    fn test_fleet_health_warning_counts_and_states_rule() {
        let nodes = vec![
            node("a", 75.0, 50.0, 1.0, 100.0, 100.0),
            node("b", 30.0, 85.0, 0.5, 100.0, 100.0),
            node("c", 30.0, 40.0, 0.5, 100.0, 100.0),
        ];
        let report = fleet_health(&nodes);
        assert_eq!(report.overall, NodeStatus::Warning);
        assert!(report.message.starts_with("2 node(s)"));
        assert!(report.message.contains("cpu > 70"));
    }

    #[test]
    fn test_fleet_health_error_enumerates_offenders() {
        let nodes = vec![
            node("a", 95.0, 50.0, 1.0, 100.0, 100.0),
            node("b", 30.0, 40.0, 6.5, 100.0, 100.0),
            node("c", 30.0, 40.0, 0.5, 100.0, 100.0),
        ];
        let report = fleet_health(&nodes);
        assert_eq!(report.overall, NodeStatus::Error);
        assert!(report.message.contains("a (cpu 95.0%"));
        assert!(report.message.contains("b (cpu 30.0%"));
        assert!(!report.message.contains("c (cpu"));
    }
}
