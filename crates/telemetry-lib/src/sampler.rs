//! Synthetic metric sampling
//!
//! Generates one plausible-looking sample per node per tick. Samples are
//! correlated with a random per-call baseline and with the previous sample
//! so that sequences look autocorrelated instead of being pure noise.

use crate::models::MetricSample;
use anyhow::Result;
use chrono::Utc;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Per-call cpu baseline range
pub const CPU_BASELINE_MIN: f64 = 20.0;
pub const CPU_BASELINE_MAX: f64 = 90.0;

/// Weight of the previous sample when blending consecutive cpu values
const CPU_CARRYOVER: f64 = 0.6;

/// Trait for sample generation
///
/// The seam is fallible so that tests can inject a failing source and
/// exercise the scheduler's tolerance for bad ticks.
pub trait Sampler: Send + Sync {
    /// Produce the next sample, optionally correlated with the previous one
    fn sample(&mut self, previous: Option<&MetricSample>) -> Result<MetricSample>;
}

/// Default sampler backed by a seedable rng
///
/// Production uses an entropy seed; tests construct it with a fixed seed
/// for deterministic sequences.
pub struct SyntheticSampler {
    rng: SmallRng,
}

impl SyntheticSampler {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for SyntheticSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for SyntheticSampler {
    fn sample(&mut self, previous: Option<&MetricSample>) -> Result<MetricSample> {
        let rng = &mut self.rng;

        let baseline = rng.gen_range(CPU_BASELINE_MIN..CPU_BASELINE_MAX);
        let cpu = match previous {
            Some(prev) => prev.cpu * CPU_CARRYOVER + baseline * (1.0 - CPU_CARRYOVER),
            None => baseline,
        } + rng.gen_range(-5.0..5.0);
        let cpu = cpu.clamp(0.0, 100.0);

        let memory = (cpu * 0.8 + rng.gen_range(0.0..20.0)).clamp(0.0, 100.0);

        // Disk fills and drains slowly; walk from the previous value.
        let disk = match previous {
            Some(prev) => (prev.disk + rng.gen_range(-1.0..1.0)).clamp(0.0, 100.0),
            None => rng.gen_range(20.0..80.0),
        };

        let load1m = (cpu / 10.0 + rng.gen_range(-0.5..0.5)).max(0.0);

        Ok(MetricSample {
            cpu,
            memory,
            disk,
            network_in: rng.gen_range(0.0..1000.0),
            network_out: rng.gen_range(0.0..1000.0),
            load1m,
            timestamp: Utc::now().timestamp_millis(),
        })
    }
}
