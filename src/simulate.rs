//! Simulated decay data for trying the viewer without a file.

use serde::{Deserialize, Serialize};

use crate::data::model::{Cell, Dataset, DatasetMeta};
use crate::error::{Error, Result};

pub const DEFAULT_X_LABEL: &str = "Time[s]";
pub const DEFAULT_Y_LABEL: &str = "Data / particles";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Number of decays drawn.
    pub samples: usize,
    pub bins: usize,
    pub range_min: f64,
    pub range_max: f64,
    /// Lifetime is drawn uniformly from `[tau_min, tau_max)`.
    pub tau_min: u64,
    pub tau_max: u64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            samples: 10_000,
            bins: 200,
            range_min: 0.0,
            range_max: 1000.0,
            tau_min: 200,
            tau_max: 500,
        }
    }
}

impl SimulationParams {
    pub fn validate(&self) -> Result<()> {
        if self.bins == 0 {
            return Err(Error::Config("simulation.bins must be positive".into()));
        }
        if !(self.range_min < self.range_max) {
            return Err(Error::Config(
                "simulation.range_min must be below range_max".into(),
            ));
        }
        if self.tau_min == 0 || self.tau_min >= self.tau_max {
            return Err(Error::Config(
                "simulation.tau_min must be positive and below tau_max".into(),
            ));
        }
        Ok(())
    }
}

/// A simulated run: the histogram plus the lifetime that generated it.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub tau: f64,
    pub dataset: Dataset,
}

/// Draw a lifetime, sample decays and histogram them into a
/// `time`/`count` dataset. Deterministic for a given seed.
pub fn simulate_decay(params: &SimulationParams, seed: u64) -> Result<Simulation> {
    params.validate()?;
    let mut rng = SimpleRng::new(seed);
    let tau = rng.range_u64(params.tau_min, params.tau_max) as f64;

    let width = (params.range_max - params.range_min) / params.bins as f64;
    let mut counts = vec![0i64; params.bins];
    for _ in 0..params.samples {
        let t = rng.exponential(tau);
        if t < params.range_min || t >= params.range_max {
            continue;
        }
        let bin = (((t - params.range_min) / width) as usize).min(params.bins - 1);
        counts[bin] += 1;
    }

    let rows = counts
        .iter()
        .enumerate()
        .map(|(i, &n)| {
            vec![
                Cell::Float(params.range_min + i as f64 * width),
                Cell::Integer(n),
            ]
        })
        .collect();

    let meta = DatasetMeta {
        title: Some(format!("Simulated decay (tau = {tau})")),
        x_label: Some(DEFAULT_X_LABEL.to_string()),
        y_label: Some(DEFAULT_Y_LABEL.to_string()),
    };
    let dataset = Dataset::new(vec!["time".into(), "count".into()], rows, true)?.with_meta(meta);
    log::info!(
        "Simulated {} decays with tau = {tau} into {} bins",
        params.samples,
        params.bins
    );
    Ok(Simulation { tau, dataset })
}

/// Minimal deterministic PRNG (xoshiro256**)
pub struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    pub fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    pub fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `[lo, hi)`; `hi` must exceed `lo`.
    pub fn range_u64(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next_u64() % (hi - lo)
    }

    /// Inverse-CDF sample of an exponential with mean `tau`.
    pub fn exponential(&mut self, tau: f64) -> f64 {
        -tau * (1.0 - self.next_f64()).ln()
    }
}
