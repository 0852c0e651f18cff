//! Random duration sampling
//!
//! The simulation only ever needs two draws: an exponential with a given mean
//! (step durations, inter-arrival gaps) and a normal with a given mean and
//! standard deviation (transport). They sit behind the [`Sampler`] trait so
//! scenario runs can swap in the mean-only [`DeterministicSampler`].

use crate::types::{RunParameters, SamplingMode};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Exp1, StandardNormal};

/// Source of random durations
pub trait Sampler: std::fmt::Debug {
    /// Draw from an exponential distribution with the given mean
    fn exponential(&mut self, mean: f64) -> f64;

    /// Draw from a normal distribution
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64;
}

/// Seeded pseudo-random sampler
#[derive(Debug, Clone)]
pub struct SeededSampler {
    rng: StdRng,
}

impl SeededSampler {
    /// Reproducible sampler for a fixed seed
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// Sampler seeded from the operating system
    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }
}

impl Sampler for SeededSampler {
    fn exponential(&mut self, mean: f64) -> f64 {
        if mean.is_infinite() {
            return f64::INFINITY;
        }
        if mean <= 0.0 {
            return 0.0;
        }
        let unit: f64 = self.rng.sample(Exp1);
        unit * mean
    }

    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        if std_dev <= 0.0 {
            return mean;
        }
        let z: f64 = self.rng.sample(StandardNormal);
        mean + std_dev * z
    }
}

/// Every draw returns the distribution mean
#[derive(Debug, Clone, Copy, Default)]
pub struct DeterministicSampler;

impl Sampler for DeterministicSampler {
    fn exponential(&mut self, mean: f64) -> f64 {
        mean.max(0.0)
    }

    fn normal(&mut self, mean: f64, _std_dev: f64) -> f64 {
        mean
    }
}

/// Build the sampler selected by the run parameters
pub fn sampler_for(params: &RunParameters) -> Box<dyn Sampler> {
    match (params.sampling, params.seed) {
        (SamplingMode::Deterministic, _) => Box::new(DeterministicSampler),
        (SamplingMode::Stochastic, Some(seed)) => Box::new(SeededSampler::new(seed)),
        (SamplingMode::Stochastic, None) => Box::new(SeededSampler::from_entropy()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_draws() {
        let mut a = SeededSampler::new(7);
        let mut b = SeededSampler::new(7);
        for _ in 0..20 {
            assert_eq!(a.exponential(0.25), b.exponential(0.25));
            assert_eq!(a.normal(1.0, 0.2), b.normal(1.0, 0.2));
        }
    }

    #[test]
    fn test_exponential_mean_is_close() {
        let mut sampler = SeededSampler::new(42);
        let n = 20_000;
        let total: f64 = (0..n).map(|_| sampler.exponential(2.0)).sum();
        let mean = total / n as f64;
        assert!((mean - 2.0).abs() < 0.1, "sample mean {}", mean);
    }

    #[test]
    fn test_exponential_edge_means() {
        let mut sampler = SeededSampler::new(1);
        assert_eq!(sampler.exponential(f64::INFINITY), f64::INFINITY);
        assert_eq!(sampler.exponential(0.0), 0.0);
        assert!(sampler.exponential(1.0) >= 0.0);
    }

    #[test]
    fn test_normal_without_spread_returns_mean() {
        let mut sampler = SeededSampler::new(3);
        assert_eq!(sampler.normal(1.5, 0.0), 1.5);
    }

    #[test]
    fn test_deterministic_sampler() {
        let mut sampler = DeterministicSampler;
        assert_eq!(sampler.exponential(0.25), 0.25);
        assert_eq!(sampler.normal(1.0, 0.2), 1.0);
        assert_eq!(sampler.exponential(f64::INFINITY), f64::INFINITY);
    }

    #[test]
    fn test_sampler_for_mode() {
        let params = RunParameters { sampling: SamplingMode::Deterministic, ..Default::default() };
        let mut sampler = sampler_for(&params);
        assert_eq!(sampler.exponential(3.0), 3.0);

        let params = RunParameters { seed: Some(9), ..Default::default() };
        let mut seeded = sampler_for(&params);
        let mut reference = SeededSampler::new(9);
        assert_eq!(seeded.exponential(1.0), reference.exponential(1.0));
    }
}
