//! Probability sources for failure injection.
//!
//! The [`Sampler`] trait is the only randomness the executioners see, so tests
//! can swap in deterministic samplers and production can seed a real RNG.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::error::ConfigError;

/// Source of uniform samples in `[0, 1)`.
pub trait Sampler {
    fn sample(&mut self) -> f64;

    /// Pick an index in `0..len` uniformly using one sample. `len` must be > 0.
    fn choose_index(&mut self, len: usize) -> usize {
        let index = (self.sample() * len as f64) as usize;
        index.min(len.saturating_sub(1))
    }
}

impl<S: Sampler + ?Sized> Sampler for Box<S> {
    fn sample(&mut self) -> f64 {
        (**self).sample()
    }
}

/// Sampler backed by [`StdRng`].
#[derive(Debug, Clone)]
pub struct RandSampler {
    rng: StdRng,
}

impl RandSampler {
    /// Reproducible sampler for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Sampler seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded when `seed` is given, entropy otherwise.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl Sampler for RandSampler {
    fn sample(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }
}

/// Decides, per fallible action, whether the divergent branch is taken.
///
/// The probability is fixed for the lifetime of the injector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FailureInjector {
    probability: f64,
}

impl FailureInjector {
    pub fn new(probability: f64) -> Result<Self, ConfigError> {
        if !probability.is_finite() || !(0.0..1.0).contains(&probability) {
            return Err(ConfigError::InvalidProbability(probability));
        }
        Ok(Self { probability })
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Draw one sample; fail iff it lands below the probability.
    pub fn should_fail(&self, sampler: &mut dyn Sampler) -> bool {
        sampler.sample() < self.probability
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedSampler;

    #[test]
    fn rejects_out_of_range_probabilities() {
        for p in [-0.1, 1.0, 1.5, f64::NAN, f64::INFINITY] {
            assert!(FailureInjector::new(p).is_err(), "{p} should be rejected");
        }
        assert!(FailureInjector::new(0.0).is_ok());
        assert!(FailureInjector::new(0.999).is_ok());
    }

    #[test]
    fn fails_strictly_below_probability() {
        let injector = FailureInjector::new(0.5).expect("injector");
        let mut sampler = ScriptedSampler::new([0.49, 0.5, 0.0]);
        assert!(injector.should_fail(&mut sampler));
        assert!(!injector.should_fail(&mut sampler));
        assert!(injector.should_fail(&mut sampler));
    }

    #[test]
    fn zero_probability_never_fails() {
        let injector = FailureInjector::new(0.0).expect("injector");
        let mut sampler = ScriptedSampler::new([0.0]);
        assert!(!injector.should_fail(&mut sampler));
    }

    #[test]
    fn choose_index_stays_in_range() {
        let mut sampler = ScriptedSampler::new([0.0, 0.34, 0.999_999]);
        assert_eq!(sampler.choose_index(3), 0);
        assert_eq!(sampler.choose_index(3), 1);
        assert_eq!(sampler.choose_index(3), 2);
    }

    #[test]
    fn seeded_samplers_are_reproducible() {
        let mut a = RandSampler::seeded(7);
        let mut b = RandSampler::seeded(7);
        for _ in 0..16 {
            let sample = a.sample();
            assert_eq!(sample, b.sample());
            assert!((0.0..1.0).contains(&sample));
        }
    }

    /// Empirical failure rate converges to p within three standard errors.
    #[test]
    fn failure_rate_is_calibrated() {
        let p = 0.3;
        let trials = 20_000;
        let injector = FailureInjector::new(p).expect("injector");
        let mut sampler = RandSampler::seeded(42);
        let failures = (0..trials)
            .filter(|_| injector.should_fail(&mut sampler))
            .count();
        let rate = failures as f64 / trials as f64;
        let stderr = (p * (1.0 - p) / trials as f64).sqrt();
        assert!(
            (rate - p).abs() < 3.0 * stderr,
            "rate {rate} too far from {p}"
        );
    }
}
