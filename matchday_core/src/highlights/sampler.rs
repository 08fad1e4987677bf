//! Deterministic weighted sampling without replacement.

use rand::Rng;

use crate::seed::seeded_rng;

/// Indices drawn from one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// Drawn indices in draw order.
    pub indices: Vec<usize>,
    /// The bucket held fewer candidates than requested.
    pub fallback: bool,
}

/// Weighted draw over one bucket, seeded per call.
#[derive(Debug, Clone, Copy)]
pub struct WeightedSampler {
    seed: u64,
    floor: f64,
}

impl WeightedSampler {
    /// Create a sampler for `seed`. Weights below `floor` are raised to it.
    pub fn new(seed: u64, floor: f64) -> Self {
        Self { seed, floor }
    }

    fn clamp(&self, weight: f64) -> f64 {
        if weight.is_finite() {
            weight.max(self.floor)
        } else {
            self.floor
        }
    }

    /// Draw up to `quota` distinct indices, each proportional to its remaining
    /// weight. A bucket smaller than the quota is returned whole, in order.
    pub fn sample(&self, weights: &[f64], quota: usize) -> Sample {
        if weights.len() < quota {
            return Sample {
                indices: (0..weights.len()).collect(),
                fallback: true,
            };
        }

        let mut rng = seeded_rng(self.seed);
        let mut remaining: Vec<(usize, f64)> = weights
            .iter()
            .enumerate()
            .map(|(index, &weight)| (index, self.clamp(weight)))
            .collect();
        let mut indices = Vec::with_capacity(quota);

        while indices.len() < quota && !remaining.is_empty() {
            let total: f64 = remaining.iter().map(|(_, weight)| weight).sum();
            let target = rng.gen::<f64>() * total;

            let mut cumulative = 0.0;
            let mut picked = remaining.len() - 1;
            for (position, (_, weight)) in remaining.iter().enumerate() {
                cumulative += weight;
                if target <= cumulative {
                    picked = position;
                    break;
                }
            }

            let (index, _) = remaining.remove(picked);
            indices.push(index);
        }

        Sample {
            indices,
            fallback: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_small_pool_returns_all_with_fallback() {
        let sample = WeightedSampler::new(7, 0.1).sample(&[10.0, 20.0], 3);
        assert_eq!(sample.indices, vec![0, 1]);
        assert!(sample.fallback);
    }

    #[test]
    fn test_exact_pool_has_no_fallback() {
        let sample = WeightedSampler::new(7, 0.1).sample(&[10.0, 20.0, 30.0], 3);
        assert!(!sample.fallback);
        let mut sorted = sample.indices.clone();
        sorted.sort();
        assert_eq!(sorted, vec![0, 1, 2]);
    }

    #[test]
    fn test_zero_quota() {
        let sample = WeightedSampler::new(7, 0.1).sample(&[10.0], 0);
        assert!(sample.indices.is_empty());
        assert!(!sample.fallback);
    }

    #[test]
    fn test_negative_weights_stay_sampleable() {
        // floor keeps every candidate drawable
        let weights = [-50.0, f64::NAN, -1.0];
        let sample = WeightedSampler::new(99, 0.1).sample(&weights, 3);
        assert_eq!(sample.indices.len(), 3);
    }

    #[test]
    fn test_heavy_weight_dominates() {
        let weights = [0.1, 0.1, 1000.0, 0.1];
        let hits = (0..200u64)
            .filter(|&seed| WeightedSampler::new(seed, 0.1).sample(&weights, 1).indices == vec![2])
            .count();
        assert!(hits > 190);
    }

    proptest! {
        #[test]
        fn prop_same_seed_same_draw(
            seed in any::<u64>(),
            weights in proptest::collection::vec(-20.0f64..120.0, 0..12),
            quota in 0usize..6,
        ) {
            let sampler = WeightedSampler::new(seed, 0.1);
            prop_assert_eq!(sampler.sample(&weights, quota), sampler.sample(&weights, quota));
        }

        #[test]
        fn prop_draws_are_distinct_and_in_range(
            seed in any::<u64>(),
            weights in proptest::collection::vec(-20.0f64..120.0, 0..12),
            quota in 0usize..6,
        ) {
            let sample = WeightedSampler::new(seed, 0.1).sample(&weights, quota);
            prop_assert_eq!(sample.indices.len(), quota.min(weights.len()));
            prop_assert_eq!(sample.fallback, weights.len() < quota);

            let mut sorted = sample.indices.clone();
            sorted.sort();
            sorted.dedup();
            prop_assert_eq!(sorted.len(), sample.indices.len());
            prop_assert!(sample.indices.iter().all(|&i| i < weights.len()));
        }
    }
}
