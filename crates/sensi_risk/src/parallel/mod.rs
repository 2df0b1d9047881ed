//! Rayon-based parallelisation utilities.
//!
//! Scenario valuation is embarrassingly parallel: each scenario's column
//! depends only on the shared read-only base market, its own overlay and the
//! trades. These helpers choose between sequential and parallel execution
//! from a [`ParallelConfig`] while preserving input order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Minimum number of items handed to one rayon task.
pub const DEFAULT_BATCH_SIZE: usize = 4;

/// Item count from which parallel execution is used.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 16;

/// Configuration for parallel execution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Minimum items per rayon task
    pub batch_size: usize,
    /// Minimum items before using parallelism
    pub parallel_threshold: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl ParallelConfig {
    /// Creates a new parallel configuration.
    pub fn new(batch_size: usize, parallel_threshold: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            parallel_threshold,
        }
    }

    /// Always sequential.
    pub fn sequential() -> Self {
        Self::new(1, usize::MAX)
    }

    /// Returns whether to use parallel processing for the given item count.
    #[inline]
    pub fn should_parallelize(&self, n_items: usize) -> bool {
        n_items >= self.parallel_threshold
    }
}

/// Maps `items` in order, in parallel when the configuration says so.
///
/// Returns the results and whether the parallel path was taken.
pub fn ordered_map<T, R, F>(items: &[T], config: &ParallelConfig, mapper: F) -> (Vec<R>, bool)
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    if config.should_parallelize(items.len()) {
        let results = items
            .par_iter()
            .with_min_len(config.batch_size.max(1))
            .map(mapper)
            .collect();
        (results, true)
    } else {
        (items.iter().map(mapper).collect(), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_config_default() {
        let config = ParallelConfig::default();
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.parallel_threshold, DEFAULT_PARALLEL_THRESHOLD);
    }

    #[test]
    fn test_should_parallelize() {
        let config = ParallelConfig::new(0, 10);
        assert_eq!(config.batch_size, 1);
        assert!(!config.should_parallelize(9));
        assert!(config.should_parallelize(10));
        assert!(!ParallelConfig::sequential().should_parallelize(1_000_000));
    }

    #[test]
    fn test_ordered_map_preserves_order() {
        let items: Vec<usize> = (0..200).collect();
        let (par, used_parallel) = ordered_map(&items, &ParallelConfig::new(3, 10), |&x| x * 2);
        assert!(used_parallel);
        let (seq, used_parallel) = ordered_map(&items, &ParallelConfig::sequential(), |&x| x * 2);
        assert!(!used_parallel);
        assert_eq!(par, seq);
        assert_eq!(par[199], 398);
    }
}
