//! Reviewer selection
//!
//! Picks reviewers uniformly at random from an eligible pool. Selection does
//! no I/O; the only side effect is consuming entropy from the injected
//! [`RandomSource`].

use std::sync::Arc;

use crate::random::{RandomSource, RngSource, SelectionError};

/// Default number of reviewers assigned to a new pull request
pub const DEFAULT_REVIEWER_QUOTA: usize = 2;

/// Upper bound on reviewers per pull request
pub const MAX_REVIEWER_QUOTA: usize = 2;

/// Uniform random reviewer picker
#[derive(Clone)]
pub struct ReviewerSelector {
    source: Arc<dyn RandomSource>,
}

impl ReviewerSelector {
    pub fn new(source: Arc<dyn RandomSource>) -> Self {
        Self { source }
    }

    /// Selector backed by the operating system CSPRNG
    pub fn secure() -> Self {
        Self::new(Arc::new(RngSource::os()))
    }

    /// Pick `min(count, pool.len())` distinct elements of `pool`
    ///
    /// When the pool is no larger than `count` the whole pool is returned.
    /// Otherwise every element has the same chance of being picked. The
    /// order of the result carries no meaning.
    pub fn pick_reviewers<T: Clone>(
        &self,
        pool: &[T],
        count: usize,
    ) -> Result<Vec<T>, SelectionError> {
        if count == 0 || pool.is_empty() {
            return Ok(Vec::new());
        }

        if pool.len() <= count {
            return Ok(pool.to_vec());
        }

        // Partial Fisher-Yates: the first `count` slots end up a uniform sample.
        let mut indices: Vec<usize> = (0..pool.len()).collect();
        for i in 0..count {
            let j = i + self.source.index(pool.len() - i)?;
            indices.swap(i, j);
        }

        Ok(indices[..count].iter().map(|&i| pool[i].clone()).collect())
    }

    /// Pick a single element of `pool`
    pub fn pick_one<T: Clone>(&self, pool: &[T]) -> Result<T, SelectionError> {
        if pool.is_empty() {
            return Err(SelectionError::Exhausted);
        }

        let i = self.source.index(pool.len())?;
        Ok(pool[i].clone())
    }
}

impl std::fmt::Debug for ReviewerSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewerSelector").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    fn seeded(seed: u64) -> ReviewerSelector {
        ReviewerSelector::new(Arc::new(RngSource::seeded(seed)))
    }

    #[test]
    fn test_small_pool_returned_whole() {
        let selector = seeded(1);

        let empty: Vec<&str> = Vec::new();
        assert!(selector.pick_reviewers(&empty, 2).unwrap().is_empty());

        let one = vec!["bob"];
        assert_eq!(selector.pick_reviewers(&one, 2).unwrap(), vec!["bob"]);

        let two = vec!["bob", "carol"];
        let mut picked = selector.pick_reviewers(&two, 2).unwrap();
        picked.sort();
        assert_eq!(picked, vec!["bob", "carol"]);
    }

    #[test]
    fn test_zero_count_is_empty() {
        let selector = seeded(1);
        let pool = vec!["bob", "carol", "dave"];
        assert!(selector.pick_reviewers(&pool, 0).unwrap().is_empty());
    }

    #[test]
    fn test_large_pool_picks_distinct() {
        let selector = seeded(3);
        let pool: Vec<String> = (0..10).map(|i| format!("user-{}", i)).collect();

        for _ in 0..500 {
            let picked = selector.pick_reviewers(&pool, 2).unwrap();
            assert_eq!(picked.len(), 2);
            assert_ne!(picked[0], picked[1]);
            assert!(picked.iter().all(|p| pool.contains(p)));
        }
    }

    #[test]
    fn test_selection_is_roughly_uniform() {
        let selector = seeded(2024);
        let pool: Vec<usize> = (0..6).collect();
        let trials = 30_000;
        let mut counts: HashMap<usize, usize> = HashMap::new();

        for _ in 0..trials {
            let picked = selector.pick_reviewers(&pool, 2).unwrap();
            let unique: HashSet<_> = picked.iter().collect();
            assert_eq!(unique.len(), 2);
            for p in picked {
                *counts.entry(p).or_default() += 1;
            }
        }

        // Each element is expected in 2/6 of the trials.
        let expected = trials as f64 * 2.0 / 6.0;
        for element in &pool {
            let seen = counts[element] as f64;
            let deviation = (seen - expected).abs() / expected;
            assert!(
                deviation < 0.05,
                "element {} picked {} times, expected about {}",
                element,
                seen,
                expected
            );
        }
    }

    #[test]
    fn test_pick_one() {
        let selector = seeded(9);
        let pool = vec!["bob", "carol", "dave"];
        for _ in 0..50 {
            assert!(pool.contains(&selector.pick_one(&pool).unwrap()));
        }
    }

    #[test]
    fn test_pick_one_empty_pool() {
        let selector = seeded(9);
        let empty: Vec<&str> = Vec::new();
        assert_eq!(selector.pick_one(&empty), Err(SelectionError::Exhausted));
    }

    struct BrokenSource;

    impl RandomSource for BrokenSource {
        fn index(&self, _upper: usize) -> Result<usize, SelectionError> {
            Err(SelectionError::Entropy("device unavailable".to_string()))
        }
    }

    #[test]
    fn test_entropy_failure_propagates() {
        let selector = ReviewerSelector::new(Arc::new(BrokenSource));
        let pool = vec!["bob", "carol", "dave"];

        assert!(matches!(
            selector.pick_reviewers(&pool, 2),
            Err(SelectionError::Entropy(_))
        ));
        assert!(matches!(
            selector.pick_one(&pool),
            Err(SelectionError::Entropy(_))
        ));
    }

    #[test]
    fn test_small_pool_needs_no_entropy() {
        let selector = ReviewerSelector::new(Arc::new(BrokenSource));
        let pool = vec!["bob", "carol"];
        assert_eq!(selector.pick_reviewers(&pool, 2).unwrap().len(), 2);
    }
}
