//! Entropy sources for reviewer selection
//!
//! Selection draws indices through the [`RandomSource`] trait so the
//! operating system generator can be swapped for a seeded one in tests.

use std::sync::Mutex;

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};
use thiserror::Error;

/// Errors raised while selecting reviewers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// The pool had no candidate to pick
    #[error("selection pool is empty")]
    Exhausted,

    /// The entropy source failed to produce bytes
    #[error("entropy source failed: {0}")]
    Entropy(String),
}

/// A source of uniformly distributed indices
pub trait RandomSource: Send + Sync {
    /// Draw an index uniformly from `0..upper`
    ///
    /// Fails with [`SelectionError::Exhausted`] when `upper` is zero.
    fn index(&self, upper: usize) -> Result<usize, SelectionError>;
}

/// [`RandomSource`] backed by any `rand` generator
pub struct RngSource<R> {
    rng: Mutex<R>,
}

impl RngSource<OsRng> {
    /// Operating system CSPRNG
    pub fn os() -> Self {
        Self::new(OsRng)
    }
}

impl RngSource<StdRng> {
    /// Deterministic generator for reproducible runs
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl<R: RngCore + Send> RandomSource for RngSource<R> {
    fn index(&self, upper: usize) -> Result<usize, SelectionError> {
        if upper == 0 {
            return Err(SelectionError::Exhausted);
        }

        let upper = upper as u64;
        // Values at or above 2^64 - rem would bias the modulo; redraw them.
        let rem = (u64::MAX % upper + 1) % upper;

        let mut rng = self
            .rng
            .lock()
            .map_err(|_| SelectionError::Entropy("random source lock poisoned".to_string()))?;

        loop {
            let mut buf = [0u8; 8];
            rng.try_fill_bytes(&mut buf)
                .map_err(|e| SelectionError::Entropy(e.to_string()))?;
            let value = u64::from_le_bytes(buf);

            if rem == 0 || value < rem.wrapping_neg() {
                return Ok((value % upper) as usize);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_within_bounds() {
        let source = RngSource::seeded(7);
        for upper in 1..50 {
            for _ in 0..20 {
                assert!(source.index(upper).unwrap() < upper);
            }
        }
    }

    #[test]
    fn test_index_of_one_is_zero() {
        let source = RngSource::seeded(1);
        assert_eq!(source.index(1).unwrap(), 0);
    }

    #[test]
    fn test_zero_upper_is_exhausted() {
        let source = RngSource::seeded(1);
        assert_eq!(source.index(0), Err(SelectionError::Exhausted));
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let a = RngSource::seeded(42);
        let b = RngSource::seeded(42);
        let xs: Vec<usize> = (0..16).map(|_| a.index(1000).unwrap()).collect();
        let ys: Vec<usize> = (0..16).map(|_| b.index(1000).unwrap()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_os_source() {
        let source = RngSource::os();
        assert!(source.index(10).unwrap() < 10);
    }

    struct FailingRng;

    impl RngCore for FailingRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {}

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new(std::io::Error::other("no entropy")))
        }
    }

    #[test]
    fn test_entropy_failure_is_reported() {
        let source = RngSource::new(FailingRng);
        assert!(matches!(source.index(3), Err(SelectionError::Entropy(_))));
    }
}
