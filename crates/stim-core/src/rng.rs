//! Seeded random helpers.
//!
//! Every function here is a pure function of its `seed`: a fresh
//! [`RngHandle`] is created per call, so no state leaks between draws. The
//! handle wraps `StdRng::seed_from_u64`, whose output is fixed for a given
//! `rand` release on every platform; the workspace pins `rand` to keep stored
//! seeds replayable.
//!
//! Independent streams are obtained by multiplying a base seed by distinct
//! primes and adding an index dependent offset (`seed + i + 1`). That scheme
//! is a decorrelation convention, not a cryptographic construction. All seed
//! arithmetic wraps on overflow.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Deterministic RNG handle used by every seeded draw.
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
}

impl RngHandle {
    /// Creates a new RNG handle from a seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Underlying generator, borrowed by each seeded draw.
    pub fn inner_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

/// Returns a permutation of `values` determined by `seed`.
pub fn shuffle<T: Clone>(values: &[T], seed: u64) -> Vec<T> {
    let mut out = values.to_vec();
    out.shuffle(RngHandle::from_seed(seed).inner_mut());
    out
}

/// Seeded permutation of `range`, used for position and merge orders.
pub fn shuffled_range(range: std::ops::Range<usize>, seed: u64) -> Vec<usize> {
    let values: Vec<usize> = range.collect();
    shuffle(&values, seed)
}

/// Uniform integer in `[min, max]` (both inclusive).
///
/// Returns `min` when the range is empty.
pub fn random_int(seed: u64, min: usize, max: usize) -> usize {
    if max <= min {
        return min;
    }
    RngHandle::from_seed(seed).inner_mut().gen_range(min..=max)
}

/// Uniform float in `[min, max)`.
///
/// Returns `min` when the range is empty.
pub fn random_float(seed: u64, min: f64, max: f64) -> f64 {
    if !(max > min) {
        return min;
    }
    RngHandle::from_seed(seed).inner_mut().gen_range(min..max)
}

/// Derives a sub-stream seed: `base * prime`, wrapping.
pub fn stream_seed(base: u64, prime: u64) -> u64 {
    base.wrapping_mul(prime)
}

/// Seed for the `index`-th (zero-based) iteration of a stream: `seed + index + 1`.
pub fn iteration_seed(seed: u64, index: usize) -> u64 {
    seed.wrapping_add(index as u64).wrapping_add(1)
}
