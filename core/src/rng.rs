//! Deterministic random number generation for demo data.
//!
//! RULE: Demo generation never calls a platform RNG. Everything flows
//! from one seed, so the same seed always yields the same team.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A deterministic RNG stream.
pub struct DeskRng {
    inner: Pcg64Mcg,
}

impl DeskRng {
    /// Derive a stream from the master seed and a stable stream index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, stream_index: u64) -> Self {
        let derived_seed = master_seed ^ (stream_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Pick one element of a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        let index = self.next_u64_below(items.len() as u64) as usize;
        &items[index]
    }

    /// Sample from a simplified Pareto distribution.
    /// x_min: minimum value, alpha: shape parameter (higher = less skewed).
    pub fn pareto(&mut self, x_min: f64, alpha: f64) -> f64 {
        let u = self.next_f64().max(1e-10);
        x_min * u.powf(-1.0 / alpha)
    }
}

/// Stable stream assignments.
/// NEVER reorder or remove entries: only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum Stream {
    Roster = 0,
    Sales = 1,
}

impl Stream {
    pub fn rng(self, master_seed: u64) -> DeskRng {
        DeskRng::new(master_seed, self as u64)
    }
}
