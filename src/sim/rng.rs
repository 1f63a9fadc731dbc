//! Seeded random source shared by every engine
//!
//! Engines never touch a global generator: each session owns one `SimRng`
//! so identical seeds and inputs reproduce identical runs.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

#[derive(Debug, Clone)]
pub struct SimRng {
    inner: Pcg32,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg32::seed_from_u64(seed),
        }
    }

    /// Uniform float in `[lo, hi]`; returns `lo` for an empty or inverted span
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        self.inner.random_range(lo..=hi)
    }

    /// Uniform index in `0..len`, `None` when `len == 0`
    pub fn index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.inner.random_range(0..len))
    }

    /// True with probability `p`
    pub fn chance(&mut self, p: f64) -> bool {
        self.inner.random::<f64>() < p
    }

    /// +1.0 or -1.0 with equal probability
    pub fn sign(&mut self) -> f32 {
        if self.chance(0.5) { 1.0 } else { -1.0 }
    }

    /// Uniform pick from a slice
    pub fn pick<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        self.index(items.len()).map(|i| items[i])
    }
}
