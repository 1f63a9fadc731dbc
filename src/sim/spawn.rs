//! Procedural obstacle spawning with a randomized trailing gap
//!
//! A new obstacle enters once the distance from the right edge to the last
//! obstacle exceeds a threshold drawn uniformly from `[min_gap, max_gap]`.
//! The threshold is redrawn after every spawn, never per tick.

use super::rng::SimRng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapSpawner {
    min_gap: f32,
    max_gap: f32,
    next_gap: f32,
}

impl GapSpawner {
    pub fn new(min_gap: f32, max_gap: f32, rng: &mut SimRng) -> Self {
        Self {
            min_gap,
            max_gap,
            next_gap: rng.range(min_gap, max_gap),
        }
    }

    /// Constant spacing (min == max)
    pub fn fixed(gap: f32) -> Self {
        Self {
            min_gap: gap,
            max_gap: gap,
            next_gap: gap,
        }
    }

    /// Threshold the current trailing gap must exceed
    pub fn next_gap(&self) -> f32 {
        self.next_gap
    }

    /// Returns true (and draws the next threshold) when a spawn is due
    pub fn should_spawn(&mut self, trailing_gap: f32, rng: &mut SimRng) -> bool {
        if trailing_gap > self.next_gap {
            self.next_gap = rng.range(self.min_gap, self.max_gap);
            true
        } else {
            false
        }
    }
}
