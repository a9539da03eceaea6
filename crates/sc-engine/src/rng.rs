//! Deterministic Spin Randomness

use serde::{Deserialize, Serialize};

/// Additive two-seed step generator for reel advances.
///
/// Each draw returns the older seed and folds it into the newer one
/// with wrapping arithmetic, Fibonacci style. When wrap-around leaves
/// the pair out of order both seeds reset to 1, so the sequence is
/// short-periodic and identical on every cabinet. Not seeded from
/// entropy; spin outcomes replay exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FibonacciRng {
    seed1: u8,
    seed2: u8,
}

impl FibonacciRng {
    pub fn new() -> Self {
        Self { seed1: 1, seed2: 1 }
    }

    /// Start from specific seeds instead of `(1, 1)`.
    pub fn with_seeds(seed1: u8, seed2: u8) -> Self {
        Self { seed1, seed2 }
    }

    /// Draw the next reel step.
    pub fn next_step(&mut self) -> u8 {
        let step = self.seed1;
        self.seed1 = self.seed2;
        self.seed2 = self.seed2.wrapping_add(step);
        if self.seed1 > self.seed2 {
            // wrap-around broke the ordering, restart the sequence
            self.seed1 = 1;
            self.seed2 = 1;
        }
        step
    }
}

impl Default for FibonacciRng {
    fn default() -> Self {
        Self::new()
    }
}

// ============ Tests ============
