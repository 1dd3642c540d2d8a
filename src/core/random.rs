/// Injectable randomness for revelation draws and template selection.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Every random decision the engine makes goes through this trait.
pub trait RandomSource {
    /// Bernoulli draw. `probability` is clamped into [0, 1].
    fn chance(&mut self, probability: f64) -> bool;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick(&mut self, len: usize) -> usize;
}

/// Seeded `StdRng`; the same seed replays the same decisions.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn chance(&mut self, probability: f64) -> bool {
        let p = if probability.is_nan() { 0.0 } else { probability.clamp(0.0, 1.0) };
        self.rng.gen_bool(p)
    }

    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Deterministic source: every draw returns `outcome`, every pick is 0.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom {
    pub outcome: bool,
}

impl FixedRandom {
    pub fn always() -> Self {
        Self { outcome: true }
    }

    pub fn never() -> Self {
        Self { outcome: false }
    }
}

impl RandomSource for FixedRandom {
    fn chance(&mut self, probability: f64) -> bool {
        // A zero-probability draw never succeeds, even when forced.
        self.outcome && probability > 0.0
    }

    fn pick(&mut self, _len: usize) -> usize {
        0
    }
}
