// Per-request random number generators.
//
// Estimators never share a generator: each request asks the injected
// `RandomSource` for a fresh `StdRng`, so handlers stay lock-free and tests
// can pin the sequence with a fixed seed.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out one generator per request.
pub trait RandomSource: Send + Sync {
    fn generator(&self) -> StdRng;
}

/// Production source: every generator is seeded from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn generator(&self) -> StdRng {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Deterministic source for tests. Successive generators use successive
/// seeds starting from the one given to [`SeededRandom::new`].
#[derive(Debug)]
pub struct SeededRandom {
    next_seed: AtomicU64,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            next_seed: AtomicU64::new(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn generator(&self) -> StdRng {
        StdRng::seed_from_u64(self.next_seed.fetch_add(1, Ordering::Relaxed))
    }
}
