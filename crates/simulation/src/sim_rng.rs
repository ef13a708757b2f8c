//! Seeded RNG resource.
//!
//! All randomness in the kernel (agent wandering, wait jitter) draws from
//! this single `ChaCha8Rng` so a run is reproducible from its seed alone.
//! Never reach for `rand::thread_rng()` inside a system.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seed used when no explicit seed is provided. Also seeds the terrain
/// noise in world setup.
pub const DEFAULT_SEED: u64 = 42;

#[derive(Resource)]
pub struct SimRng(pub ChaCha8Rng);

impl Default for SimRng {
    fn default() -> Self {
        Self(ChaCha8Rng::seed_from_u64(DEFAULT_SEED))
    }
}

impl SimRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}
