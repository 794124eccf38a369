//! RNG module - seeded randomness for block generation
//!
//! Every random decision of the core (new block colors and shapes, recolor
//! offsets, special block placement) goes through [`BlockRng`], so the same
//! seed reproduces the same game.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::settings::GameSettings;
use zwap_types::BlockKind;

/// Seeded xoshiro256++ generator
#[derive(Debug, Clone)]
pub struct BlockRng {
    inner: Xoshiro256PlusPlus,
    seed: u64,
}

impl BlockRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Xoshiro256PlusPlus::seed_from_u64(seed),
            seed,
        }
    }

    /// Generate random value in range [0, max). Returns 0 when `max` is 0.
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        self.inner.random_range(0..max)
    }

    /// Random color index in `[0, max_colors)`
    pub fn color(&mut self, settings: &GameSettings) -> u8 {
        self.next_range(settings.max_colors as u32) as u8
    }

    /// Random normal shape in `[0, max_block_types)`
    pub fn kind(&mut self, settings: &GameSettings) -> BlockKind {
        BlockKind::normal(self.next_range(settings.max_block_types as u32) as u8)
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// The seed this generator was created with
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for BlockRng {
    fn default() -> Self {
        Self::new(1)
    }
}
