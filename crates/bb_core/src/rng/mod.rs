//! Seeded PRNG
//!
//! Every random decision in a game is drawn from one [`SeededRng`]. The
//! generator is ChaCha8 seeded with `seed_from_u64`, so two instances built
//! from the same seed produce the same draw sequence forever, and the
//! position inside that sequence (`word_pos`) is enough to resume it.
//!
//! Bounded draws use a multiply-shift reduction instead of `gen_range` so
//! the mapping from raw words to outcomes cannot drift with `rand` releases.

mod seed;

pub use seed::{Seed, SeedError};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Serializable generator position.
///
/// `word_pos` is stored as a decimal string so the value survives formats
/// without native 128-bit integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    #[serde(with = "word_pos_text")]
    pub word_pos: u128,
}

/// Deterministic generator owned by a game session.
#[derive(Debug, Clone)]
pub struct SeededRng {
    seed: u64,
    rng: ChaCha8Rng,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self { seed, rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    pub fn from_seed(seed: &Seed) -> Self {
        Self::new(seed.value())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Raw draw in `[0, 2^32)`.
    pub fn draw(&mut self) -> u32 {
        self.rng.next_u32()
    }

    /// Draw in `[0, bound)`. `bound` must be non-zero.
    pub fn draw_below(&mut self, bound: u32) -> u32 {
        debug_assert!(bound > 0, "draw_below bound must be positive");
        ((self.draw() as u64 * bound as u64) >> 32) as u32
    }

    pub fn state(&self) -> RngState {
        RngState { seed: self.seed, word_pos: self.rng.get_word_pos() }
    }

    pub fn restore(&mut self, state: RngState) {
        self.seed = state.seed;
        self.rng = ChaCha8Rng::seed_from_u64(state.seed);
        self.rng.set_word_pos(state.word_pos);
    }

    pub fn from_state(state: RngState) -> Self {
        let mut rng = Self::new(state.seed);
        rng.restore(state);
        rng
    }
}

mod word_pos_text {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse::<u128>().map_err(serde::de::Error::custom)
    }
}
