//! # Dice
//!
//! Every random draw in the engine goes through [`Dice`]: a ChaCha20 stream
//! seeded from the operating system. Catch outcomes and rarity rolls decide
//! what players earn, so a predictable generator would be exploitable.

use crate::error::{FishingError, FishingResult};
use parking_lot::Mutex;
use rand::rngs::OsRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Thread-safe CSPRNG.
pub struct Dice {
    rng: Mutex<ChaCha20Rng>,
}

impl Dice {
    /// Seeds a generator from OS entropy.
    pub fn from_os() -> FishingResult<Self> {
        let rng = ChaCha20Rng::from_rng(OsRng).map_err(|e| FishingError::Random(e.to_string()))?;
        Ok(Self {
            rng: Mutex::new(rng),
        })
    }

    /// Deterministic generator for tests and simulations (NOT FOR PRODUCTION).
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha20Rng::seed_from_u64(seed)),
        }
    }

    /// Uniform integer in `[0, 100)`.
    #[inline]
    pub fn percent(&self) -> i64 {
        self.rng.lock().gen_range(0..100)
    }

    /// Uniform integer in `[0, bound)`. Returns 0 when `bound <= 0`.
    #[inline]
    pub fn below(&self, bound: i64) -> i64 {
        if bound <= 0 {
            return 0;
        }
        self.rng.lock().gen_range(0..bound)
    }

    /// Uniform integer in `[low, high]`.
    #[inline]
    pub fn between(&self, low: i64, high: i64) -> i64 {
        if high <= low {
            return low;
        }
        self.rng.lock().gen_range(low..=high)
    }

    /// Uniform float in `[0, 1)`.
    #[inline]
    pub fn fraction(&self) -> f64 {
        self.rng.lock().gen::<f64>()
    }

    /// Uniformly picks one element. `None` for an empty slice.
    pub fn pick<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.rng.lock().gen_range(0..items.len());
        items.get(index)
    }
}

impl std::fmt::Debug for Dice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Generator state predicts every future draw.
        f.debug_struct("Dice").field("rng", &"[REDACTED]").finish()
    }
}
