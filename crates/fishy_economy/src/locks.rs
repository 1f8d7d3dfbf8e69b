//! # Player Locks
//!
//! Striped mutexes that serialize capacity check-then-increment sequences
//! for one player. Two players may share a stripe; that only costs
//! contention, never correctness.
//!
//! A caller must hold at most one stripe at a time.

use parking_lot::{Mutex, MutexGuard};

/// Fixed table of per-player mutex stripes.
pub struct PlayerLocks {
    stripes: Box<[Mutex<()>]>,
}

impl PlayerLocks {
    /// Stripe count used by the engine.
    pub const DEFAULT_STRIPES: usize = 64;

    /// Creates a table with `stripes` mutexes (at least one).
    #[must_use]
    pub fn new(stripes: usize) -> Self {
        let stripes = (0..stripes.max(1)).map(|_| Mutex::new(())).collect();
        Self { stripes }
    }

    /// Blocks until the stripe owning `player` is held.
    pub fn lock(&self, player: &str) -> MutexGuard<'_, ()> {
        self.stripes[self.stripe_of(player)].lock()
    }

    /// Index of the stripe owning `player`.
    #[inline]
    #[must_use]
    pub fn stripe_of(&self, player: &str) -> usize {
        (fnv1a(player.as_bytes()) % self.stripes.len() as u64) as usize
    }
}

impl Default for PlayerLocks {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STRIPES)
    }
}

impl std::fmt::Debug for PlayerLocks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerLocks")
            .field("stripes", &self.stripes.len())
            .finish()
    }
}

/// FNV-1a over raw bytes.
#[inline]
fn fnv1a(bytes: &[u8]) -> u64 {
    const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;

    bytes.iter().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}
