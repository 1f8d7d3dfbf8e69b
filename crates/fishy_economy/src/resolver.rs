//! # Catch Resolver
//!
//! One cast is a three-stage cascade with an independent draw per stage:
//!
//! ```text
//!   r1 < bite?  ── no ──> NoBite
//!       │yes
//!   r2 < catch? ── no ──> BitButLost   (costs one bait)
//!       │yes
//!   r3 < fish?  ── no ──> Garbage
//!       │yes
//!     Fish
//! ```
//!
//! Each draw is uniform in `[0, 100)`, so
//! `P(Fish) = bite/100 * catch/100 * fish/100`.

use crate::dice::Dice;
use crate::rates::CastRates;

/// Terminal outcome of one cast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CatchOutcome {
    /// Nothing took the bait.
    NoBite,
    /// Something bit but got away.
    BitButLost,
    /// Reeled in trash.
    Garbage,
    /// Reeled in a fish.
    Fish,
}

impl CatchOutcome {
    /// Human-readable reason for the two failure outcomes.
    #[must_use]
    pub const fn failure_reason(self) -> Option<&'static str> {
        match self {
            Self::NoBite => Some("you couldn't get a fish to bite"),
            Self::BitButLost => Some("a fish bit but you were unable to wrangle it in"),
            Self::Garbage | Self::Fish => None,
        }
    }
}

/// Resolves one cast.
pub fn resolve(dice: &Dice, rates: &CastRates) -> CatchOutcome {
    if dice.percent() >= rates.bite {
        return CatchOutcome::NoBite;
    }
    if dice.percent() >= rates.catch {
        return CatchOutcome::BitButLost;
    }
    if dice.percent() >= rates.fish {
        return CatchOutcome::Garbage;
    }
    CatchOutcome::Fish
}
