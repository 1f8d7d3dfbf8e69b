//! # Rarity Selection
//!
//! Catch tiers are weighted 50/29/15/5/1. A player can only roll tiers up to
//! the one their global score has unlocked.
//!
//! ## Boundary Semantics
//!
//! The roll is drawn from `[0, C(max))` where `C(t)` is the cumulative weight
//! through tier `t`, and the first tier with `C(t) >= roll` wins. Ties go to
//! the lower tier, so each tier below `max` wins one extra value of the roll
//! and `max` itself loses one. For `max = 5` the roll never exceeds
//! `C(4) = 99`: tier 5 cannot be rolled.

use crate::dice::Dice;
use serde::{Deserialize, Serialize};

/// Highest catch tier.
pub const MAX_TIER: u8 = 5;

/// Base weight of each tier, lowest first.
pub const TIER_WEIGHTS: [i64; MAX_TIER as usize] = [50, 29, 15, 5, 1];

/// Cumulative weight through `tier` (0 for tier 0, saturating above the top tier).
#[must_use]
pub const fn cumulative_weight(tier: u8) -> i64 {
    let top = if tier > MAX_TIER { MAX_TIER } else { tier };
    let mut sum = 0;
    let mut i = 0;
    while i < top as usize {
        sum += TIER_WEIGHTS[i];
        i += 1;
    }
    sum
}

/// Maps a roll in `[0, C(max))` to a tier.
#[must_use]
pub fn tier_for_roll(roll: i64, max_unlocked: u8) -> u8 {
    let max = max_unlocked.clamp(1, MAX_TIER);
    (1..max)
        .find(|tier| roll <= cumulative_weight(*tier))
        .unwrap_or(max)
}

/// Rolls a catch tier no higher than `max_unlocked`.
pub fn select_tier(dice: &Dice, max_unlocked: u8) -> u8 {
    let max = max_unlocked.clamp(1, MAX_TIER);
    if max == 1 {
        return 1;
    }
    tier_for_roll(dice.below(cumulative_weight(max)), max)
}

/// Global-score thresholds that unlock each catch tier. Tier 1 is always
/// unlocked.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Levels {
    /// Score unlocking tier 2.
    pub t2: f64,
    /// Score unlocking tier 3.
    pub t3: f64,
    /// Score unlocking tier 4.
    pub t4: f64,
    /// Score unlocking tier 5.
    pub t5: f64,
}

impl Default for Levels {
    fn default() -> Self {
        Self {
            t2: 100.0,
            t3: 250.0,
            t4: 500.0,
            t5: 1000.0,
        }
    }
}

impl Levels {
    /// Highest tier unlocked at `score`.
    #[must_use]
    pub fn unlocked_tier(&self, score: f64) -> u8 {
        if score >= self.t5 {
            5
        } else if score >= self.t4 {
            4
        } else if score >= self.t3 {
            3
        } else if score >= self.t2 {
            2
        } else {
            1
        }
    }

    /// Thresholds must rise with the tier.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        0.0 <= self.t2 && self.t2 <= self.t3 && self.t3 <= self.t4 && self.t4 <= self.t5
    }
}
