//! # Rate Formulas
//!
//! The three percentages that drive a cast. Bite rate follows the density
//! of the current location; catch rate follows the rod; fish rate follows
//! the hook.

/// Bite rate (percent) at a given location density.
///
/// - `density == 100` -> 50
/// - `density < 100` -> `floor(0.4 * density + 10)`
/// - `density > 100` -> `floor(0.25 * density + 25)`
///
/// Evaluated in exact integer arithmetic and clamped to `[0, 100]`, which
/// only matters for negative or very large densities.
#[must_use]
pub fn bite_rate(density: i64) -> i64 {
    let rate = match density.cmp(&100) {
        std::cmp::Ordering::Equal => 50,
        std::cmp::Ordering::Less => (4 * density).div_euclid(10) + 10,
        std::cmp::Ordering::Greater => density.div_euclid(4) + 25,
    };
    rate.clamp(0, 100)
}

/// Catch rate (percent) for an equipped rod tier. Unknown tiers give 50.
#[must_use]
pub const fn catch_rate(rod_tier: u8) -> i64 {
    match rod_tier {
        2 => 55,
        3 => 60,
        4 => 70,
        5 => 80,
        _ => 50,
    }
}

/// Fish rate (percent) for an equipped hook tier. Unknown tiers give 50.
#[must_use]
pub const fn fish_rate(hook_tier: u8) -> i64 {
    match hook_tier {
        2 => 60,
        3 => 70,
        4 => 80,
        5 => 90,
        _ => 50,
    }
}

/// The three percentages for one cast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CastRates {
    /// Chance a fish bites.
    pub bite: i64,
    /// Chance a bite is reeled in.
    pub catch: i64,
    /// Chance a reeled catch is a fish rather than garbage.
    pub fish: i64,
}

impl CastRates {
    /// Derives the rates from density and gear.
    #[must_use]
    pub fn derive(density: i64, rod_tier: u8, hook_tier: u8) -> Self {
        Self {
            bite: bite_rate(density),
            catch: catch_rate(rod_tier),
            fish: fish_rate(hook_tier),
        }
    }

    /// Probability that a cast lands a fish.
    #[must_use]
    pub fn fish_probability(&self) -> f64 {
        (self.bite as f64 / 100.0) * (self.catch as f64 / 100.0) * (self.fish as f64 / 100.0)
    }
}
