//! # Fish Generation
//!
//! Turns a rolled tier and a location into a concrete fish:
//!
//! 1. pick a species uniformly from the catalog list for (location, tier)
//! 2. draw an integer length in `[min, max)` and add a jitter in `[0, 1)`
//! 3. `ratio = (length - min) / (max - min)`
//! 4. `price = floor(low + ratio * (high - low))` from the tier's bracket

use crate::catalog::{Catalog, PriceBracket};
use crate::dice::Dice;
use crate::error::{FishingError, FishingResult};
use crate::location::Location;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A caught fish.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FishInstance {
    /// Species name.
    pub name: String,
    /// Where it was caught.
    pub location: Location,
    /// Catch tier.
    pub tier: u8,
    /// Length in cm.
    pub size: f64,
    /// Sale price.
    pub price: i64,
    /// Flavor text.
    pub pun: String,
    /// Image reference.
    pub image: String,
}

/// Description used when the trash list is empty.
const FALLBACK_TRASH: &str = "garbage";

/// Price for a fish of `length` within `[min, max]`.
///
/// A degenerate range prices at the bracket low; a missing bracket prices at 0.
#[must_use]
pub fn fish_price(bracket: Option<&PriceBracket>, min: i64, max: i64, length: f64) -> i64 {
    let Some(bracket) = bracket else {
        return 0;
    };
    let ratio = if max > min {
        (length - min as f64) / (max - min) as f64
    } else {
        0.0
    };
    let price = bracket.low as f64 + ratio * (bracket.high - bracket.low) as f64;
    price.floor() as i64
}

/// Draws fish and trash from the catalog.
#[derive(Clone)]
pub struct FishGenerator {
    catalog: Arc<Catalog>,
    dice: Arc<Dice>,
}

impl FishGenerator {
    /// Creates the generator.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, dice: Arc<Dice>) -> Self {
        Self { catalog, dice }
    }

    /// Generates a fish of `tier` at `location`.
    ///
    /// A tier the catalog does not know still yields a fish: it is drawn from
    /// the tier-1 species of the location and priced at 0, with an error log.
    pub fn generate(&self, tier: u8, location: Location) -> FishingResult<FishInstance> {
        let mut species = self.catalog.species(location, tier);
        if species.is_empty() {
            tracing::error!(tier, location = %location, "no species for tier, drawing from tier 1");
            species = self.catalog.species(location, 1);
        }
        let fish = self.dice.pick(species).ok_or_else(|| {
            FishingError::Catalog(format!("no species for {location} tier {tier}"))
        })?;

        let whole = fish.min_size + self.dice.below(fish.max_size - fish.min_size);
        let size = whole as f64 + self.dice.fraction();

        let bracket = self.catalog.price_bracket(tier);
        if bracket.is_none() {
            tracing::error!(tier, location = %location, name = %fish.name, "no price bracket for tier");
        }
        let price = fish_price(bracket, fish.min_size, fish.max_size, size);

        tracing::debug!(tier, location = %location, name = %fish.name, size, price, "fish generated");
        Ok(FishInstance {
            name: fish.name.clone(),
            location,
            tier,
            size,
            price,
            pun: fish.pun.clone(),
            image: fish.image.clone(),
        })
    }

    /// A random trash description.
    #[must_use]
    pub fn garbage(&self) -> String {
        self.dice
            .pick(self.catalog.trash())
            .map_or_else(|| FALLBACK_TRASH.to_string(), Clone::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::minimal_toml;

    fn generator() -> FishGenerator {
        FishGenerator::new(
            Arc::new(Catalog::from_toml_str(&minimal_toml()).unwrap()),
            Arc::new(Dice::seeded(77)),
        )
    }

    #[test]
    fn test_price_formula() {
        let bracket = PriceBracket {
            tier: 1,
            low: 10,
            high: 30,
        };
        assert_eq!(fish_price(Some(&bracket), 10, 20, 10.0), 10);
        assert_eq!(fish_price(Some(&bracket), 10, 20, 15.0), 20);
        assert_eq!(fish_price(Some(&bracket), 10, 20, 15.99), 21);
        assert_eq!(fish_price(Some(&bracket), 10, 10, 10.5), 10);
        assert_eq!(fish_price(None, 10, 20, 15.0), 0);
    }

    #[test]
    fn test_generated_fish_within_bounds() {
        let generator = generator();
        for tier in 1..=5 {
            for location in Location::ALL {
                let fish = generator.generate(tier, location).unwrap();
                assert_eq!(fish.name, format!("{location}-{tier}"));
                assert!((10.0..20.0).contains(&fish.size), "size {}", fish.size);
                let low = i64::from(tier) * 10;
                assert!((low..low + 20).contains(&fish.price), "price {}", fish.price);
            }
        }
    }

    #[test]
    fn test_unknown_tier_prices_at_zero() {
        let fish = generator().generate(9, Location::Lake).unwrap();
        assert_eq!(fish.tier, 9);
        assert_eq!(fish.price, 0);
        assert_eq!(fish.name, "lake-1");
        assert!((10.0..20.0).contains(&fish.size), "size {}", fish.size);
    }

    #[test]
    fn test_missing_bracket_prices_at_zero() {
        let catalog = Catalog::from_toml_str(&minimal_toml()).unwrap();
        let generator = FishGenerator::new(Arc::new(catalog), Arc::new(Dice::seeded(5)));
        // Tier 0 has neither species nor bracket.
        let fish = generator.generate(0, Location::Ocean).unwrap();
        assert_eq!(fish.price, 0);
        assert_eq!(fish.location, Location::Ocean);
    }

    #[test]
    fn test_garbage_description() {
        assert_eq!(generator().garbage(), "an old boot");
    }
}
