//! # Catalog
//!
//! Static game data shared by every player: fish species per location and
//! tier, price brackets, trash and treasure, shop items and the score
//! thresholds that unlock catch tiers.
//!
//! Loaded once at startup and never mutated. Validation runs at load time so
//! a cast never discovers a hole in the data.
//!
//! Gear effects are fixed by the rate and capacity tables. A shop item may
//! state its effect for display, but it has to agree with the table.
//!
//! ```toml
//! [levels]
//! t2 = 100
//! t3 = 250
//! t4 = 500
//! t5 = 1000
//!
//! [[prices]]
//! tier = 1
//! low = 5
//! high = 15
//!
//! [[species]]
//! location = "lake"
//! tier = 1
//! name = "Bluegill"
//! min_size = 10
//! max_size = 25
//! pun = "Feeling a little blue?"
//! image = "bluegill.png"
//! ```

use crate::bait::bait_capacity;
use crate::equipment::EquipmentCategory;
use crate::error::{FishingError, FishingResult};
use crate::inventory::fish_capacity;
use crate::location::Location;
use crate::rarity::{Levels, MAX_TIER};
use crate::rates::{catch_rate, fish_rate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One fish species.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Species {
    /// Where it lives.
    pub location: Location,
    /// Catch tier.
    pub tier: u8,
    /// Display name.
    pub name: String,
    /// Smallest length (cm).
    pub min_size: i64,
    /// Largest length (cm).
    pub max_size: i64,
    /// Flavor text.
    #[serde(default)]
    pub pun: String,
    /// Image reference.
    #[serde(default)]
    pub image: String,
}

/// Sale price range of one catch tier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PriceBracket {
    /// Catch tier.
    pub tier: u8,
    /// Price of the smallest fish.
    pub low: i64,
    /// Price approached by the largest fish.
    pub high: i64,
}

/// A treasure find.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Treasure {
    /// Display name.
    pub name: String,
    /// Flavor text.
    pub description: String,
    /// Sale value.
    pub worth: i64,
}

/// A shop item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemDef {
    /// Equipment category.
    pub category: EquipmentCategory,
    /// Tier within the category.
    pub tier: u8,
    /// Display name.
    pub name: String,
    /// Price.
    pub cost: i64,
    /// Rate or capacity granted. Filled from the gear tables when omitted.
    #[serde(default)]
    pub effect: Option<i64>,
    /// Shop text.
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default)]
    levels: Levels,
    prices: Vec<PriceBracket>,
    species: Vec<Species>,
    #[serde(default)]
    trash: Vec<String>,
    #[serde(default)]
    treasure: Vec<Treasure>,
    #[serde(default)]
    items: Vec<ItemDef>,
}

/// Validated, read-only game data.
#[derive(Clone, Debug)]
pub struct Catalog {
    species: HashMap<(Location, u8), Vec<Species>>,
    prices: HashMap<u8, PriceBracket>,
    trash: Vec<String>,
    treasure: Vec<Treasure>,
    items: Vec<ItemDef>,
    levels: Levels,
}

impl Catalog {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(raw: &str) -> FishingResult<Self> {
        let file: CatalogFile =
            toml::from_str(raw).map_err(|e| FishingError::Catalog(e.to_string()))?;
        Self::build(file)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> FishingResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| FishingError::Catalog(format!("{}: {e}", path.display())))?;
        let catalog = Self::from_toml_str(&raw)?;
        tracing::info!(
            path = %path.display(),
            species = catalog.species.values().map(Vec::len).sum::<usize>(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    fn build(file: CatalogFile) -> FishingResult<Self> {
        if !file.levels.is_ordered() {
            return Err(FishingError::Catalog("level thresholds must rise with tier".into()));
        }

        let mut prices = HashMap::new();
        for bracket in file.prices {
            if bracket.low > bracket.high || bracket.low < 0 {
                return Err(FishingError::Catalog(format!(
                    "tier {} price bracket [{}, {}] is inverted or negative",
                    bracket.tier, bracket.low, bracket.high
                )));
            }
            if prices.insert(bracket.tier, bracket).is_some() {
                return Err(FishingError::Catalog(format!(
                    "duplicate price bracket for tier {}",
                    bracket.tier
                )));
            }
        }

        let mut species: HashMap<(Location, u8), Vec<Species>> = HashMap::new();
        for fish in file.species {
            if fish.min_size > fish.max_size {
                return Err(FishingError::Catalog(format!(
                    "{} has inverted size range [{}, {}]",
                    fish.name, fish.min_size, fish.max_size
                )));
            }
            species.entry((fish.location, fish.tier)).or_default().push(fish);
        }

        for tier in 1..=MAX_TIER {
            if !prices.contains_key(&tier) {
                return Err(FishingError::Catalog(format!("missing price bracket for tier {tier}")));
            }
            for location in Location::ALL {
                if species.get(&(location, tier)).map_or(true, Vec::is_empty) {
                    return Err(FishingError::Catalog(format!(
                        "no species for {location} tier {tier}"
                    )));
                }
            }
        }

        if let Some(treasure) = file.treasure.iter().find(|t| t.worth < 0) {
            return Err(FishingError::Catalog(format!(
                "treasure {} has negative worth",
                treasure.name
            )));
        }
        let mut items = file.items;
        for item in &mut items {
            if item.tier == 0 || item.tier > MAX_TIER || item.cost < 0 {
                return Err(FishingError::Catalog(format!(
                    "item {} has an invalid tier or cost",
                    item.name
                )));
            }
            let table = gear_effect(item.category, item.tier);
            if let Some(effect) = item.effect.filter(|&effect| effect != table) {
                return Err(FishingError::Catalog(format!(
                    "item {} lists effect {effect}, but {} tier {} gives {table}",
                    item.name, item.category, item.tier
                )));
            }
            item.effect = Some(table);
        }

        Ok(Self {
            species,
            prices,
            trash: file.trash,
            treasure: file.treasure,
            items,
            levels: file.levels,
        })
    }

    /// Species living at `location` in `tier` (empty if none).
    #[must_use]
    pub fn species(&self, location: Location, tier: u8) -> &[Species] {
        self.species
            .get(&(location, tier))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Price bracket of a catch tier.
    #[must_use]
    pub fn price_bracket(&self, tier: u8) -> Option<&PriceBracket> {
        self.prices.get(&tier)
    }

    /// Trash descriptions.
    #[must_use]
    pub fn trash(&self) -> &[String] {
        &self.trash
    }

    /// Treasure finds, for display.
    #[must_use]
    pub fn treasure(&self) -> &[Treasure] {
        &self.treasure
    }

    /// Shop items of one category, by tier.
    #[must_use]
    pub fn items(&self, category: EquipmentCategory) -> Vec<&ItemDef> {
        let mut items: Vec<&ItemDef> = self
            .items
            .iter()
            .filter(|item| item.category == category)
            .collect();
        items.sort_by_key(|item| item.tier);
        items
    }

    /// Tier unlock thresholds.
    #[must_use]
    pub const fn levels(&self) -> &Levels {
        &self.levels
    }
}

/// What one tier of a category does, from the fixed gear tables.
#[must_use]
pub fn gear_effect(category: EquipmentCategory, tier: u8) -> i64 {
    match category {
        EquipmentCategory::Rod => catch_rate(tier),
        EquipmentCategory::Hook => fish_rate(tier),
        EquipmentCategory::Vehicle => fish_capacity(tier),
        EquipmentCategory::BaitBox => bait_capacity(tier),
        EquipmentCategory::Bait => i64::from(tier),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Smallest catalog that passes validation: one species per slot.
    pub(crate) fn minimal_toml() -> String {
        let mut raw = String::from("trash = [\"an old boot\"]\n\n");
        for tier in 1..=MAX_TIER {
            raw.push_str(&format!(
                "[[prices]]\ntier = {tier}\nlow = {}\nhigh = {}\n\n",
                u32::from(tier) * 10,
                u32::from(tier) * 10 + 20
            ));
            for location in Location::ALL {
                raw.push_str(&format!(
                    "[[species]]\nlocation = \"{location}\"\ntier = {tier}\nname = \"{location}-{tier}\"\nmin_size = 10\nmax_size = 20\n\n"
                ));
            }
        }
        raw
    }

    #[test]
    fn test_minimal_catalog() {
        let catalog = Catalog::from_toml_str(&minimal_toml()).unwrap();
        assert_eq!(catalog.species(Location::River, 3)[0].name, "river-3");
        assert_eq!(catalog.price_bracket(2).unwrap().low, 20);
        assert!(catalog.price_bracket(6).is_none());
        assert_eq!(catalog.levels(), &Levels::default());
        assert!(catalog.species(Location::Lake, 9).is_empty());
    }

    #[test]
    fn test_missing_species_rejected() {
        let raw = minimal_toml().replace(
            "location = \"ocean\"\ntier = 4\n",
            "location = \"ocean\"\ntier = 3\n",
        );
        assert!(matches!(
            Catalog::from_toml_str(&raw),
            Err(FishingError::Catalog(msg)) if msg.contains("ocean tier 4")
        ));
    }

    #[test]
    fn test_inverted_size_rejected() {
        let raw = minimal_toml().replacen("min_size = 10\nmax_size = 20", "min_size = 30\nmax_size = 20", 1);
        assert!(matches!(
            Catalog::from_toml_str(&raw),
            Err(FishingError::Catalog(_))
        ));
    }

    #[test]
    fn test_missing_price_rejected() {
        let raw = minimal_toml().replace("tier = 5\nlow = 50\nhigh = 70\n", "tier = 6\nlow = 50\nhigh = 70\n");
        assert!(matches!(
            Catalog::from_toml_str(&raw),
            Err(FishingError::Catalog(msg)) if msg.contains("tier 5")
        ));
    }

    #[test]
    fn test_shipped_catalog_is_valid() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/catalog.toml");
        let catalog = Catalog::load(path).unwrap();
        assert!(!catalog.trash().is_empty());
        assert!(!catalog.treasure().is_empty());
        let rods = catalog.items(EquipmentCategory::Rod);
        assert_eq!(rods.len(), 5);
        assert_eq!(rods[0].tier, 1);
        for category in EquipmentCategory::ALL {
            for item in catalog.items(category) {
                assert_eq!(item.effect, Some(gear_effect(category, item.tier)), "{}", item.name);
            }
        }
    }

    fn with_item(item: &str) -> String {
        format!("{}[[items]]\n{item}\n", minimal_toml())
    }

    #[test]
    fn test_item_effect_must_match_gear_table() {
        let raw = with_item("category = \"rod\"\ntier = 3\nname = \"Graphite Rod\"\ncost = 500\neffect = 95");
        assert!(matches!(
            Catalog::from_toml_str(&raw),
            Err(FishingError::Catalog(msg)) if msg.contains("gives 60")
        ));

        let raw = with_item("category = \"rod\"\ntier = 3\nname = \"Graphite Rod\"\ncost = 500\neffect = 60");
        let catalog = Catalog::from_toml_str(&raw).unwrap();
        assert_eq!(catalog.items(EquipmentCategory::Rod)[0].effect, Some(catch_rate(3)));
    }

    #[test]
    fn test_omitted_effect_filled_from_table() {
        let raw = with_item("category = \"vehicle\"\ntier = 2\nname = \"Rowboat\"\ncost = 800");
        let catalog = Catalog::from_toml_str(&raw).unwrap();
        assert_eq!(catalog.items(EquipmentCategory::Vehicle)[0].effect, Some(100));
    }

    #[test]
    fn test_tier_zero_item_rejected() {
        let raw = with_item("category = \"hook\"\ntier = 0\nname = \"Nothing\"\ncost = 0");
        assert!(Catalog::from_toml_str(&raw).is_err());
    }
}
