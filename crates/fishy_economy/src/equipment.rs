//! # Equipment
//!
//! Five gear categories, each with an equipped tier and a set of owned
//! variants. Equipped tier and owned set are independent records: buying
//! a tier does not have to own it, and owning a variant does not equip it.

use crate::error::{FishingError, FishingResult};
use crate::keys;
use crate::locks::PlayerLocks;
use crate::rarity::MAX_TIER;
use crate::SharedStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Gear category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentCategory {
    /// Bait type.
    Bait,
    /// Rod: drives catch rate.
    Rod,
    /// Hook: drives fish rate.
    Hook,
    /// Vehicle: drives fish inventory capacity.
    Vehicle,
    /// Bait box: drives bait capacity.
    #[serde(alias = "bait_box")]
    BaitBox,
}

impl EquipmentCategory {
    /// Every category, in display order.
    pub const ALL: [Self; 5] = [Self::Bait, Self::Rod, Self::Hook, Self::Vehicle, Self::BaitBox];

    /// Gear without which casting is refused.
    pub const REQUIRED: [Self; 2] = [Self::Rod, Self::Hook];

    /// Stored field name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bait => "bait",
            Self::Rod => "rod",
            Self::Hook => "hook",
            Self::Vehicle => "vehicle",
            Self::BaitBox => "baitbox",
        }
    }
}

impl fmt::Display for EquipmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EquipmentCategory {
    type Err = FishingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bait" => Ok(Self::Bait),
            "rod" => Ok(Self::Rod),
            "hook" => Ok(Self::Hook),
            "vehicle" => Ok(Self::Vehicle),
            "baitbox" | "bait_box" => Ok(Self::BaitBox),
            _ => Err(FishingError::InvalidItem(raw.to_string())),
        }
    }
}

/// One category's state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentSlot {
    /// Equipped tier (0 = none).
    pub current: u8,
    /// Owned variants, ascending.
    pub owned: Vec<u8>,
}

/// A player's gear across all categories.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    /// Bait type.
    pub bait: EquipmentSlot,
    /// Rod.
    pub rod: EquipmentSlot,
    /// Hook.
    pub hook: EquipmentSlot,
    /// Vehicle.
    pub vehicle: EquipmentSlot,
    /// Bait box.
    pub baitbox: EquipmentSlot,
}

impl Equipment {
    /// One category's slot.
    #[must_use]
    pub const fn slot(&self, category: EquipmentCategory) -> &EquipmentSlot {
        match category {
            EquipmentCategory::Bait => &self.bait,
            EquipmentCategory::Rod => &self.rod,
            EquipmentCategory::Hook => &self.hook,
            EquipmentCategory::Vehicle => &self.vehicle,
            EquipmentCategory::BaitBox => &self.baitbox,
        }
    }

    fn slot_mut(&mut self, category: EquipmentCategory) -> &mut EquipmentSlot {
        match category {
            EquipmentCategory::Bait => &mut self.bait,
            EquipmentCategory::Rod => &mut self.rod,
            EquipmentCategory::Hook => &mut self.hook,
            EquipmentCategory::Vehicle => &mut self.vehicle,
            EquipmentCategory::BaitBox => &mut self.baitbox,
        }
    }

    /// Required categories still at tier 0.
    #[must_use]
    pub fn missing_required(&self) -> Vec<EquipmentCategory> {
        EquipmentCategory::REQUIRED
            .into_iter()
            .filter(|category| self.slot(*category).current == 0)
            .collect()
    }
}

fn check_tier(category: EquipmentCategory, tier: u8) -> FishingResult<()> {
    if tier > MAX_TIER {
        return Err(FishingError::InvalidTier {
            what: category.as_str().to_string(),
            tier: i64::from(tier),
        });
    }
    Ok(())
}

/// Per-player gear records.
#[derive(Clone)]
pub struct EquipmentStore {
    store: SharedStore,
    locks: Arc<PlayerLocks>,
}

impl EquipmentStore {
    /// Creates the gear accessor.
    #[must_use]
    pub fn new(store: SharedStore, locks: Arc<PlayerLocks>) -> Self {
        Self { store, locks }
    }

    /// All categories. Absent records read as tier 0 with nothing owned.
    pub fn get(&self, player: &str) -> FishingResult<Equipment> {
        let key = keys::equipment(player);
        let fields = self.store.hget_all(&key)?;
        let mut equipment = Equipment::default();

        for (field, raw) in &fields {
            let Ok(category) = field.parse::<EquipmentCategory>() else {
                continue;
            };
            match raw.parse::<u8>() {
                Ok(tier) => equipment.slot_mut(category).current = tier,
                Err(_) => {
                    tracing::warn!(player, field = %field, value = %raw, "unreadable equipment tier, dropping");
                    self.store.hdel(&key, field)?;
                }
            }
        }
        for category in EquipmentCategory::ALL {
            equipment.slot_mut(category).owned = self.owned(player, category)?;
        }
        Ok(equipment)
    }

    /// Equipped tier of one category.
    pub fn current_tier(&self, player: &str, category: EquipmentCategory) -> FishingResult<u8> {
        let raw = self
            .store
            .hget(&keys::equipment(player), category.as_str())?;
        Ok(raw.and_then(|raw| raw.parse().ok()).unwrap_or(0))
    }

    /// Sets the equipped tier without any progression check.
    pub fn edit_tier_unsafe(&self, player: &str, category: &str, tier: u8) -> FishingResult<()> {
        let category = category.parse::<EquipmentCategory>()?;
        self.set_tier(player, category, tier)
    }

    /// Sets the equipped tier only if the player holds exactly the tier below.
    pub fn edit_tier_safe(&self, player: &str, category: &str, tier: u8) -> FishingResult<()> {
        let category = category.parse::<EquipmentCategory>()?;
        check_tier(category, tier)?;

        let _guard = self.locks.lock(player);
        let current = self.current_tier(player, category)?;
        if tier.checked_sub(1) != Some(current) {
            return Err(FishingError::ProgressionViolation {
                category: category.as_str().to_string(),
                current,
                requested: tier,
            });
        }
        self.write_tier(player, category, tier)
    }

    /// Sets the equipped tier of a known category.
    pub fn set_tier(&self, player: &str, category: EquipmentCategory, tier: u8) -> FishingResult<()> {
        check_tier(category, tier)?;
        self.write_tier(player, category, tier)
    }

    fn write_tier(&self, player: &str, category: EquipmentCategory, tier: u8) -> FishingResult<()> {
        self.store.hset(
            &keys::equipment(player),
            category.as_str(),
            &tier.to_string(),
        )?;
        tracing::debug!(player, category = %category, tier, "equipment tier set");
        Ok(())
    }

    /// Owned variants of one category, ascending.
    pub fn owned(&self, player: &str, category: EquipmentCategory) -> FishingResult<Vec<u8>> {
        let members = self.store.smembers(&keys::owned(player, category.as_str()))?;
        let mut owned: Vec<u8> = members
            .iter()
            .filter_map(|raw| match raw.parse::<u8>() {
                Ok(tier) => Some(tier),
                Err(_) => {
                    tracing::warn!(player, category = %category, value = %raw, "unreadable owned variant");
                    None
                }
            })
            .collect();
        owned.sort_unstable();
        Ok(owned)
    }

    /// Adds variants to the owned set. Returns how many were new.
    pub fn add_owned(
        &self,
        player: &str,
        category: EquipmentCategory,
        variants: &[u8],
    ) -> FishingResult<usize> {
        for tier in variants {
            check_tier(category, *tier)?;
        }
        if variants.is_empty() {
            return Ok(0);
        }
        let members: Vec<String> = variants.iter().map(u8::to_string).collect();
        Ok(self
            .store
            .sadd(&keys::owned(player, category.as_str()), &members)?)
    }

    /// Required categories the player has not equipped.
    pub fn missing_required_gear(&self, player: &str) -> FishingResult<Vec<EquipmentCategory>> {
        let mut missing = Vec::new();
        for category in EquipmentCategory::REQUIRED {
            if self.current_tier(player, category)? == 0 {
                missing.push(category);
            }
        }
        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fishy_store::{KeyValueStore, MemoryStore};

    fn equipment() -> (EquipmentStore, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (
            EquipmentStore::new(store.clone(), Arc::new(PlayerLocks::default())),
            store,
        )
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("Rod".parse::<EquipmentCategory>().unwrap(), EquipmentCategory::Rod);
        assert_eq!(
            "bait_box".parse::<EquipmentCategory>().unwrap(),
            EquipmentCategory::BaitBox
        );
        assert_eq!(
            "net".parse::<EquipmentCategory>(),
            Err(FishingError::InvalidItem("net".into()))
        );
    }

    #[test]
    fn test_defaults_to_nothing() {
        let (gear, _) = equipment();
        let equipment = gear.get("p").unwrap();
        assert_eq!(equipment, Equipment::default());
        assert_eq!(
            gear.missing_required_gear("p").unwrap(),
            vec![EquipmentCategory::Rod, EquipmentCategory::Hook]
        );
    }

    #[test]
    fn test_unsafe_edit() {
        let (gear, _) = equipment();
        gear.edit_tier_unsafe("p", "rod", 3).unwrap();
        assert_eq!(gear.current_tier("p", EquipmentCategory::Rod).unwrap(), 3);
        assert_eq!(
            gear.missing_required_gear("p").unwrap(),
            vec![EquipmentCategory::Hook]
        );
        assert!(matches!(
            gear.edit_tier_unsafe("p", "boat", 1),
            Err(FishingError::InvalidItem(_))
        ));
        assert!(matches!(
            gear.edit_tier_unsafe("p", "rod", 6),
            Err(FishingError::InvalidTier { .. })
        ));
    }

    #[test]
    fn test_safe_edit_requires_previous_tier() {
        let (gear, _) = equipment();
        gear.edit_tier_safe("p", "hook", 1).unwrap();
        gear.edit_tier_safe("p", "hook", 2).unwrap();

        assert_eq!(
            gear.edit_tier_safe("p", "hook", 4),
            Err(FishingError::ProgressionViolation {
                category: "hook".into(),
                current: 2,
                requested: 4,
            })
        );
        assert!(gear.edit_tier_safe("p", "hook", 2).is_err());
        assert!(gear.edit_tier_safe("p", "hook", 0).is_err());
        assert_eq!(gear.current_tier("p", EquipmentCategory::Hook).unwrap(), 2);
    }

    #[test]
    fn test_owned_is_a_union() {
        let (gear, _) = equipment();
        assert_eq!(gear.add_owned("p", EquipmentCategory::Rod, &[2, 1]).unwrap(), 2);
        assert_eq!(gear.add_owned("p", EquipmentCategory::Rod, &[2, 3]).unwrap(), 1);
        assert_eq!(gear.owned("p", EquipmentCategory::Rod).unwrap(), vec![1, 2, 3]);
        assert_eq!(gear.get("p").unwrap().rod.owned, vec![1, 2, 3]);
        // Owning does not equip.
        assert_eq!(gear.current_tier("p", EquipmentCategory::Rod).unwrap(), 0);
    }

    #[test]
    fn test_unreadable_tier_is_dropped() {
        let (gear, store) = equipment();
        store.hset("user:inventory:p", "vehicle", "boat").unwrap();
        store.hset("user:inventory:p", "rod", "2").unwrap();

        let equipment = gear.get("p").unwrap();
        assert_eq!(equipment.vehicle.current, 0);
        assert_eq!(equipment.rod.current, 2);
        assert_eq!(store.hget("user:inventory:p", "vehicle").unwrap(), None);
    }
}
