//! # Bait Economy
//!
//! Bait is counted per tier (1-5). The bait-box tier caps how much of any one
//! tier a player can hold. Casting needs at least one bait of the equipped
//! tier; a landed fish or a fish that got away costs one.

use crate::equipment::{EquipmentCategory, EquipmentStore};
use crate::error::{FishingError, FishingResult};
use crate::keys;
use crate::locks::PlayerLocks;
use crate::rarity::MAX_TIER;
use crate::SharedStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The amount that consumes bait after a catch. Skips the capacity check.
pub const FORCE_DECREMENT: i64 = -1;

/// Bait capacity for a bait-box tier. Unknown tiers hold 25.
#[must_use]
pub const fn bait_capacity(baitbox_tier: u8) -> i64 {
    match baitbox_tier {
        1 => 50,
        2 => 75,
        3 => 100,
        4 => 150,
        _ => 25,
    }
}

/// Counts before and after a bait change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaitChange {
    /// Count before.
    pub before: i64,
    /// Count after.
    pub after: i64,
}

/// Bait held per tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaitInventory {
    /// Count per tier; index 0 is tier 1.
    pub tiers: [i64; MAX_TIER as usize],
}

impl BaitInventory {
    /// Count of one tier (0 outside 1..=5).
    #[must_use]
    pub fn tier(&self, tier: u8) -> i64 {
        usize::from(tier)
            .checked_sub(1)
            .and_then(|index| self.tiers.get(index))
            .copied()
            .unwrap_or(0)
    }

    /// Sum over all tiers.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.tiers.iter().sum()
    }
}

fn check_bait_tier(tier: u8) -> FishingResult<()> {
    if !(1..=MAX_TIER).contains(&tier) {
        return Err(FishingError::InvalidTier {
            what: "bait".into(),
            tier: i64::from(tier),
        });
    }
    Ok(())
}

/// Per-player bait counts and equipped bait tier.
#[derive(Clone)]
pub struct BaitEconomy {
    store: SharedStore,
    equipment: EquipmentStore,
    locks: Arc<PlayerLocks>,
}

impl BaitEconomy {
    /// Creates the bait ledger.
    #[must_use]
    pub fn new(store: SharedStore, equipment: EquipmentStore, locks: Arc<PlayerLocks>) -> Self {
        Self {
            store,
            equipment,
            locks,
        }
    }

    /// Capacity per tier, from the bait-box tier.
    pub fn capacity(&self, player: &str) -> FishingResult<i64> {
        let tier = self.equipment.current_tier(player, EquipmentCategory::BaitBox)?;
        Ok(bait_capacity(tier))
    }

    /// Count of one tier.
    pub fn amount(&self, player: &str, tier: u8) -> FishingResult<i64> {
        check_bait_tier(tier)?;
        let raw = self.store.hget(&keys::bait(player), &tier.to_string())?;
        Ok(raw.and_then(|raw| raw.parse().ok()).unwrap_or(0))
    }

    /// Every tier's count.
    pub fn inventory(&self, player: &str) -> FishingResult<BaitInventory> {
        let fields = self.store.hget_all(&keys::bait(player))?;
        let mut inventory = BaitInventory::default();
        for (index, slot) in inventory.tiers.iter_mut().enumerate() {
            *slot = fields
                .get(&(index + 1).to_string())
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(0);
        }
        Ok(inventory)
    }

    /// Bait held across all tiers.
    pub fn total(&self, player: &str) -> FishingResult<i64> {
        Ok(self.inventory(player)?.total())
    }

    /// Adds (or removes, for negative amounts) bait of one tier.
    ///
    /// Any amount other than [`FORCE_DECREMENT`] is checked against capacity.
    /// Removals may not drive the count below zero, except that a forced
    /// decrement of an empty tier leaves it at zero.
    pub fn add(&self, player: &str, tier: u8, amount: i64) -> FishingResult<BaitChange> {
        check_bait_tier(tier)?;

        let _guard = self.locks.lock(player);
        let before = self.amount(player, tier)?;

        if amount != FORCE_DECREMENT {
            let capacity = self.capacity(player)?;
            if before + amount > capacity {
                return Err(FishingError::CapacityExceeded {
                    current: before,
                    amount,
                    capacity,
                });
            }
        }
        if before + amount < 0 {
            if amount == FORCE_DECREMENT {
                return Ok(BaitChange { before, after: before });
            }
            return Err(FishingError::InsufficientBait {
                tier,
                available: before,
                requested: -amount,
            });
        }

        let after = self
            .store
            .hincr_by(&keys::bait(player), &tier.to_string(), amount)?;
        Ok(BaitChange { before, after })
    }

    /// Equipped bait tier (1 when never set).
    pub fn current_tier(&self, player: &str) -> FishingResult<u8> {
        let raw = self.store.get(&keys::bait_tier(player))?;
        match raw.map(|raw| raw.parse::<u8>()) {
            Some(Ok(tier)) if (1..=MAX_TIER).contains(&tier) => Ok(tier),
            Some(_) => {
                tracing::warn!(player, "unreadable bait tier, resetting to 1");
                self.set_current_tier(player, 1)?;
                Ok(1)
            }
            None => {
                self.set_current_tier(player, 1)?;
                Ok(1)
            }
        }
    }

    /// Equips a bait tier.
    pub fn set_current_tier(&self, player: &str, tier: u8) -> FishingResult<()> {
        check_bait_tier(tier)?;
        self.store
            .set(&keys::bait_tier(player), &tier.to_string(), None)?;
        Ok(())
    }

    /// Count of the equipped tier.
    pub fn current_tier_amount(&self, player: &str) -> FishingResult<i64> {
        let tier = self.current_tier(player)?;
        self.amount(player, tier)
    }

    /// Consumes one bait of the equipped tier.
    pub fn decrement_after_catch(&self, player: &str) -> FishingResult<BaitChange> {
        let tier = self.current_tier(player)?;
        self.add(player, tier, FORCE_DECREMENT)
    }
}
