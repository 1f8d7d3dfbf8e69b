//! # Fish Inventory
//!
//! What a player is carrying until they sell. Fish and legendaries take up
//! vehicle space; garbage is counted but takes none.

use crate::equipment::{EquipmentCategory, EquipmentStore};
use crate::error::{FishingError, FishingResult};
use crate::keys;
use crate::locks::PlayerLocks;
use crate::SharedStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Fish capacity for a vehicle tier. Unknown tiers carry 25.
#[must_use]
pub const fn fish_capacity(vehicle_tier: u8) -> i64 {
    match vehicle_tier {
        1 => 50,
        2 => 100,
        3 => 250,
        4 => 500,
        _ => 25,
    }
}

/// Kind of a recorded catch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatchKind {
    /// Tier 1-4 fish.
    Fish,
    /// Trash.
    Garbage,
    /// Tier 5 fish.
    Legendary,
}

impl CatchKind {
    /// Stored counter name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fish => "fish",
            Self::Garbage => "garbage",
            Self::Legendary => "legendary",
        }
    }

    /// Kind recorded for a fish of the given tier.
    #[must_use]
    pub const fn for_tier(tier: u8) -> Self {
        if tier >= 5 {
            Self::Legendary
        } else {
            Self::Fish
        }
    }
}

/// Inventory counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FishInventory {
    /// Fish held.
    pub fish: i64,
    /// Garbage held.
    pub garbage: i64,
    /// Legendary fish held.
    pub legendary: i64,
    /// Total sale value.
    pub worth: i64,
}

impl FishInventory {
    /// Space used: fish plus legendaries.
    #[must_use]
    pub const fn size(&self) -> i64 {
        self.fish + self.legendary
    }

    /// Count held of one kind.
    #[must_use]
    pub const fn count(&self, kind: CatchKind) -> i64 {
        match kind {
            CatchKind::Fish => self.fish,
            CatchKind::Garbage => self.garbage,
            CatchKind::Legendary => self.legendary,
        }
    }
}

const WORTH: &str = "worth";

/// Per-player fish inventory.
#[derive(Clone)]
pub struct InventoryLedger {
    store: SharedStore,
    equipment: EquipmentStore,
    locks: Arc<PlayerLocks>,
}

impl InventoryLedger {
    /// Creates the inventory ledger.
    #[must_use]
    pub fn new(store: SharedStore, equipment: EquipmentStore, locks: Arc<PlayerLocks>) -> Self {
        Self {
            store,
            equipment,
            locks,
        }
    }

    /// Current counters (all zero when absent).
    pub fn get(&self, player: &str) -> FishingResult<FishInventory> {
        let fields = self.store.hget_all(&keys::fish_inventory(player))?;
        let read = |name: &str| -> i64 {
            match fields.get(name).map(|raw| raw.parse::<i64>()) {
                Some(Ok(value)) => value,
                Some(Err(_)) => {
                    tracing::warn!(player, field = name, "unreadable inventory counter, reading as 0");
                    0
                }
                None => 0,
            }
        };
        Ok(FishInventory {
            fish: read(CatchKind::Fish.as_str()),
            garbage: read(CatchKind::Garbage.as_str()),
            legendary: read(CatchKind::Legendary.as_str()),
            worth: read(WORTH),
        })
    }

    /// Space used.
    pub fn size(&self, player: &str) -> FishingResult<i64> {
        Ok(self.get(player)?.size())
    }

    /// Space available, from the vehicle tier.
    pub fn capacity(&self, player: &str) -> FishingResult<i64> {
        let tier = self.equipment.current_tier(player, EquipmentCategory::Vehicle)?;
        Ok(fish_capacity(tier))
    }

    /// Records one catch and its worth.
    ///
    /// Rejected with [`FishingError::InventoryFull`] when the inventory is
    /// already at capacity, whatever the kind. The count and the worth are
    /// written together, so a failed write changes neither.
    pub fn add(&self, player: &str, kind: CatchKind, worth: i64) -> FishingResult<()> {
        let _guard = self.locks.lock(player);

        let held = self.get(player)?;
        let size = held.size();
        let capacity = self.capacity(player)?;
        if size >= capacity {
            return Err(FishingError::InventoryFull { size, capacity });
        }

        self.store.hset_many(
            &keys::fish_inventory(player),
            &[
                (kind.as_str(), (held.count(kind) + 1).to_string()),
                (WORTH, (held.worth + worth).to_string()),
            ],
        )?;
        Ok(())
    }

    /// Empties the inventory and returns what it held.
    pub fn sell(&self, player: &str) -> FishingResult<FishInventory> {
        let _guard = self.locks.lock(player);

        let snapshot = self.get(player)?;
        self.store.hset_many(
            &keys::fish_inventory(player),
            &[
                (CatchKind::Fish.as_str(), "0".to_string()),
                (CatchKind::Garbage.as_str(), "0".to_string()),
                (CatchKind::Legendary.as_str(), "0".to_string()),
                (WORTH, "0".to_string()),
            ],
        )?;
        tracing::debug!(player, fish = snapshot.fish, worth = snapshot.worth, "inventory sold");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fishy_store::{KeyValueStore, MemoryStore};

    fn ledger() -> (InventoryLedger, EquipmentStore, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let locks = Arc::new(PlayerLocks::default());
        let equipment = EquipmentStore::new(store.clone(), locks.clone());
        (
            InventoryLedger::new(store.clone(), equipment.clone(), locks),
            equipment,
            store,
        )
    }

    #[test]
    fn test_capacity_table() {
        assert_eq!(fish_capacity(0), 25);
        assert_eq!(fish_capacity(1), 50);
        assert_eq!(fish_capacity(2), 100);
        assert_eq!(fish_capacity(3), 250);
        assert_eq!(fish_capacity(4), 500);
    }

    #[test]
    fn test_kind_for_tier() {
        assert_eq!(CatchKind::for_tier(1), CatchKind::Fish);
        assert_eq!(CatchKind::for_tier(4), CatchKind::Fish);
        assert_eq!(CatchKind::for_tier(5), CatchKind::Legendary);
    }

    #[test]
    fn test_add_and_size() {
        let (inventory, _, _) = ledger();
        inventory.add("p", CatchKind::Fish, 40).unwrap();
        inventory.add("p", CatchKind::Legendary, 900).unwrap();
        inventory.add("p", CatchKind::Garbage, 5).unwrap();

        let held = inventory.get("p").unwrap();
        assert_eq!(
            held,
            FishInventory {
                fish: 1,
                garbage: 1,
                legendary: 1,
                worth: 945
            }
        );
        assert_eq!(inventory.size("p").unwrap(), 2);
    }

    #[test]
    fn test_unreadable_worth_rewritten_with_count() {
        let (inventory, _, store) = ledger();
        store.hset("fish:p", "fish", "3").unwrap();
        store.hset("fish:p", "worth", "lots").unwrap();

        inventory.add("p", CatchKind::Fish, 40).unwrap();
        let held = inventory.get("p").unwrap();
        assert_eq!(held.fish, 4);
        assert_eq!(held.worth, 40);
        assert_eq!(store.hget("fish:p", "worth").unwrap().as_deref(), Some("40"));
    }

    #[test]
    fn test_failed_add_changes_nothing() {
        let (inventory, _, store) = ledger();
        inventory.add("p", CatchKind::Fish, 10).unwrap();

        store.set_unavailable(true);
        assert!(matches!(
            inventory.add("p", CatchKind::Fish, 10),
            Err(FishingError::Store(_))
        ));
        store.set_unavailable(false);

        assert_eq!(
            inventory.get("p").unwrap(),
            FishInventory {
                fish: 1,
                worth: 10,
                ..FishInventory::default()
            }
        );
    }

    #[test]
    fn test_full_inventory_rejects_any_kind() {
        let (inventory, _, store) = ledger();
        store.hset("fish:p", "fish", "24").unwrap();
        store.hset("fish:p", "legendary", "1").unwrap();

        for kind in [CatchKind::Fish, CatchKind::Garbage, CatchKind::Legendary] {
            assert_eq!(
                inventory.add("p", kind, 10),
                Err(FishingError::InventoryFull {
                    size: 25,
                    capacity: 25
                })
            );
        }
    }

    #[test]
    fn test_bigger_vehicle_makes_room() {
        let (inventory, gear, store) = ledger();
        store.hset("fish:p", "fish", "25").unwrap();
        assert!(inventory.add("p", CatchKind::Fish, 1).is_err());

        gear.set_tier("p", EquipmentCategory::Vehicle, 1).unwrap();
        assert_eq!(inventory.capacity("p").unwrap(), 50);
        inventory.add("p", CatchKind::Fish, 1).unwrap();
    }

    #[test]
    fn test_sell_returns_snapshot_and_resets() {
        let (inventory, _, _) = ledger();
        inventory.add("p", CatchKind::Fish, 30).unwrap();
        inventory.add("p", CatchKind::Fish, 12).unwrap();
        inventory.add("p", CatchKind::Garbage, 5).unwrap();

        let sold = inventory.sell("p").unwrap();
        assert_eq!(sold.fish, 2);
        assert_eq!(sold.garbage, 1);
        assert_eq!(sold.worth, 47);
        assert_eq!(inventory.get("p").unwrap(), FishInventory::default());
    }
}
