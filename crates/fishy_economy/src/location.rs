//! # Locations and Fish Density
//!
//! Each player sees three fishing spots. Every landed fish drains one or two
//! units of density from the spot it came from and moves them to one of the
//! other two, so the sum over all spots never changes. The record carries a
//! TTL: a player who stops fishing for long enough finds every spot back at
//! the baseline of 100.
//!
//! Donor density is not clamped and may go negative after a long streak in
//! one spot. [`crate::rates::bite_rate`] keeps the derived bite rate in range.

use crate::dice::Dice;
use crate::error::{FishingError, FishingResult};
use crate::keys;
use crate::locks::PlayerLocks;
use crate::SharedStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Density every spot starts at and resets to.
pub const BASELINE_DENSITY: i64 = 100;

/// A fishing spot.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// The default spot.
    #[default]
    Lake,
    /// River.
    River,
    /// Ocean.
    Ocean,
}

impl Location {
    /// Every location, in display order.
    pub const ALL: [Self; 3] = [Self::Lake, Self::River, Self::Ocean];

    /// Lowercase name, as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lake => "lake",
            Self::River => "river",
            Self::Ocean => "ocean",
        }
    }

    /// The two locations that are not `self`.
    #[must_use]
    pub const fn others(self) -> [Self; 2] {
        match self {
            Self::Lake => [Self::River, Self::Ocean],
            Self::River => [Self::Lake, Self::Ocean],
            Self::Ocean => [Self::Lake, Self::River],
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Location {
    type Err = FishingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "lake" => Ok(Self::Lake),
            "river" => Ok(Self::River),
            "ocean" => Ok(Self::Ocean),
            _ => Err(FishingError::InvalidLocation(raw.to_string())),
        }
    }
}

/// Fish density of each location for one player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Density {
    /// Lake density.
    pub lake: i64,
    /// River density.
    pub river: i64,
    /// Ocean density.
    pub ocean: i64,
}

impl Density {
    /// Density at one location.
    #[inline]
    #[must_use]
    pub const fn at(&self, location: Location) -> i64 {
        match location {
            Location::Lake => self.lake,
            Location::River => self.river,
            Location::Ocean => self.ocean,
        }
    }

    fn slot(&mut self, location: Location) -> &mut i64 {
        match location {
            Location::Lake => &mut self.lake,
            Location::River => &mut self.river,
            Location::Ocean => &mut self.ocean,
        }
    }

    /// Moves `amount` from one location to another.
    pub fn shift(&mut self, from: Location, to: Location, amount: i64) {
        *self.slot(from) -= amount;
        *self.slot(to) += amount;
    }

    /// Sum over all locations.
    #[must_use]
    pub const fn total(&self) -> i64 {
        self.lake + self.river + self.ocean
    }
}

impl Default for Density {
    fn default() -> Self {
        Self {
            lake: BASELINE_DENSITY,
            river: BASELINE_DENSITY,
            ocean: BASELINE_DENSITY,
        }
    }
}

impl fmt::Display for Density {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lake: {}, river: {}, ocean: {}",
            self.lake, self.river, self.ocean
        )
    }
}

/// The player's current location record.
#[derive(Clone)]
pub struct Locations {
    store: SharedStore,
}

impl Locations {
    /// Creates the location record accessor.
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Current location. A missing or unreadable record becomes [`Location::Lake`].
    pub fn get(&self, player: &str) -> FishingResult<Location> {
        let key = keys::location(player);
        if let Some(raw) = self.store.get(&key)? {
            match raw.parse::<Location>() {
                Ok(location) => return Ok(location),
                Err(_) => tracing::warn!(player, value = %raw, "unreadable location, resetting to lake"),
            }
        }
        self.store.set(&key, Location::Lake.as_str(), None)?;
        Ok(Location::Lake)
    }

    /// Validates and stores a new location.
    pub fn set(&self, player: &str, raw: &str) -> FishingResult<Location> {
        let location = raw.parse::<Location>()?;
        self.store
            .set(&keys::location(player), location.as_str(), None)?;
        tracing::debug!(player, location = %location, "location changed");
        Ok(location)
    }
}

/// Per-player density that drifts with each catch.
#[derive(Clone)]
pub struct DensityModel {
    store: SharedStore,
    dice: Arc<Dice>,
    locks: Arc<PlayerLocks>,
    ttl: Duration,
}

impl DensityModel {
    /// Creates the model. `ttl` is the inactivity reset window.
    #[must_use]
    pub fn new(store: SharedStore, dice: Arc<Dice>, locks: Arc<PlayerLocks>, ttl: Duration) -> Self {
        Self {
            store,
            dice,
            locks,
            ttl,
        }
    }

    /// Stored density, or the persisted baseline when absent or expired.
    pub fn get(&self, player: &str) -> FishingResult<Density> {
        let key = keys::density(player);
        let fields = self.store.hget_all(&key)?;
        if fields.is_empty() {
            let density = Density::default();
            self.persist(player, &density)?;
            return Ok(density);
        }

        let read = |location: Location| {
            fields
                .get(location.as_str())
                .and_then(|raw| raw.parse::<i64>().ok())
        };
        match (read(Location::Lake), read(Location::River), read(Location::Ocean)) {
            (Some(lake), Some(river), Some(ocean)) => Ok(Density { lake, river, ocean }),
            _ => {
                tracing::warn!(player, ?fields, "unreadable density record, resetting");
                let density = Density::default();
                self.persist(player, &density)?;
                Ok(density)
            }
        }
    }

    /// Drains 1 or 2 units from `current` into one of the other two
    /// locations, chosen uniformly, and refreshes the expiry.
    pub fn redistribute(&self, player: &str, current: Location) -> FishingResult<Density> {
        let _guard = self.locks.lock(player);

        let mut density = self.get(player)?;
        let magnitude = self.dice.between(1, 2);
        let others = current.others();
        let recipient = *self.dice.pick(&others).unwrap_or(&others[0]);
        density.shift(current, recipient, magnitude);
        self.persist(player, &density)?;

        tracing::debug!(
            player,
            from = %current,
            to = %recipient,
            magnitude,
            density = %density,
            "density redistributed"
        );
        Ok(density)
    }

    fn persist(&self, player: &str, density: &Density) -> FishingResult<()> {
        let key = keys::density(player);
        self.store.hset_many(
            &key,
            &[
                ("lake", density.lake.to_string()),
                ("river", density.river.to_string()),
                ("ocean", density.ocean.to_string()),
            ],
        )?;
        self.store.expire(&key, self.ttl)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fishy_store::{KeyValueStore, ManualClock, MemoryStore};

    const TTL: Duration = Duration::from_secs(3 * 60 * 60);

    fn model() -> (DensityModel, Arc<MemoryStore>, ManualClock) {
        let clock = ManualClock::default();
        let store = Arc::new(MemoryStore::with_clock(Arc::new(clock.clone())));
        let model = DensityModel::new(
            store.clone(),
            Arc::new(Dice::seeded(11)),
            Arc::new(PlayerLocks::default()),
            TTL,
        );
        (model, store, clock)
    }

    #[test]
    fn test_location_parse() {
        assert_eq!("River".parse::<Location>().unwrap(), Location::River);
        assert_eq!(" ocean ".parse::<Location>().unwrap(), Location::Ocean);
        assert_eq!(
            "pond".parse::<Location>(),
            Err(FishingError::InvalidLocation("pond".into()))
        );
    }

    #[test]
    fn test_others_excludes_self() {
        for location in Location::ALL {
            assert!(!location.others().contains(&location));
        }
    }

    #[test]
    fn test_default_location_is_persisted() {
        let store = Arc::new(MemoryStore::new());
        let locations = Locations::new(store.clone());

        assert_eq!(locations.get("p").unwrap(), Location::Lake);
        assert_eq!(store.get("user:location:p").unwrap().as_deref(), Some("lake"));

        assert_eq!(locations.set("p", "ocean").unwrap(), Location::Ocean);
        assert_eq!(locations.get("p").unwrap(), Location::Ocean);
        assert!(locations.set("p", "moon").is_err());
        assert_eq!(locations.get("p").unwrap(), Location::Ocean);
    }

    #[test]
    fn test_absent_density_is_baseline_with_ttl() {
        let (model, store, _) = model();
        assert_eq!(
            model.get("p").unwrap(),
            Density {
                lake: 100,
                river: 100,
                ocean: 100
            }
        );
        assert_eq!(store.ttl("user:locationdensity:p").unwrap(), Some(TTL));
    }

    #[test]
    fn test_redistribute_conserves_total() {
        let (model, _, _) = model();
        let mut previous = model.get("p").unwrap();
        for _ in 0..200 {
            let next = model.redistribute("p", Location::Lake).unwrap();
            let drained = previous.lake - next.lake;
            assert!(drained == 1 || drained == 2);
            assert_eq!(next.total(), 300);
            previous = next;
        }
        // 200 catches in one spot drive it negative.
        assert!(previous.lake < 0);
        assert!(previous.river > 100 || previous.ocean > 100);
    }

    #[test]
    fn test_density_resets_after_inactivity() {
        let (model, _, clock) = model();
        model.redistribute("p", Location::River).unwrap();
        assert_ne!(model.get("p").unwrap(), Density::default());

        clock.advance(TTL);
        assert_eq!(model.get("p").unwrap(), Density::default());
    }

    #[test]
    fn test_unreadable_density_resets() {
        let (model, store, _) = model();
        store.hset("user:locationdensity:p", "lake", "lots").unwrap();
        assert_eq!(model.get("p").unwrap(), Density::default());
    }
}
