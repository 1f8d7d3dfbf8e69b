//! Player flags and timers that gate casting but carry no economy: the
//! blacklist, the bait-gathering timer and the tracked display identity.

use crate::error::FishingResult;
use crate::keys;
use crate::SharedStore;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Display identity of a player. Informational only.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Account name.
    pub name: String,
    /// Four-digit discriminator.
    pub discriminator: String,
    /// Avatar reference.
    pub avatar: String,
}

impl Identity {
    /// `name#discriminator`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{}#{}", self.name, self.discriminator)
    }
}

/// Blacklist, gather-bait timer and identity records.
#[derive(Clone)]
pub struct Profiles {
    store: SharedStore,
    gather_duration: Duration,
}

impl Profiles {
    /// Creates the profile records; gathering bait lasts `gather_duration`.
    #[must_use]
    pub fn new(store: SharedStore, gather_duration: Duration) -> Self {
        Self {
            store,
            gather_duration,
        }
    }

    /// Soft-disables a player.
    pub fn blacklist(&self, player: &str) -> FishingResult<()> {
        self.store.set(&keys::blacklist(player), "true", None)?;
        tracing::info!(player, "player blacklisted");
        Ok(())
    }

    /// Lifts the blacklist. Returns whether the player was blacklisted.
    pub fn unblacklist(&self, player: &str) -> FishingResult<bool> {
        let removed = self.store.delete(&keys::blacklist(player))?;
        if removed {
            tracing::info!(player, "player unblacklisted");
        }
        Ok(removed)
    }

    /// Whether the player is blacklisted.
    pub fn is_blacklisted(&self, player: &str) -> FishingResult<bool> {
        Ok(self.store.exists(&keys::blacklist(player))?)
    }

    /// Starts the gathering timer, replacing any running one.
    pub fn start_gather_bait(&self, player: &str) -> FishingResult<()> {
        self.store
            .set(&keys::gather_bait(player), "", Some(self.gather_duration))?;
        Ok(())
    }

    /// Remaining gathering time, if the player is gathering.
    pub fn check_gather_bait(&self, player: &str) -> FishingResult<Option<Duration>> {
        Ok(self.store.ttl(&keys::gather_bait(player))?)
    }

    /// Stores the player's display identity.
    pub fn track_identity(&self, player: &str, identity: &Identity) -> FishingResult<()> {
        self.store.hset_many(
            &keys::identity(player),
            &[
                ("name", identity.name.clone()),
                ("discriminator", identity.discriminator.clone()),
                ("avatar", identity.avatar.clone()),
            ],
        )?;
        Ok(())
    }

    /// The stored display identity, if any.
    pub fn tracked_identity(&self, player: &str) -> FishingResult<Option<Identity>> {
        let mut fields = self.store.hget_all(&keys::identity(player))?;
        if fields.is_empty() {
            return Ok(None);
        }
        Ok(Some(Identity {
            name: fields.remove("name").unwrap_or_default(),
            discriminator: fields.remove("discriminator").unwrap_or_default(),
            avatar: fields.remove("avatar").unwrap_or_default(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fishy_store::{ManualClock, MemoryStore};
    use std::sync::Arc;

    const SIX_HOURS: Duration = Duration::from_secs(6 * 3600);

    #[test]
    fn test_blacklist_toggle() {
        let profiles = Profiles::new(Arc::new(MemoryStore::new()), SIX_HOURS);
        assert!(!profiles.is_blacklisted("p").unwrap());
        profiles.blacklist("p").unwrap();
        assert!(profiles.is_blacklisted("p").unwrap());
        assert!(profiles.unblacklist("p").unwrap());
        assert!(!profiles.unblacklist("p").unwrap());
        assert!(!profiles.is_blacklisted("p").unwrap());
    }

    #[test]
    fn test_gather_bait_expires() {
        let clock = ManualClock::default();
        let store = Arc::new(MemoryStore::with_clock(Arc::new(clock.clone())));
        let profiles = Profiles::new(store, SIX_HOURS);

        assert_eq!(profiles.check_gather_bait("p").unwrap(), None);
        profiles.start_gather_bait("p").unwrap();
        clock.advance(Duration::from_secs(3600));
        assert_eq!(
            profiles.check_gather_bait("p").unwrap(),
            Some(Duration::from_secs(5 * 3600))
        );
        clock.advance(Duration::from_secs(5 * 3600));
        assert_eq!(profiles.check_gather_bait("p").unwrap(), None);
    }

    #[test]
    fn test_identity_round_trip() {
        let profiles = Profiles::new(Arc::new(MemoryStore::new()), SIX_HOURS);
        assert_eq!(profiles.tracked_identity("p").unwrap(), None);

        let identity = Identity {
            name: "angler".into(),
            discriminator: "0042".into(),
            avatar: "a.png".into(),
        };
        profiles.track_identity("p", &identity).unwrap();
        let stored = profiles.tracked_identity("p").unwrap().unwrap();
        assert_eq!(stored.display_name(), "angler#0042");
        assert_eq!(stored, identity);
    }
}
