//! Per-(command, player) cooldowns. The entry's existence is the cooldown;
//! its TTL is the time remaining.

use crate::error::FishingResult;
use crate::keys;
use crate::SharedStore;
use std::time::Duration;

/// Command cooldown tracker.
#[derive(Clone)]
pub struct RateLimiter {
    store: SharedStore,
}

impl RateLimiter {
    /// Creates the limiter.
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Remaining cooldown, or `None` when the player may run the command.
    pub fn check(&self, command: &str, player: &str) -> FishingResult<Option<Duration>> {
        let key = keys::rate_limit(command, player);
        if !self.store.exists(&key)? {
            return Ok(None);
        }
        Ok(Some(self.store.ttl(&key)?.unwrap_or_default()))
    }

    /// Starts (or restarts) a cooldown.
    pub fn set(&self, command: &str, player: &str, ttl: Duration) -> FishingResult<()> {
        self.store
            .set(&keys::rate_limit(command, player), "", Some(ttl))?;
        Ok(())
    }

    /// Starts a cooldown only if none is running. Returns `false` if another
    /// request got there first.
    pub fn try_claim(&self, command: &str, player: &str, ttl: Duration) -> FishingResult<bool> {
        Ok(self
            .store
            .set_if_absent(&keys::rate_limit(command, player), "", Some(ttl))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fishy_store::{ManualClock, MemoryStore};
    use std::sync::Arc;

    #[test]
    fn test_cooldown_lifecycle() {
        let clock = ManualClock::default();
        let limiter = RateLimiter::new(Arc::new(MemoryStore::with_clock(Arc::new(clock.clone()))));
        let ttl = Duration::from_secs(10);

        assert_eq!(limiter.check("fishy", "p").unwrap(), None);
        limiter.set("fishy", "p", ttl).unwrap();

        clock.advance(Duration::from_secs(3));
        assert_eq!(
            limiter.check("fishy", "p").unwrap(),
            Some(Duration::from_secs(7))
        );
        assert_eq!(limiter.check("bait", "p").unwrap(), None);

        clock.advance(Duration::from_secs(7));
        assert_eq!(limiter.check("fishy", "p").unwrap(), None);
    }

    #[test]
    fn test_only_one_claim_wins() {
        let limiter = Arc::new(RateLimiter::new(Arc::new(MemoryStore::new())));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || {
                    limiter
                        .try_claim("fishy", "p", Duration::from_secs(60))
                        .unwrap()
                })
            })
            .collect();
        let winners = handles
            .into_iter()
            .filter_map(|handle| handle.join().ok())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
