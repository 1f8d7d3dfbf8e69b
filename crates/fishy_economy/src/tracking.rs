//! # Command Tracking
//!
//! Usage counters per command: a lifetime total plus rolling hourly and
//! daily windows. Each invocation is a sorted-set member scored by its unix
//! time; [`CommandTracker::prune`] drops members that fell out of a window.
//! Pruning is housekeeping only: until it runs, window counts overstate.

use crate::error::FishingResult;
use crate::keys;
use crate::SharedStore;
use fishy_store::Clock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Usage of one command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandStats {
    /// Invocations within the hourly window.
    pub hourly: u64,
    /// Invocations within the daily window.
    pub daily: u64,
    /// Lifetime invocations.
    pub total: i64,
}

/// Records and prunes command usage.
pub struct CommandTracker {
    store: SharedStore,
    clock: Arc<dyn Clock>,
    hourly_window: Duration,
    daily_window: Duration,
    sequence: AtomicU64,
}

impl CommandTracker {
    /// Creates a tracker with the given rolling windows.
    #[must_use]
    pub fn new(
        store: SharedStore,
        clock: Arc<dyn Clock>,
        hourly_window: Duration,
        daily_window: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            hourly_window,
            daily_window,
            sequence: AtomicU64::new(0),
        }
    }

    /// Records one invocation of `command` by `player`.
    pub fn record(&self, command: &str, player: &str) -> FishingResult<()> {
        let now = self.clock.unix_seconds();
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        // Members must be unique per invocation or repeats would collapse.
        let member = format!("{player}:{now}:{seq}");

        self.store.incr_by(&keys::tracking_total(command), 1)?;
        self.store
            .zadd(&keys::tracking_hourly(command), &member, now as f64)?;
        self.store
            .zadd(&keys::tracking_daily(command), &member, now as f64)?;
        Ok(())
    }

    /// Current usage of `command`.
    pub fn stats(&self, command: &str) -> FishingResult<CommandStats> {
        let total = self
            .store
            .get(&keys::tracking_total(command))?
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0);
        Ok(CommandStats {
            hourly: self.store.zcard(&keys::tracking_hourly(command))?,
            daily: self.store.zcard(&keys::tracking_daily(command))?,
            total,
        })
    }

    /// Drops invocations older than each window. Returns how many were dropped.
    pub fn prune(&self, command: &str) -> FishingResult<u64> {
        let now = self.clock.unix_seconds();
        let hour_cutoff = now.saturating_sub(self.hourly_window.as_secs());
        let day_cutoff = now.saturating_sub(self.daily_window.as_secs());

        let hourly = self.store.zrem_range_by_score(
            &keys::tracking_hourly(command),
            0.0,
            hour_cutoff as f64,
        )?;
        let daily = self.store.zrem_range_by_score(
            &keys::tracking_daily(command),
            0.0,
            day_cutoff as f64,
        )?;
        Ok(hourly + daily)
    }
}

impl std::fmt::Debug for CommandTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandTracker")
            .field("hourly_window", &self.hourly_window)
            .field("daily_window", &self.daily_window)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fishy_store::{ManualClock, MemoryStore};

    fn tracker() -> (CommandTracker, ManualClock) {
        let clock = ManualClock::default();
        let store = Arc::new(MemoryStore::with_clock(Arc::new(clock.clone())));
        (
            CommandTracker::new(
                store,
                Arc::new(clock.clone()),
                Duration::from_secs(3600),
                Duration::from_secs(86_400),
            ),
            clock,
        )
    }

    #[test]
    fn test_repeat_invocations_all_count() {
        let (tracker, _) = tracker();
        for _ in 0..3 {
            tracker.record("fishy", "p").unwrap();
        }
        assert_eq!(
            tracker.stats("fishy").unwrap(),
            CommandStats {
                hourly: 3,
                daily: 3,
                total: 3
            }
        );
        assert_eq!(tracker.stats("bait").unwrap(), CommandStats::default());
    }

    #[test]
    fn test_prune_rolls_windows() {
        let (tracker, clock) = tracker();
        tracker.record("fishy", "a").unwrap();
        clock.advance(Duration::from_secs(2 * 3600));
        tracker.record("fishy", "b").unwrap();

        assert_eq!(tracker.prune("fishy").unwrap(), 1);
        let stats = tracker.stats("fishy").unwrap();
        assert_eq!(stats.hourly, 1);
        assert_eq!(stats.daily, 2);
        assert_eq!(stats.total, 2);

        clock.advance(Duration::from_secs(23 * 3600));
        assert_eq!(tracker.prune("fishy").unwrap(), 2);
        let stats = tracker.stats("fishy").unwrap();
        assert_eq!((stats.hourly, stats.daily, stats.total), (0, 1, 2));
    }
}
