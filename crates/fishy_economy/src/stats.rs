//! # Player Statistics
//!
//! Informational counters per player, kept both globally and per guild:
//! casts attempted, fish and garbage landed, and the running average length
//! of landed fish. Nothing in cast resolution reads them.

use crate::error::FishingResult;
use crate::keys;
use crate::locks::PlayerLocks;
use crate::score::Scope;
use crate::SharedStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Counters of one player in one scope.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CastStats {
    /// Eligible casts.
    pub casts: i64,
    /// Fish landed.
    pub fish: i64,
    /// Garbage landed.
    pub garbage: i64,
    /// Mean length of landed fish (cm).
    pub avg_length: f64,
}

const CASTS: &str = "casts";
const FISH: &str = "fish";
const GARBAGE: &str = "garbage";
const AVG_LENGTH: &str = "avgLength";

/// Per-player cast statistics.
#[derive(Clone)]
pub struct StatsLedger {
    store: SharedStore,
    locks: Arc<PlayerLocks>,
}

impl StatsLedger {
    /// Creates the ledger.
    #[must_use]
    pub fn new(store: SharedStore, locks: Arc<PlayerLocks>) -> Self {
        Self { store, locks }
    }

    fn key(player: &str, scope: &Scope) -> String {
        match scope {
            Scope::Global => keys::global_stats(player),
            Scope::Guild(guild) => keys::guild_stats(guild, player),
        }
    }

    /// Current counters (zero when absent). Unreadable fields are reset.
    pub fn get(&self, player: &str, scope: &Scope) -> FishingResult<CastStats> {
        let key = Self::key(player, scope);
        let fields = self.store.hget_all(&key)?;
        let mut stats = CastStats::default();

        for (field, raw) in &fields {
            let parsed = match field.to_ascii_lowercase().as_str() {
                "casts" => raw.parse().map(|v| stats.casts = v).is_ok(),
                "fish" => raw.parse().map(|v| stats.fish = v).is_ok(),
                "garbage" => raw.parse().map(|v| stats.garbage = v).is_ok(),
                "avglength" => raw.parse().map(|v| stats.avg_length = v).is_ok(),
                _ => true,
            };
            if !parsed {
                tracing::warn!(player, field = %field, value = %raw, "unreadable stat, resetting");
                self.store.hset(&key, field, "0")?;
            }
        }
        Ok(stats)
    }

    /// Counts one eligible cast.
    pub fn record_cast(&self, player: &str, scope: &Scope) -> FishingResult<()> {
        self.store.hincr_by(&Self::key(player, scope), CASTS, 1)?;
        Ok(())
    }

    /// Counts one garbage catch.
    pub fn record_garbage(&self, player: &str, scope: &Scope) -> FishingResult<()> {
        self.store.hincr_by(&Self::key(player, scope), GARBAGE, 1)?;
        Ok(())
    }

    /// Counts one landed fish and folds its length into the average.
    pub fn record_fish(&self, player: &str, scope: &Scope, length: f64) -> FishingResult<CastStats> {
        let _guard = self.locks.lock(player);

        let mut stats = self.get(player, scope)?;
        let total = stats.avg_length * stats.fish as f64 + length;
        stats.fish += 1;
        stats.avg_length = total / stats.fish as f64;

        self.store.hset_many(
            &Self::key(player, scope),
            &[
                (FISH, stats.fish.to_string()),
                (AVG_LENGTH, stats.avg_length.to_string()),
            ],
        )?;
        Ok(stats)
    }
}
