//! # Score Ledger
//!
//! Experience earned by landing fish, kept in a global leaderboard and one
//! leaderboard per guild. Scores never decrease. The global score decides
//! which catch tiers a player can roll.

use crate::error::FishingResult;
use crate::keys;
use crate::SharedStore;
use serde::{Deserialize, Serialize};

/// Entries per leaderboard page.
pub const PAGE_SIZE: u64 = 10;

/// Global or per-guild bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// Every player.
    Global,
    /// Players of one guild.
    Guild(String),
}

impl Scope {
    fn key(&self) -> String {
        match self {
            Self::Global => keys::GLOBAL_SCORE.to_string(),
            Self::Guild(guild) => keys::guild_score(guild),
        }
    }
}

/// A leaderboard row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// 1-based position.
    pub rank: u64,
    /// Player ID.
    pub player: String,
    /// Score.
    pub score: f64,
}

/// A player's position on one leaderboard.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-based position: the leader is `1`. Display it as is; the store's
    /// reverse rank is already shifted by one.
    pub rank: u64,
    /// Score.
    pub score: f64,
}

/// Global and guild leaderboards.
#[derive(Clone)]
pub struct ScoreLedger {
    store: SharedStore,
}

impl ScoreLedger {
    /// Creates the ledger.
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Score on one leaderboard. An absent player is entered at 0.
    pub fn get(&self, player: &str, scope: &Scope) -> FishingResult<f64> {
        let key = scope.key();
        match self.store.zscore(&key, player)? {
            Some(score) => Ok(score),
            None => {
                self.store.zadd(&key, player, 0.0)?;
                Ok(0.0)
            }
        }
    }

    /// Adds to a score. Negative amounts are ignored.
    pub fn increment(&self, player: &str, scope: &Scope, amount: f64) -> FishingResult<f64> {
        if amount.is_nan() || amount < 0.0 {
            tracing::warn!(player, amount, "refusing to lower a score");
            return self.get(player, scope);
        }
        Ok(self.store.zincr_by(&scope.key(), player, amount)?)
    }

    /// Position and score on one leaderboard.
    ///
    /// The returned rank is 1-based. An unseen player is entered at 0 first.
    pub fn rank(&self, player: &str, scope: &Scope) -> FishingResult<Standing> {
        let score = self.get(player, scope)?;
        let key = scope.key();
        let position = match self.store.zrev_rank(&key, player)? {
            Some(position) => position,
            None => self.store.zcard(&key)?,
        };
        Ok(Standing {
            rank: position + 1,
            score,
        })
    }

    /// One page of a leaderboard, highest first. Page 0 reads as page 1.
    pub fn page(&self, scope: &Scope, page: u64) -> FishingResult<Vec<ScoreEntry>> {
        let start = page.max(1).saturating_sub(1).saturating_mul(PAGE_SIZE);
        let stop = start.saturating_add(PAGE_SIZE - 1);
        let rows = self.store.zrev_range(&scope.key(), start, stop)?;
        Ok(rows
            .into_iter()
            .zip(start + 1..)
            .map(|((player, score), rank)| ScoreEntry {
                rank,
                player,
                score,
            })
            .collect())
    }
}
