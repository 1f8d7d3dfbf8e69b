//! # Fishy Store
//!
//! The storage seam for the fishy engine.
//!
//! Every piece of player state lives in a key-value store accessed record by
//! record: no cross-key transactions, optional per-key expiry. This crate
//! defines that contract ([`KeyValueStore`]) and ships an in-process
//! implementation ([`MemoryStore`]) that components are tested against.
//!
//! ## Data Shapes
//!
//! | shape       | used for                                   |
//! |-------------|--------------------------------------------|
//! | string      | location, bait tier, timers, counters      |
//! | hash        | equipment tiers, bait counts, fish counters |
//! | set         | owned equipment variants                   |
//! | sorted set  | leaderboards, command-tracking windows     |
//!
//! ## Example
//!
//! ```rust,ignore
//! use fishy_store::{KeyValueStore, MemoryStore};
//! use std::time::Duration;
//!
//! let store = MemoryStore::new();
//! store.set("ratelimit:fish:42", "", Some(Duration::from_secs(10)))?;
//! assert!(store.ttl("ratelimit:fish:42")?.is_some());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod clock;
pub mod error;
pub mod memory;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;

use std::collections::HashMap;
use std::time::Duration;

/// A key-value backend with Redis-like data shapes.
///
/// Implementations must be safe to share across threads. Individual
/// operations are atomic; sequences of operations are not.
pub trait KeyValueStore: Send + Sync {
    // ------------------------------------------------------------------
    // Keys and strings
    // ------------------------------------------------------------------

    /// Reads a string value.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Writes a string value. `ttl = None` stores it without expiry and clears
    /// any previous expiry.
    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<()>;

    /// Writes a string value only if the key does not exist.
    ///
    /// Returns `true` if the value was written.
    fn set_if_absent(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<bool>;

    /// Removes a key of any shape. Returns `true` if it existed.
    fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Checks whether a live key exists.
    fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Remaining time to live. `None` if the key is missing or never expires.
    fn ttl(&self, key: &str) -> StoreResult<Option<Duration>>;

    /// Sets an expiry on an existing key. Returns `false` if the key is missing.
    fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool>;

    /// Adds `delta` to an integer string value (missing counts as 0).
    fn incr_by(&self, key: &str, delta: i64) -> StoreResult<i64>;

    // ------------------------------------------------------------------
    // Hashes
    // ------------------------------------------------------------------

    /// Reads one hash field.
    fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>>;

    /// Writes one hash field.
    fn hset(&self, key: &str, field: &str, value: &str) -> StoreResult<()>;

    /// Writes several hash fields at once.
    fn hset_many(&self, key: &str, fields: &[(&str, String)]) -> StoreResult<()>;

    /// Reads every field of a hash (empty if missing).
    fn hget_all(&self, key: &str) -> StoreResult<HashMap<String, String>>;

    /// Removes one hash field. Returns `true` if it existed.
    fn hdel(&self, key: &str, field: &str) -> StoreResult<bool>;

    /// Adds `delta` to an integer hash field (missing counts as 0).
    fn hincr_by(&self, key: &str, field: &str, delta: i64) -> StoreResult<i64>;

    // ------------------------------------------------------------------
    // Sets
    // ------------------------------------------------------------------

    /// Adds members to a set. Returns how many were new.
    fn sadd(&self, key: &str, members: &[String]) -> StoreResult<usize>;

    /// Lists set members in lexicographic order.
    fn smembers(&self, key: &str) -> StoreResult<Vec<String>>;

    // ------------------------------------------------------------------
    // Sorted sets
    // ------------------------------------------------------------------

    /// Sets a member's score.
    fn zadd(&self, key: &str, member: &str, score: f64) -> StoreResult<()>;

    /// Adds `delta` to a member's score (missing counts as 0).
    fn zincr_by(&self, key: &str, member: &str, delta: f64) -> StoreResult<f64>;

    /// Reads a member's score.
    fn zscore(&self, key: &str, member: &str) -> StoreResult<Option<f64>>;

    /// Zero-based position of a member, highest score first.
    fn zrev_rank(&self, key: &str, member: &str) -> StoreResult<Option<u64>>;

    /// Members between two zero-based positions (inclusive), highest score first.
    fn zrev_range(&self, key: &str, start: u64, stop: u64) -> StoreResult<Vec<(String, f64)>>;

    /// Number of members.
    fn zcard(&self, key: &str) -> StoreResult<u64>;

    /// Removes members whose score lies in `[min, max]`. Returns how many were removed.
    fn zrem_range_by_score(&self, key: &str, min: f64, max: f64) -> StoreResult<u64>;
}
