//! # In-Memory Store
//!
//! A [`KeyValueStore`] held entirely in process memory.
//!
//! Expiry is lazy: an expired key is invisible to reads and is dropped the
//! next time a write touches it (or when [`MemoryStore::purge_expired`] runs).

use crate::clock::{Clock, SystemClock};
use crate::error::{StoreError, StoreResult};
use crate::KeyValueStore;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// The shape of a stored value.
#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Hash(HashMap<String, String>),
    Set(BTreeSet<String>),
    Sorted(HashMap<String, f64>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    /// Absolute deadline, measured on the store's clock.
    expires_at: Option<Duration>,
}

impl Entry {
    fn new(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    #[inline]
    fn is_live(&self, now: Duration) -> bool {
        self.expires_at.map_or(true, |deadline| deadline > now)
    }
}

/// Thread-safe in-memory key-value store.
pub struct MemoryStore {
    keyspace: RwLock<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store on the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store driven by the given clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            keyspace: RwLock::new(HashMap::new()),
            clock,
            unavailable: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent operation fail with [`StoreError::Unavailable`]
    /// (or succeed again when `false`).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of live keys.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.keyspace
            .read()
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    /// Returns `true` if no live keys exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every expired key. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut keyspace = self.keyspace.write();
        let before = keyspace.len();
        keyspace.retain(|_, entry| entry.is_live(now));
        before - keyspace.len()
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".into()));
        }
        Ok(())
    }

    /// Runs `f` against the live entry for `key`, if any.
    fn read<T>(&self, key: &str, f: impl FnOnce(Option<&Entry>) -> StoreResult<T>) -> StoreResult<T> {
        self.check_available()?;
        let now = self.clock.now();
        let keyspace = self.keyspace.read();
        f(keyspace.get(key).filter(|entry| entry.is_live(now)))
    }

    /// Runs `f` against the keyspace after dropping `key` if it has expired.
    fn write<T>(
        &self,
        key: &str,
        f: impl FnOnce(&mut HashMap<String, Entry>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        self.check_available()?;
        let now = self.clock.now();
        let mut keyspace = self.keyspace.write();
        if keyspace.get(key).is_some_and(|entry| !entry.is_live(now)) {
            keyspace.remove(key);
        }
        f(&mut keyspace)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("keys", &self.keyspace.read().len())
            .field("unavailable", &self.unavailable.load(Ordering::Relaxed))
            .finish()
    }
}

fn wrong_type(key: &str) -> StoreError {
    StoreError::WrongType {
        key: key.to_string(),
    }
}

fn parse_int(key: &str, raw: &str) -> StoreResult<i64> {
    raw.parse::<i64>().map_err(|_| StoreError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

fn hash_mut<'a>(
    keyspace: &'a mut HashMap<String, Entry>,
    key: &str,
) -> StoreResult<&'a mut HashMap<String, String>> {
    let entry = keyspace
        .entry(key.to_string())
        .or_insert_with(|| Entry::new(Value::Hash(HashMap::new())));
    match &mut entry.value {
        Value::Hash(hash) => Ok(hash),
        _ => Err(wrong_type(key)),
    }
}

fn sorted_mut<'a>(
    keyspace: &'a mut HashMap<String, Entry>,
    key: &str,
) -> StoreResult<&'a mut HashMap<String, f64>> {
    let entry = keyspace
        .entry(key.to_string())
        .or_insert_with(|| Entry::new(Value::Sorted(HashMap::new())));
    match &mut entry.value {
        Value::Sorted(members) => Ok(members),
        _ => Err(wrong_type(key)),
    }
}

fn sorted_ref<'a>(entry: Option<&'a Entry>, key: &str) -> StoreResult<Option<&'a HashMap<String, f64>>> {
    match entry.map(|e| &e.value) {
        None => Ok(None),
        Some(Value::Sorted(members)) => Ok(Some(members)),
        Some(_) => Err(wrong_type(key)),
    }
}

/// Highest score first; equal scores order by member, descending.
fn rev_ordered(members: &HashMap<String, f64>) -> Vec<(&String, f64)> {
    let mut ordered: Vec<(&String, f64)> = members.iter().map(|(m, s)| (m, *s)).collect();
    ordered.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| b.0.cmp(a.0)));
    ordered
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.read(key, |entry| match entry.map(|e| &e.value) {
            None => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s.clone())),
            Some(_) => Err(wrong_type(key)),
        })
    }

    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<()> {
        let now = self.clock.now();
        self.write(key, |keyspace| {
            keyspace.insert(
                key.to_string(),
                Entry {
                    value: Value::Str(value.to_string()),
                    expires_at: ttl.map(|ttl| now + ttl),
                },
            );
            Ok(())
        })
    }

    fn set_if_absent(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<bool> {
        let now = self.clock.now();
        self.write(key, |keyspace| {
            if keyspace.contains_key(key) {
                return Ok(false);
            }
            keyspace.insert(
                key.to_string(),
                Entry {
                    value: Value::Str(value.to_string()),
                    expires_at: ttl.map(|ttl| now + ttl),
                },
            );
            Ok(true)
        })
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        self.write(key, |keyspace| Ok(keyspace.remove(key).is_some()))
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        self.read(key, |entry| Ok(entry.is_some()))
    }

    fn ttl(&self, key: &str) -> StoreResult<Option<Duration>> {
        let now = self.clock.now();
        self.read(key, |entry| {
            Ok(entry
                .and_then(|e| e.expires_at)
                .map(|deadline| deadline.saturating_sub(now)))
        })
    }

    fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool> {
        let now = self.clock.now();
        self.write(key, |keyspace| match keyspace.get_mut(key) {
            Some(entry) => {
                entry.expires_at = Some(now + ttl);
                Ok(true)
            }
            None => Ok(false),
        })
    }

    fn incr_by(&self, key: &str, delta: i64) -> StoreResult<i64> {
        self.write(key, |keyspace| {
            let entry = keyspace
                .entry(key.to_string())
                .or_insert_with(|| Entry::new(Value::Str("0".into())));
            match &mut entry.value {
                Value::Str(raw) => {
                    let next = parse_int(key, raw)? + delta;
                    *raw = next.to_string();
                    Ok(next)
                }
                _ => Err(wrong_type(key)),
            }
        })
    }

    fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        self.read(key, |entry| match entry.map(|e| &e.value) {
            None => Ok(None),
            Some(Value::Hash(hash)) => Ok(hash.get(field).cloned()),
            Some(_) => Err(wrong_type(key)),
        })
    }

    fn hset(&self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        self.write(key, |keyspace| {
            hash_mut(keyspace, key)?.insert(field.to_string(), value.to_string());
            Ok(())
        })
    }

    fn hset_many(&self, key: &str, fields: &[(&str, String)]) -> StoreResult<()> {
        self.write(key, |keyspace| {
            let hash = hash_mut(keyspace, key)?;
            for (field, value) in fields {
                hash.insert((*field).to_string(), value.clone());
            }
            Ok(())
        })
    }

    fn hget_all(&self, key: &str) -> StoreResult<HashMap<String, String>> {
        self.read(key, |entry| match entry.map(|e| &e.value) {
            None => Ok(HashMap::new()),
            Some(Value::Hash(hash)) => Ok(hash.clone()),
            Some(_) => Err(wrong_type(key)),
        })
    }

    fn hdel(&self, key: &str, field: &str) -> StoreResult<bool> {
        self.write(key, |keyspace| match keyspace.get_mut(key).map(|e| &mut e.value) {
            None => Ok(false),
            Some(Value::Hash(hash)) => Ok(hash.remove(field).is_some()),
            Some(_) => Err(wrong_type(key)),
        })
    }

    fn hincr_by(&self, key: &str, field: &str, delta: i64) -> StoreResult<i64> {
        self.write(key, |keyspace| {
            let hash = hash_mut(keyspace, key)?;
            let current = match hash.get(field) {
                Some(raw) => parse_int(key, raw)?,
                None => 0,
            };
            let next = current + delta;
            hash.insert(field.to_string(), next.to_string());
            Ok(next)
        })
    }

    fn sadd(&self, key: &str, members: &[String]) -> StoreResult<usize> {
        self.write(key, |keyspace| {
            let entry = keyspace
                .entry(key.to_string())
                .or_insert_with(|| Entry::new(Value::Set(BTreeSet::new())));
            match &mut entry.value {
                Value::Set(set) => Ok(members
                    .iter()
                    .filter(|member| set.insert((*member).clone()))
                    .count()),
                _ => Err(wrong_type(key)),
            }
        })
    }

    fn smembers(&self, key: &str) -> StoreResult<Vec<String>> {
        self.read(key, |entry| match entry.map(|e| &e.value) {
            None => Ok(Vec::new()),
            Some(Value::Set(set)) => Ok(set.iter().cloned().collect()),
            Some(_) => Err(wrong_type(key)),
        })
    }

    fn zadd(&self, key: &str, member: &str, score: f64) -> StoreResult<()> {
        self.write(key, |keyspace| {
            sorted_mut(keyspace, key)?.insert(member.to_string(), score);
            Ok(())
        })
    }

    fn zincr_by(&self, key: &str, member: &str, delta: f64) -> StoreResult<f64> {
        self.write(key, |keyspace| {
            let score = sorted_mut(keyspace, key)?
                .entry(member.to_string())
                .or_insert(0.0);
            *score += delta;
            Ok(*score)
        })
    }

    fn zscore(&self, key: &str, member: &str) -> StoreResult<Option<f64>> {
        self.read(key, |entry| {
            Ok(sorted_ref(entry, key)?.and_then(|members| members.get(member).copied()))
        })
    }

    fn zrev_rank(&self, key: &str, member: &str) -> StoreResult<Option<u64>> {
        self.read(key, |entry| {
            let Some(members) = sorted_ref(entry, key)? else {
                return Ok(None);
            };
            Ok(rev_ordered(members)
                .iter()
                .position(|(m, _)| m.as_str() == member)
                .map(|pos| pos as u64))
        })
    }

    fn zrev_range(&self, key: &str, start: u64, stop: u64) -> StoreResult<Vec<(String, f64)>> {
        self.read(key, |entry| {
            let Some(members) = sorted_ref(entry, key)? else {
                return Ok(Vec::new());
            };
            if stop < start {
                return Ok(Vec::new());
            }
            let take = (stop - start).saturating_add(1);
            Ok(rev_ordered(members)
                .into_iter()
                .skip(usize::try_from(start).unwrap_or(usize::MAX))
                .take(usize::try_from(take).unwrap_or(usize::MAX))
                .map(|(m, s)| (m.clone(), s))
                .collect())
        })
    }

    fn zcard(&self, key: &str) -> StoreResult<u64> {
        self.read(key, |entry| {
            Ok(sorted_ref(entry, key)?.map_or(0, |members| members.len() as u64))
        })
    }

    fn zrem_range_by_score(&self, key: &str, min: f64, max: f64) -> StoreResult<u64> {
        self.write(key, |keyspace| match keyspace.get_mut(key).map(|e| &mut e.value) {
            None => Ok(0),
            Some(Value::Sorted(members)) => {
                let before = members.len();
                members.retain(|_, score| *score < min || *score > max);
                Ok((before - members.len()) as u64)
            }
            Some(_) => Err(wrong_type(key)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn store_with_clock() -> (MemoryStore, ManualClock) {
        let clock = ManualClock::default();
        let store = MemoryStore::with_clock(Arc::new(clock.clone()));
        (store, clock)
    }

    #[test]
    fn test_string_roundtrip_and_delete() {
        let store = MemoryStore::new();
        assert_eq!(store.get("loc:1").unwrap(), None);

        store.set("loc:1", "river", None).unwrap();
        assert_eq!(store.get("loc:1").unwrap().as_deref(), Some("river"));
        assert!(store.exists("loc:1").unwrap());

        assert!(store.delete("loc:1").unwrap());
        assert!(!store.delete("loc:1").unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_ttl_expiry_follows_clock() {
        let (store, clock) = store_with_clock();
        store
            .set("ratelimit:fish:7", "", Some(Duration::from_secs(10)))
            .unwrap();

        clock.advance(Duration::from_secs(4));
        assert_eq!(
            store.ttl("ratelimit:fish:7").unwrap(),
            Some(Duration::from_secs(6))
        );

        clock.advance(Duration::from_secs(6));
        assert!(!store.exists("ratelimit:fish:7").unwrap());
        assert_eq!(store.ttl("ratelimit:fish:7").unwrap(), None);
        assert_eq!(store.purge_expired(), 1);
    }

    #[test]
    fn test_set_without_ttl_clears_expiry() {
        let (store, clock) = store_with_clock();
        store.set("k", "a", Some(Duration::from_secs(5))).unwrap();
        store.set("k", "b", None).unwrap();

        clock.advance(Duration::from_secs(60));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("b"));
        assert_eq!(store.ttl("k").unwrap(), None);
    }

    #[test]
    fn test_set_if_absent_respects_expiry() {
        let (store, clock) = store_with_clock();
        let ttl = Some(Duration::from_secs(10));

        assert!(store.set_if_absent("cd", "", ttl).unwrap());
        assert!(!store.set_if_absent("cd", "", ttl).unwrap());

        clock.advance(Duration::from_secs(10));
        assert!(store.set_if_absent("cd", "", ttl).unwrap());
    }

    #[test]
    fn test_expire_on_missing_key() {
        let (store, clock) = store_with_clock();
        assert!(!store.expire("nope", Duration::from_secs(1)).unwrap());

        store.hset("density:guild", "lake", "100").unwrap();
        assert!(store.expire("density:guild", Duration::from_secs(3)).unwrap());
        clock.advance(Duration::from_secs(3));
        assert!(store.hget_all("density:guild").unwrap().is_empty());
    }

    #[test]
    fn test_counters() {
        let store = MemoryStore::new();
        assert_eq!(store.incr_by("n", 5).unwrap(), 5);
        assert_eq!(store.incr_by("n", -2).unwrap(), 3);

        assert_eq!(store.hincr_by("bait:1", "2", 10).unwrap(), 10);
        assert_eq!(store.hincr_by("bait:1", "2", -1).unwrap(), 9);
        assert_eq!(store.hget("bait:1", "2").unwrap().as_deref(), Some("9"));
    }

    #[test]
    fn test_counter_on_garbage_value() {
        let store = MemoryStore::new();
        store.set("n", "many", None).unwrap();
        assert!(matches!(
            store.incr_by("n", 1),
            Err(StoreError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_wrong_type() {
        let store = MemoryStore::new();
        store.set("s", "x", None).unwrap();
        assert_eq!(
            store.hget("s", "f"),
            Err(StoreError::WrongType { key: "s".into() })
        );
        assert!(store.zadd("s", "m", 1.0).is_err());
        assert!(store.sadd("s", &["a".into()]).is_err());
    }

    #[test]
    fn test_hash_many_and_delete() {
        let store = MemoryStore::new();
        store
            .hset_many("user:1", &[("name", "ada".into()), ("avatar", "a.png".into())])
            .unwrap();
        let all = store.hget_all("user:1").unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["name"], "ada");

        assert!(store.hdel("user:1", "avatar").unwrap());
        assert!(!store.hdel("user:1", "avatar").unwrap());
        assert_eq!(store.hget("user:1", "avatar").unwrap(), None);
    }

    #[test]
    fn test_set_union() {
        let store = MemoryStore::new();
        assert_eq!(store.sadd("own", &["b".into(), "a".into()]).unwrap(), 2);
        assert_eq!(store.sadd("own", &["a".into(), "c".into()]).unwrap(), 1);
        assert_eq!(store.smembers("own").unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sorted_set_rank_and_range() {
        let store = MemoryStore::new();
        store.zadd("score", "alice", 5.0).unwrap();
        store.zadd("score", "bob", 9.0).unwrap();
        store.zadd("score", "carol", 5.0).unwrap();
        assert_eq!(store.zincr_by("score", "dave", 1.0).unwrap(), 1.0);

        assert_eq!(store.zrev_rank("score", "bob").unwrap(), Some(0));
        // Ties break by member, descending.
        assert_eq!(store.zrev_rank("score", "carol").unwrap(), Some(1));
        assert_eq!(store.zrev_rank("score", "alice").unwrap(), Some(2));
        assert_eq!(store.zrev_rank("score", "nobody").unwrap(), None);

        let page = store.zrev_range("score", 1, 2).unwrap();
        assert_eq!(
            page,
            vec![("carol".to_string(), 5.0), ("alice".to_string(), 5.0)]
        );
        assert!(store.zrev_range("score", 10, 19).unwrap().is_empty());
        assert_eq!(store.zcard("score").unwrap(), 4);
        assert_eq!(store.zscore("score", "dave").unwrap(), Some(1.0));
    }

    #[test]
    fn test_zrem_range_by_score_is_inclusive() {
        let store = MemoryStore::new();
        for (member, score) in [("a", 10.0), ("b", 20.0), ("c", 30.0)] {
            store.zadd("cmds", member, score).unwrap();
        }
        assert_eq!(store.zrem_range_by_score("cmds", 0.0, 20.0).unwrap(), 2);
        assert_eq!(store.zrev_range("cmds", 0, 9).unwrap().len(), 1);
        assert_eq!(store.zrem_range_by_score("missing", 0.0, 1.0).unwrap(), 0);
    }

    #[test]
    fn test_unavailable_fails_every_operation() {
        let store = MemoryStore::new();
        store.set("k", "v", None).unwrap();
        store.set_unavailable(true);

        assert!(matches!(store.get("k"), Err(StoreError::Unavailable(_))));
        assert!(matches!(store.set("k", "w", None), Err(StoreError::Unavailable(_))));
        assert!(matches!(store.zcard("z"), Err(StoreError::Unavailable(_))));

        store.set_unavailable(false);
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_concurrent_increments() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        store.zincr_by("score", "p", 1.0).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.zscore("score", "p").unwrap(), Some(4000.0));
    }
}
