//! Cache-aside store with a fixed time-to-live.
//!
//! One [`TtlCache`] instance stands for one upstream operation; its key is
//! that operation's arguments. Lookups take the current instant explicitly
//! (usually from a [`Clock`]) so expiry is deterministic under test.
//!
//! Implementation notes:
//! - Expired entries are ignored on read and replaced on the next insert;
//!   [`TtlCache::purge_expired`] drops them eagerly.
//! - Failed fetches are never cached.

use std::{
    collections::HashMap,
    future::Future,
    hash::Hash,
    sync::atomic::{AtomicI64, Ordering},
    time::Duration,
};

use chrono::{DateTime, TimeDelta, Utc};

/// Default time-to-live for history and reference fetches.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    /// A clock stopped at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let ms = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        self.millis.fetch_add(ms, Ordering::SeqCst);
    }

    /// Stops the clock at `at`.
    pub fn set(&self, at: DateTime<Utc>) {
        self.millis.store(at.timestamp_millis(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

/// Key → (value, expiry) map.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: TimeDelta,
    entries: HashMap<K, (V, DateTime<Utc>)>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    /// An empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            entries: HashMap::new(),
        }
    }

    /// The configured time-to-live.
    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// The cached value for `key` if it has not expired at `now`.
    pub fn get(&self, key: &K, now: DateTime<Utc>) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|(_, expires)| now < *expires)
            .map(|(v, _)| v)
    }

    /// Stores `value` under `key`, expiring `ttl` after `now`.
    pub fn insert(&mut self, key: K, value: V, now: DateTime<Utc>) {
        let expires = now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.entries.insert(key, (value, expires));
    }

    /// Returns the cached value or runs `fetch`, caching a successful result.
    pub async fn get_or_try_insert_with<F, Fut, E>(
        &mut self,
        key: K,
        now: DateTime<Utc>,
        fetch: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(hit) = self.get(&key, now) {
            return Ok(hit.clone());
        }
        let value = fetch().await?;
        self.insert(key, value.clone(), now);
        Ok(value)
    }

    /// Drops every entry expired at `now`; returns how many were dropped.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, (_, expires)| now < *expires);
        before - self.entries.len()
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
