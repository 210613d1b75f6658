//! In-process session store.
//!
//! Expiry follows the tokio clock, so tests can drive it with
//! `tokio::time::pause` and `tokio::time::advance`.

use crate::errors::SessionError;
use crate::store::SessionStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Map size below which writes never sweep.
const MIN_SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug)]
struct Inner {
    entries: HashMap<String, Entry>,
    /// A write that finds the map at this size sweeps expired entries first.
    sweep_at: usize,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            sweep_at: MIN_SWEEP_THRESHOLD,
        }
    }
}

impl Inner {
    /// Drop expired entries once the map has doubled since the last sweep.
    fn maybe_sweep(&mut self, now: Instant) {
        if self.entries.len() < self.sweep_at {
            return;
        }
        self.entries.retain(|_, e| e.is_live(now));
        self.sweep_at = self
            .entries
            .len()
            .saturating_mul(2)
            .max(MIN_SWEEP_THRESHOLD);
    }
}

/// Session store backed by a mutex-guarded map.
///
/// Expired entries are dropped lazily when touched. Writes sweep the whole
/// map only after it has doubled in size since the previous sweep.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    inner: Mutex<Inner>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let inner = self.inner.lock().await;
        inner.entries.values().filter(|e| e.is_live(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), SessionError> {
        let now = Instant::now();
        let expires_at = now.checked_add(ttl).ok_or_else(|| {
            SessionError::Store(format!("TTL out of range: {}ms", ttl.as_millis()))
        })?;

        let mut inner = self.inner.lock().await;
        inner.maybe_sweep(now);
        inner.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let now = Instant::now();
        let mut inner = self.inner.lock().await;
        match inner.entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                inner.entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), SessionError> {
        self.inner.lock().await.entries.remove(key);
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>, SessionError> {
        let now = Instant::now();
        let removed = self.inner.lock().await.entries.remove(key);
        Ok(removed.filter(|e| e.is_live(now)).map(|e| e.value))
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, SessionError> {
        let now = Instant::now();
        let inner = self.inner.lock().await;
        Ok(inner
            .entries
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.expires_at.saturating_duration_since(now)))
    }
}
