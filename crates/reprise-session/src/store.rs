//! Session store capability and its in-memory implementation.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lru::LruCache;
use serde_json::Value;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::clock::{SharedClock, SystemClock};
use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::expiry::{EntryKey, ExpiryTracker};
use crate::session::SessionId;

/// Backend for server-side session state.
///
/// Every session holds named sections; each section maps string keys to JSON
/// values. Entries may carry an expiration, after which they are invisible to
/// every read.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Resolve a section name into the name actually stored.
    ///
    /// Backends that namespace sections (e.g. per site) override this.
    fn qualify_section(&self, section: &str) -> String {
        section.to_string()
    }

    /// Read an entry. Returns `Ok(None)` when absent or expired.
    async fn get(&self, session: SessionId, section: &str, key: &str) -> Result<Option<Value>>;

    /// Check whether a live entry exists.
    async fn contains(&self, session: SessionId, section: &str, key: &str) -> Result<bool>;

    /// Write an entry, replacing any previous value and its expiration.
    ///
    /// With `ttl` the entry expires that long after now; the deadline is
    /// validated before anything is written.
    async fn insert(
        &self,
        session: SessionId,
        section: &str,
        key: &str,
        value: Value,
        ttl: Option<Duration>,
    ) -> Result<()>;

    /// Set the time-to-live of an existing entry, counted from now.
    /// `None` removes the expiration.
    async fn set_expiration(
        &self,
        session: SessionId,
        section: &str,
        key: &str,
        ttl: Option<Duration>,
    ) -> Result<()>;

    /// Remove an entry, returning its value if it was live.
    async fn remove(&self, session: SessionId, section: &str, key: &str) -> Result<Option<Value>>;

    /// Remove every entry of a section. Returns the number of entries removed.
    async fn remove_section(&self, session: SessionId, section: &str) -> Result<usize>;

    /// Drop a whole session. Returns `true` if it existed.
    async fn remove_session(&self, session: SessionId) -> Result<bool>;

    /// Drop every expired entry. Returns the number of entries removed.
    async fn cleanup_expired(&self) -> Result<usize>;
}

/// Shared session store handle.
pub type SharedSessionStore = Arc<dyn SessionStore>;

/// Absolute deadline `ttl` after `now`.
fn deadline(now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or(SessionError::ExpirationOutOfRange(ttl))
}

/// State of one session.
#[derive(Debug, Default)]
struct SessionState {
    sections: HashMap<String, HashMap<String, Value>>,
    expiry: ExpiryTracker,
}

impl SessionState {
    fn entry(&self, entry: &EntryKey) -> Option<&Value> {
        self.sections
            .get(&entry.section)
            .and_then(|s| s.get(&entry.key))
    }

    fn take(&mut self, entry: &EntryKey) -> Option<Value> {
        self.expiry.remove(entry);
        let section = self.sections.get_mut(&entry.section)?;
        let value = section.remove(&entry.key);
        if section.is_empty() {
            self.sections.remove(&entry.section);
        }
        value
    }

    fn entry_count(&self) -> usize {
        self.sections.values().map(HashMap::len).sum()
    }
}

/// Inner state protected by RwLock.
struct StoreInner {
    sessions: LruCache<SessionId, SessionState>,
}

impl StoreInner {
    /// Drop the entry if it has expired. Returns `true` if it was dropped.
    fn purge_if_expired(
        &mut self,
        session: SessionId,
        entry: &EntryKey,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(state) = self.sessions.get_mut(&session) else {
            return false;
        };
        if state.expiry.is_expired(entry, now) {
            debug!(
                session_id = %session,
                section = %entry.section,
                key = %entry.key,
                "Session entry expired, removing"
            );
            state.take(entry);
            true
        } else {
            false
        }
    }
}

/// In-memory session store with LRU eviction of whole sessions and
/// per-entry expiration.
///
/// Cheap to clone: clones share the same state.
pub struct MemorySessionStore {
    inner: Arc<RwLock<StoreInner>>,
    config: SessionConfig,
    clock: SharedClock,
}

impl MemorySessionStore {
    /// Create a store that reads wall-clock time.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a store driven by the given clock.
    pub fn with_clock(config: SessionConfig, clock: SharedClock) -> Self {
        let cap = NonZeroUsize::new(config.max_sessions).unwrap_or(NonZeroUsize::MIN);

        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                sessions: LruCache::new(cap),
            })),
            config,
            clock,
        }
    }

    /// Get the store configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Number of sessions currently held.
    pub async fn len(&self) -> usize {
        self.inner.read().await.sessions.len()
    }

    /// Check if no session is held.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.sessions.is_empty()
    }

    /// Get store statistics.
    pub async fn stats(&self) -> StoreStats {
        let inner = self.inner.read().await;
        let (entries, expiring) = inner
            .sessions
            .iter()
            .fold((0, 0), |(entries, expiring), (_, state)| {
                (entries + state.entry_count(), expiring + state.expiry.len())
            });
        StoreStats {
            sessions: inner.sessions.len(),
            capacity: self.config.max_sessions,
            entries,
            expiring,
        }
    }

    /// Spawn the periodic cleanup task if it is enabled in the config.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_cleanup_task(&self) -> Option<JoinHandle<()>> {
        if !self.config.enable_cleanup_task {
            return None;
        }

        let store = self.clone();
        let period = self.config.cleanup_interval;
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match store.cleanup_expired().await {
                    Ok(0) => {}
                    Ok(count) => trace!(count, "Periodic session cleanup"),
                    Err(e) => tracing::warn!(error = %e, "Periodic session cleanup failed"),
                }
            }
        }))
    }
}

impl Clone for MemorySessionStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            config: self.config.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl std::fmt::Debug for MemorySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySessionStore")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    fn qualify_section(&self, section: &str) -> String {
        self.config.section_name(section)
    }

    async fn get(&self, session: SessionId, section: &str, key: &str) -> Result<Option<Value>> {
        let entry = EntryKey::new(section, key);
        let now = self.clock.now();
        let mut inner = self.inner.write().await;

        if inner.purge_if_expired(session, &entry, now) {
            return Ok(None);
        }

        Ok(inner
            .sessions
            .get(&session)
            .and_then(|state| state.entry(&entry))
            .cloned())
    }

    async fn contains(&self, session: SessionId, section: &str, key: &str) -> Result<bool> {
        let entry = EntryKey::new(section, key);
        let now = self.clock.now();
        let inner = self.inner.read().await;

        Ok(inner.sessions.peek(&session).is_some_and(|state| {
            state.entry(&entry).is_some() && !state.expiry.is_expired(&entry, now)
        }))
    }

    async fn insert(
        &self,
        session: SessionId,
        section: &str,
        key: &str,
        value: Value,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let deadline = ttl.map(|ttl| deadline(self.clock.now(), ttl)).transpose()?;
        let mut inner = self.inner.write().await;

        if !inner.sessions.contains(&session)
            && let Some((evicted, _)) = inner.sessions.push(session, SessionState::default())
        {
            debug!(session_id = %evicted, "Evicting LRU session to make room");
        }

        let state = inner
            .sessions
            .get_mut(&session)
            .ok_or_else(|| SessionError::Backend(format!("session {} vanished", session)))?;

        let entry = EntryKey::new(section, key);
        match deadline {
            Some(deadline) => state.expiry.set(entry.clone(), deadline),
            None => state.expiry.remove(&entry),
        }
        state
            .sections
            .entry(entry.section)
            .or_default()
            .insert(entry.key, value);

        trace!(
            session_id = %session,
            section = %section,
            key = %key,
            sessions = inner.sessions.len(),
            "Session entry written"
        );

        Ok(())
    }

    async fn set_expiration(
        &self,
        session: SessionId,
        section: &str,
        key: &str,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let entry = EntryKey::new(section, key);
        let now = self.clock.now();
        let mut inner = self.inner.write().await;

        let not_found = || SessionError::EntryNotFound {
            section: section.to_string(),
            key: key.to_string(),
        };

        if inner.purge_if_expired(session, &entry, now) {
            return Err(not_found());
        }
        let state = inner.sessions.get_mut(&session).ok_or_else(not_found)?;
        if state.entry(&entry).is_none() {
            return Err(not_found());
        }

        match ttl {
            Some(ttl) => state.expiry.set(entry, deadline(now, ttl)?),
            None => state.expiry.remove(&entry),
        }

        Ok(())
    }

    async fn remove(&self, session: SessionId, section: &str, key: &str) -> Result<Option<Value>> {
        let entry = EntryKey::new(section, key);
        let now = self.clock.now();
        let mut inner = self.inner.write().await;

        if inner.purge_if_expired(session, &entry, now) {
            return Ok(None);
        }

        Ok(inner
            .sessions
            .get_mut(&session)
            .and_then(|state| state.take(&entry)))
    }

    async fn remove_section(&self, session: SessionId, section: &str) -> Result<usize> {
        let now = self.clock.now();
        let mut inner = self.inner.write().await;
        let Some(state) = inner.sessions.get_mut(&session) else {
            return Ok(0);
        };

        let Some(entries) = state.sections.remove(section) else {
            return Ok(0);
        };
        let live = entries
            .keys()
            .filter(|key| !state.expiry.is_expired(&EntryKey::new(section, key.as_str()), now))
            .count();
        state.expiry.remove_section(section);
        Ok(live)
    }

    async fn remove_session(&self, session: SessionId) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let removed = inner.sessions.pop(&session).is_some();
        if removed {
            debug!(session_id = %session, "Session removed");
        }
        Ok(removed)
    }

    async fn cleanup_expired(&self) -> Result<usize> {
        let now = self.clock.now();
        let mut inner = self.inner.write().await;
        let mut count = 0;

        for (session, state) in inner.sessions.iter_mut() {
            for entry in state.expiry.drain_expired(now) {
                trace!(
                    session_id = %session,
                    section = %entry.section,
                    key = %entry.key,
                    "Cleaning up expired entry"
                );
                if state.take(&entry).is_some() {
                    count += 1;
                }
            }
        }

        if count > 0 {
            debug!(count, "Cleaned up expired session entries");
        }

        Ok(count)
    }
}

/// Store statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Current number of sessions.
    pub sessions: usize,

    /// Maximum number of sessions.
    pub capacity: usize,

    /// Total entries across all sessions and sections.
    pub entries: usize,

    /// Entries that carry an expiration.
    pub expiring: usize,
}
