//! Per-session handles over a [`SessionStore`].

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{Result, SessionError};
use crate::store::SharedSessionStore;

/// Unique identifier for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| SessionError::InvalidId(s.to_string()))
    }
}

/// Handle to one session in a store.
#[derive(Clone)]
pub struct Session {
    id: SessionId,
    store: SharedSessionStore,
}

impl Session {
    /// Bind a session id to a store.
    pub fn new(id: SessionId, store: SharedSessionStore) -> Self {
        Self { id, store }
    }

    /// The session id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The underlying store.
    pub fn store(&self) -> &SharedSessionStore {
        &self.store
    }

    /// Open a named section of this session.
    pub fn section(&self, name: &str) -> SessionSection {
        SessionSection {
            session: self.id,
            name: self.store.qualify_section(name),
            store: self.store.clone(),
        }
    }

    /// Drop all state of this session.
    pub async fn destroy(&self) -> Result<bool> {
        self.store.remove_session(self.id).await
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("id", &self.id).finish()
    }
}

/// A named key-value namespace inside one session.
#[derive(Clone)]
pub struct SessionSection {
    session: SessionId,
    name: String,
    store: SharedSessionStore,
}

impl SessionSection {
    /// Qualified section name as stored.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Id of the owning session.
    pub fn session_id(&self) -> SessionId {
        self.session
    }

    /// Read a raw value.
    pub async fn get(&self, key: &str) -> Result<Option<Value>> {
        self.store.get(self.session, &self.name, key).await
    }

    /// Read and deserialize a value.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Check whether a live entry exists.
    pub async fn contains(&self, key: &str) -> Result<bool> {
        self.store.contains(self.session, &self.name, key).await
    }

    /// Write a raw value that never expires.
    pub async fn insert(&self, key: &str, value: Value) -> Result<()> {
        self.store
            .insert(self.session, &self.name, key, value, None)
            .await
    }

    /// Write a raw value that expires `ttl` from now.
    ///
    /// Nothing is written when the deadline cannot be represented.
    pub async fn insert_with_ttl(&self, key: &str, value: Value, ttl: Duration) -> Result<()> {
        self.store
            .insert(self.session, &self.name, key, value, Some(ttl))
            .await
    }

    /// Serialize and write a value.
    pub async fn insert_as<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        self.insert(key, serde_json::to_value(value)?).await
    }

    /// Serialize and write a value that expires `ttl` from now.
    pub async fn insert_as_with_ttl<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<()> {
        self.insert_with_ttl(key, serde_json::to_value(value)?, ttl)
            .await
    }

    /// Set the entry's time-to-live, counted from now. `None` clears it.
    pub async fn set_expiration(&self, key: &str, ttl: Option<Duration>) -> Result<()> {
        self.store
            .set_expiration(self.session, &self.name, key, ttl)
            .await
    }

    /// Remove an entry, returning its value if it was live.
    pub async fn remove(&self, key: &str) -> Result<Option<Value>> {
        self.store.remove(self.session, &self.name, key).await
    }

    /// Remove every entry of this section.
    pub async fn clear(&self) -> Result<usize> {
        self.store.remove_section(self.session, &self.name).await
    }
}

impl std::fmt::Debug for SessionSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSection")
            .field("session", &self.session)
            .field("name", &self.name)
            .finish()
    }
}
