//! Server-side session store with named sections and per-entry expiration.
//!
//! This crate provides the session backend used by the request stash:
//! - A [`SessionStore`] capability trait so backends can be swapped or faked
//! - [`MemorySessionStore`], an LRU-bounded in-memory implementation
//! - Per-entry absolute expiration, checked against an injectable [`Clock`]
//! - [`Session`] / [`SessionSection`] handles scoping access to one session
//!
//! # Example
//!
//! ```rust,ignore
//! use reprise_session::{MemorySessionStore, Session, SessionConfig, SessionId};
//!
//! let store = Arc::new(MemorySessionStore::new(SessionConfig::default()));
//! let session = Session::new(SessionId::new(), store);
//! let section = session.section("requests");
//! section
//!     .insert_with_ttl("abcde", serde_json::json!({"a": 1}), Duration::from_secs(600))
//!     .await?;
//! ```

mod clock;
mod config;
mod error;
mod expiry;
mod session;
mod store;

#[cfg(any(test, feature = "testing"))]
pub use clock::ManualClock;
pub use clock::{Clock, SharedClock, SystemClock};
pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use expiry::{EntryKey, ExpiryTracker};
pub use session::{Session, SessionId, SessionSection};
pub use store::{MemorySessionStore, SessionStore, SharedSessionStore, StoreStats};
