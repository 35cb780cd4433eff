//! Application state shared across handlers.

use std::sync::Arc;

use reprise_session::{Session, SessionId, SharedSessionStore};

use crate::config::ServerConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Session backend.
    pub store: SharedSessionStore,

    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(store: SharedSessionStore, config: ServerConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Handle for the session with the given id.
    pub fn session(&self, id: SessionId) -> Session {
        Session::new(id, self.store.clone())
    }
}
