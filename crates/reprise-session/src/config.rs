//! Configuration for the in-memory session store.

use std::time::Duration;

/// Default maximum number of sessions held before LRU eviction.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Default interval between sweeps of expired entries.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration for [`MemorySessionStore`](crate::MemorySessionStore).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Maximum number of sessions to keep before evicting the least recently used.
    pub max_sessions: usize,

    /// Whether to run a periodic sweep of expired entries.
    /// If false, expired entries are only dropped when they are accessed.
    pub enable_cleanup_task: bool,

    /// Interval for the cleanup task (if enabled).
    pub cleanup_interval: Duration,

    /// Namespace prefixed to every section name (`"<site>/<section>"`).
    /// Lets several applications share one store without clashing.
    pub site: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: DEFAULT_MAX_SESSIONS,
            enable_cleanup_task: true,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            site: None,
        }
    }
}

impl SessionConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of sessions to keep.
    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }

    /// Enable or disable the background cleanup task.
    pub fn with_cleanup_task(mut self, enabled: bool) -> Self {
        self.enable_cleanup_task = enabled;
        self
    }

    /// Set the cleanup interval.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Set the site namespace. An empty string clears it.
    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        let site = site.into();
        self.site = if site.is_empty() { None } else { Some(site) };
        self
    }

    /// Resolve a section name against the configured site namespace.
    pub fn section_name(&self, section: &str) -> String {
        match &self.site {
            Some(site) => format!("{}/{}", site, section),
            None => section.to_string(),
        }
    }
}
