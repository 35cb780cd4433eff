//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [server]     # bind address, cookie settings
//! [session]    # session store sizing and cleanup
//! [stash]      # request stash lifetime
//! ```

use std::net::{IpAddr, SocketAddr};

use reprise_stash::Expiration;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Default port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Default session cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "reprise_sid";

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g. project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepriseConfig {
    /// HTTP server settings.
    pub server: Option<ServerConfig>,

    /// Session store settings.
    pub session: Option<SessionConfig>,

    /// Request stash settings.
    pub stash: Option<StashConfig>,
}

impl RepriseConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Config with every section filled with defaults.
    pub fn with_defaults() -> Self {
        Self {
            server: Some(ServerConfig::default()),
            session: Some(SessionConfig::default()),
            stash: Some(StashConfig::default()),
        }
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: RepriseConfig) {
        if other.server.is_some() {
            self.server = other.server;
        }

        if other.session.is_some() {
            self.session = other.session;
        }

        if other.stash.is_some() {
            self.stash = other.stash;
        }
    }

    /// Server section, or defaults.
    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    /// Session section, or defaults.
    pub fn session(&self) -> SessionConfig {
        self.session.clone().unwrap_or_default()
    }

    /// Stash section, or defaults.
    pub fn stash(&self) -> StashConfig {
        self.stash.clone().unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Server configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Address to bind to.
    pub bind: String,
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Mark the session cookie `Secure` (HTTPS only).
    pub secure_cookie: bool,
    /// Enable request logging.
    pub request_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            secure_cookie: false,
            request_logging: true,
        }
    }
}

impl ServerConfig {
    /// Resolve `bind` and `port` into a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.bind.parse().map_err(|_| ConfigError::InvalidValue {
            field: "server.bind".to_string(),
            reason: format!("'{}' is not an IP address", self.bind),
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Whether the server binds to a loopback address only.
    pub fn is_loopback(&self) -> bool {
        self.bind
            .parse::<IpAddr>()
            .map(|ip| ip.is_loopback())
            .unwrap_or(false)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Session store configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum number of sessions to keep before evicting the least recently used.
    pub max_sessions: usize,
    /// Interval in seconds between sweeps of expired entries. 0 disables the sweep.
    pub cleanup_interval_secs: u64,
    /// Namespace prefixed to session section names.
    pub site: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: 10_000,
            cleanup_interval_secs: 60,
            site: String::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stash Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Request stash configuration section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StashConfig {
    /// How long a stashed request stays restorable, e.g. `"+10 minutes"`.
    pub expiration: Expiration,
}
