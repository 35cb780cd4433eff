//! Server configuration.

use std::net::SocketAddr;

use reprise_stash::Expiration;

/// Default session cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "reprise_sid";

/// Default path of the login page.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// Name of the session cookie.
    pub cookie_name: String,

    /// Mark the session cookie `Secure`.
    pub secure_cookie: bool,

    /// Enable request logging.
    pub request_logging: bool,

    /// Path anonymous visitors are sent to when they hit a protected resource.
    pub login_path: String,

    /// How long a stashed request stays restorable.
    pub stash_expiration: Expiration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8080)),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            secure_cookie: false,
            request_logging: true,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            stash_expiration: Expiration::default(),
        }
    }
}

impl ServerConfig {
    /// Create a new server config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Set the session cookie name.
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Mark the session cookie `Secure` or not.
    pub fn with_secure_cookie(mut self, secure: bool) -> Self {
        self.secure_cookie = secure;
        self
    }

    /// Enable or disable request logging.
    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.request_logging = enabled;
        self
    }

    /// Set the login path.
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Set how long stashed requests stay restorable.
    pub fn with_stash_expiration(mut self, expiration: Expiration) -> Self {
        self.stash_expiration = expiration;
        self
    }
}
