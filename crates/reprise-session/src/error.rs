//! Error types for session store operations.

/// Error type for session store operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The entry targeted by an operation does not exist (or has expired).
    #[error("Session entry not found: {section}/{key}")]
    EntryNotFound { section: String, key: String },

    /// Session identifier could not be parsed.
    #[error("Invalid session id: {0}")]
    InvalidId(String),

    /// A stored value could not be converted to or from JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An expiration too far in the future to compute a deadline for.
    #[error("Expiration out of range: {0:?}")]
    ExpirationOutOfRange(std::time::Duration),

    /// Error from the storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for session store operations.
pub type Result<T> = std::result::Result<T, SessionError>;
