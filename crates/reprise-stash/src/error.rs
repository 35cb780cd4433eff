//! Error types for the request stash.

/// Result type alias for stash operations.
pub type Result<T> = std::result::Result<T, StashError>;

/// Errors that can occur while stashing or restoring requests.
///
/// A missing, expired or foreign stash entry is not an error; those cases
/// surface as `None` / [`RestoreOutcome::Nothing`](crate::RestoreOutcome::Nothing).
#[derive(Debug, thiserror::Error)]
pub enum StashError {
    /// The session backend failed.
    #[error("session store error: {0}")]
    Session(#[from] reprise_session::SessionError),

    /// A request could not be serialized into the session.
    #[error("failed to serialize stashed request: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An expiration string could not be parsed.
    #[error("invalid expiration '{0}' (expected e.g. \"+10 minutes\")")]
    InvalidExpiration(String),

    /// A URL could not be parsed.
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    /// No free key was found after repeated attempts.
    #[error("no unused stash key found after {0} attempts")]
    KeySpaceExhausted(usize),
}
