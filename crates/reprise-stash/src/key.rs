//! Stash keys and their generation.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of a generated stash key.
pub const KEY_LENGTH: usize = 5;

/// Characters stash keys are drawn from. URL-safe without escaping.
const KEY_CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Opaque reference to a stashed request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StashKey(String);

impl StashKey {
    /// Wrap an existing key string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for StashKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StashKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Source of candidate stash keys.
///
/// Candidates need not be unique; the stash retries until it finds one
/// that is not in use.
pub trait KeyGenerator: Send + Sync {
    /// Produce a candidate key.
    fn generate(&self) -> StashKey;
}

/// Random keys of [`KEY_LENGTH`] characters from `[0-9a-z]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomKeys;

impl KeyGenerator for RandomKeys {
    fn generate(&self) -> StashKey {
        let mut rng = rand::rng();
        let key: String = (0..KEY_LENGTH)
            .map(|_| KEY_CHARSET[rng.random_range(0..KEY_CHARSET.len())] as char)
            .collect();
        StashKey(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_random_key_shape() {
        for _ in 0..100 {
            let key = RandomKeys.generate();
            assert_eq!(key.as_str().len(), KEY_LENGTH);
            assert!(
                key.as_str()
                    .bytes()
                    .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
            );
        }
    }

    #[test]
    fn test_random_keys_vary() {
        let keys: HashSet<StashKey> = (0..50).map(|_| RandomKeys.generate()).collect();
        assert!(keys.len() > 1);
    }
}
