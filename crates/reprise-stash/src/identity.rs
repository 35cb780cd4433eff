//! Identity of the current principal and ownership of stashed requests.

use serde::{Deserialize, Serialize};

/// Stable identifier of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a user id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Access to the current principal.
pub trait UserIdentity {
    /// Id of the logged-in user, `None` when anonymous.
    fn id(&self) -> Option<&UserId>;
}

impl UserIdentity for Option<UserId> {
    fn id(&self) -> Option<&UserId> {
        self.as_ref()
    }
}

impl UserIdentity for UserId {
    fn id(&self) -> Option<&UserId> {
        Some(self)
    }
}

impl<T: UserIdentity + ?Sized> UserIdentity for &T {
    fn id(&self) -> Option<&UserId> {
        (**self).id()
    }
}

/// Who may restore a stashed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Owner {
    /// Stashed by an anonymous visitor; anyone may restore it.
    Anonymous,
    /// Stashed by this user; only they may restore it.
    User(UserId),
}

impl Owner {
    /// Owner for a request stashed by the given principal.
    pub fn of<U: UserIdentity + ?Sized>(user: &U) -> Self {
        match user.id() {
            Some(id) => Owner::User(id.clone()),
            None => Owner::Anonymous,
        }
    }

    /// Check whether `user` may restore a request with this owner.
    pub fn permits<U: UserIdentity + ?Sized>(&self, user: &U) -> bool {
        match self {
            Owner::Anonymous => true,
            Owner::User(owner) => user.id() == Some(owner),
        }
    }

    /// Check if this is an anonymous owner.
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Owner::Anonymous)
    }
}
