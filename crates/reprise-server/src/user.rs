//! The logged-in user, kept in the session.

use axum::{extract::FromRequestParts, http::request::Parts};
use reprise_session::Session;
use reprise_stash::{UserId, UserIdentity};

use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Session section holding authentication state.
pub const AUTH_SECTION: &str = "auth";

/// Key of the user id within [`AUTH_SECTION`].
const USER_KEY: &str = "user";

/// Current user of a session.
#[derive(Debug, Clone)]
pub struct SessionUser {
    session: Session,
    id: Option<UserId>,
}

impl SessionUser {
    /// Load the user stored in `session`.
    pub async fn load(session: Session) -> Result<Self> {
        let id = session.section(AUTH_SECTION).get_as(USER_KEY).await?;
        Ok(Self { session, id })
    }

    /// Log `id` in for this session.
    pub async fn login(&mut self, id: UserId) -> Result<()> {
        self.session
            .section(AUTH_SECTION)
            .insert_as(USER_KEY, &id)
            .await?;
        tracing::info!(session_id = %self.session.id(), user = %id, "User logged in");
        self.id = Some(id);
        Ok(())
    }

    /// Log the current user out. Returns whether someone was logged in.
    pub async fn logout(&mut self) -> Result<bool> {
        let removed = self.session.section(AUTH_SECTION).remove(USER_KEY).await?;
        if let Some(id) = self.id.take() {
            tracing::info!(session_id = %self.session.id(), user = %id, "User logged out");
        }
        Ok(removed.is_some())
    }

    /// Check if a user is logged in.
    pub fn is_logged_in(&self) -> bool {
        self.id.is_some()
    }
}

impl UserIdentity for SessionUser {
    fn id(&self) -> Option<&UserId> {
        self.id.as_ref()
    }
}

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| ServerError::Internal("Session middleware not installed".to_string()))?;
        Self::load(session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reprise_session::{MemorySessionStore, SessionConfig, SessionId};
    use std::sync::Arc;

    fn session() -> Session {
        let store = MemorySessionStore::new(SessionConfig::new().with_cleanup_task(false));
        Session::new(SessionId::new(), Arc::new(store))
    }

    #[tokio::test]
    async fn test_anonymous_by_default() {
        let user = SessionUser::load(session()).await.unwrap();
        assert!(!user.is_logged_in());
        assert!(user.id().is_none());
    }

    #[tokio::test]
    async fn test_login_persists_in_session() {
        let session = session();
        let mut user = SessionUser::load(session.clone()).await.unwrap();
        user.login(UserId::new("alice")).await.unwrap();

        let reloaded = SessionUser::load(session).await.unwrap();
        assert_eq!(reloaded.id(), Some(&UserId::new("alice")));
    }

    #[tokio::test]
    async fn test_logout() {
        let session = session();
        let mut user = SessionUser::load(session.clone()).await.unwrap();
        user.login(UserId::new("alice")).await.unwrap();

        assert!(user.logout().await.unwrap());
        assert!(!user.is_logged_in());
        assert!(!SessionUser::load(session).await.unwrap().is_logged_in());

        assert!(!user.logout().await.unwrap());
    }
}
