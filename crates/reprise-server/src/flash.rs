//! Flash messages and the presenter view used when restoring requests.

use std::collections::HashMap;
use std::time::Duration;

use reprise_session::Session;
use reprise_stash::{FLASH_KEY, KeyGenerator, Presenter, RandomKeys};

use crate::error::Result;

/// Session section holding flash messages, keyed by flash id.
pub const FLASH_SECTION: &str = "flash";

/// How long flash messages survive without being shown.
pub const FLASH_EXPIRATION: Duration = Duration::from_secs(30);

/// Parameters of the handling request plus its flash context.
#[derive(Debug, Clone, Default)]
pub struct FlashPresenter {
    parameters: HashMap<String, String>,
    flash: bool,
}

impl FlashPresenter {
    /// Create a presenter over request parameters.
    ///
    /// The flash context is active when `_fid` names live flash messages.
    pub async fn load(session: &Session, parameters: HashMap<String, String>) -> Result<Self> {
        let flash = match parameters.get(FLASH_KEY) {
            Some(id) => session.section(FLASH_SECTION).contains(id).await?,
            None => false,
        };
        Ok(Self { parameters, flash })
    }

    /// Queue a flash message, opening a flash context if there is none.
    ///
    /// Returns the flash id.
    pub async fn flash_message(&mut self, session: &Session, message: &str) -> Result<String> {
        let id = match self.parameters.get(FLASH_KEY) {
            Some(id) if self.flash => id.clone(),
            _ => RandomKeys.generate().into_string(),
        };

        let section = session.section(FLASH_SECTION);
        let mut messages: Vec<String> = section.get_as(&id).await?.unwrap_or_default();
        messages.push(message.to_string());
        section
            .insert_as_with_ttl(&id, &messages, FLASH_EXPIRATION)
            .await?;

        self.parameters.insert(FLASH_KEY.to_string(), id.clone());
        self.flash = true;
        Ok(id)
    }
}

impl Presenter for FlashPresenter {
    fn has_flash_session(&self) -> bool {
        self.flash
    }

    fn parameter(&self, name: &str) -> Option<String> {
        self.parameters.get(name).cloned()
    }
}

/// Take the flash messages stored under `id`.
pub async fn take_flash_messages(session: &Session, id: &str) -> Result<Vec<String>> {
    let messages = session
        .section(FLASH_SECTION)
        .remove(id)
        .await?
        .map(serde_json::from_value)
        .transpose()
        .map_err(reprise_session::SessionError::from)?
        .unwrap_or_default();
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reprise_session::{ManualClock, MemorySessionStore, SessionConfig, SessionId};
    use std::sync::Arc;

    fn session(clock: Arc<ManualClock>) -> Session {
        let store = MemorySessionStore::with_clock(SessionConfig::new().with_cleanup_task(false), clock);
        Session::new(SessionId::new(), Arc::new(store))
    }

    #[tokio::test]
    async fn test_no_flash_without_id() {
        let session = session(Arc::new(ManualClock::new()));
        let presenter = FlashPresenter::load(&session, HashMap::new()).await.unwrap();
        assert!(!presenter.has_flash_session());
        assert!(presenter.parameter(FLASH_KEY).is_none());
    }

    #[tokio::test]
    async fn test_unknown_flash_id_is_inactive() {
        let session = session(Arc::new(ManualClock::new()));
        let params = HashMap::from([(FLASH_KEY.to_string(), "zzzzz".to_string())]);
        let presenter = FlashPresenter::load(&session, params).await.unwrap();
        assert!(!presenter.has_flash_session());
    }

    #[tokio::test]
    async fn test_flash_message_opens_context() {
        let session = session(Arc::new(ManualClock::new()));
        let mut presenter = FlashPresenter::default();

        let id = presenter.flash_message(&session, "Welcome back").await.unwrap();
        assert!(presenter.has_flash_session());
        assert_eq!(presenter.parameter(FLASH_KEY), Some(id.clone()));

        let second = presenter.flash_message(&session, "Again").await.unwrap();
        assert_eq!(second, id);

        let params = HashMap::from([(FLASH_KEY.to_string(), id.clone())]);
        let reloaded = FlashPresenter::load(&session, params).await.unwrap();
        assert!(reloaded.has_flash_session());

        let messages = take_flash_messages(&session, &id).await.unwrap();
        assert_eq!(messages, vec!["Welcome back", "Again"]);
        assert!(take_flash_messages(&session, &id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_flash_messages_expire() {
        let clock = Arc::new(ManualClock::new());
        let session = session(clock.clone());
        let mut presenter = FlashPresenter::default();
        let id = presenter.flash_message(&session, "Hi").await.unwrap();

        clock.advance(FLASH_EXPIRATION + Duration::from_secs(1));
        assert!(take_flash_messages(&session, &id).await.unwrap().is_empty());
    }
}
