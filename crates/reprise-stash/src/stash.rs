//! Storing application requests in the session and restoring them.

use std::sync::Arc;

use reprise_session::{Session, SessionSection};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::{Result, StashError};
use crate::expiration::Expiration;
use crate::http::CurrentRequest;
use crate::identity::{Owner, UserIdentity};
use crate::key::{KeyGenerator, RandomKeys, StashKey};
use crate::outcome::{Redirect, RedirectStatus, RestoreOutcome};
use crate::presenter::{FLASH_KEY, Presenter};
use crate::request::{AppRequest, RequestFlag};

/// Query parameter carrying the stash key on the callback URL.
pub const REQUEST_KEY: &str = "_rid";

/// Session section holding stashed requests.
pub const SECTION: &str = "requests";

/// Upper bound on key generation attempts before giving up.
const MAX_KEY_ATTEMPTS: usize = 64;

/// A request as kept in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StashedRequest {
    /// Who may restore it.
    pub owner: Owner,
    /// Absolute URL to redirect back to, including the `_rid` parameter.
    pub url: Url,
    /// The application request itself.
    pub request: AppRequest,
}

/// Stores application requests in the session and hands them back later.
///
/// A stash is request-scoped: it is built from the HTTP request being handled,
/// the caller's session and the current user.
pub struct RequestStash<R, U> {
    http_request: R,
    session: Session,
    user: U,
    keys: Arc<dyn KeyGenerator>,
}

impl<R: CurrentRequest, U: UserIdentity> RequestStash<R, U> {
    /// Create a stash for the current request, session and user.
    pub fn new(http_request: R, session: Session, user: U) -> Self {
        Self {
            http_request,
            session,
            user,
            keys: Arc::new(RandomKeys),
        }
    }

    /// Replace the key generator.
    pub fn with_key_generator(mut self, keys: Arc<dyn KeyGenerator>) -> Self {
        self.keys = keys;
        self
    }

    /// Store `request` and return the key it can be restored with.
    ///
    /// The callback URL is the current request's URL with `_rid` set to the
    /// key. The entry becomes unavailable once `expiration` has passed.
    pub async fn store_request(
        &self,
        request: &AppRequest,
        expiration: Expiration,
    ) -> Result<StashKey> {
        let section = self.section();
        let key = self.unused_key(&section).await?;

        let entry = StashedRequest {
            owner: Owner::of(&self.user),
            url: with_query_param(self.http_request.url(), REQUEST_KEY, key.as_str()),
            request: request.clone(),
        };

        section
            .insert_with_ttl(
                key.as_str(),
                serde_json::to_value(&entry)?,
                expiration.duration(),
            )
            .await?;

        debug!(
            session_id = %self.session.id(),
            key = %key,
            presenter = %request.presenter_name(),
            anonymous = entry.owner.is_anonymous(),
            expiration = %expiration,
            "Request stashed"
        );

        Ok(key)
    }

    /// Restore the request stored under `key` by redirecting back to it.
    ///
    /// Returns [`RestoreOutcome::Nothing`] when there is no live entry for the
    /// current user. When the presenter carries a flash context, its id is
    /// appended to the redirect URL so the message survives the redirect.
    pub async fn restore_request<P: Presenter + ?Sized>(
        &self,
        key: &str,
        presenter: &P,
    ) -> Result<RestoreOutcome> {
        let Some((_, mut url)) = self.load(key).await? else {
            return Ok(RestoreOutcome::Nothing);
        };

        if presenter.has_flash_session()
            && let Some(flash) = presenter.parameter(FLASH_KEY)
        {
            url = with_query_param(&url, FLASH_KEY, &flash);
        }

        let status = if self.http_request.is_method("POST") {
            RedirectStatus::SeeOther
        } else {
            RedirectStatus::Found
        };

        debug!(key = %key, location = %url, "Restoring stashed request");

        Ok(RestoreOutcome::Redirect(Redirect::new(url, status)))
    }

    /// Fetch the request whose key is in `http_request`'s `_rid` parameter.
    ///
    /// A flash id on the current URL is merged into the restored parameters
    /// unless the stored request already has one.
    pub async fn get_request<H: CurrentRequest + ?Sized>(
        &self,
        http_request: &H,
    ) -> Result<Option<AppRequest>> {
        let Some(key) = http_request.query(REQUEST_KEY) else {
            return Ok(None);
        };
        let Some((mut request, _)) = self.load(&key).await? else {
            return Ok(None);
        };

        if let Some(flash) = self.http_request.query(FLASH_KEY)
            && request.parameter(FLASH_KEY).is_none()
        {
            request.set_parameter(FLASH_KEY, flash);
        }

        Ok(Some(request))
    }

    /// Remove the request stored under `key`.
    ///
    /// Restoring never removes an entry on its own; callers that want a
    /// stashed request to be single-use call this after replaying it.
    /// Returns `false` when there is no live entry for the current user.
    pub async fn remove_request(&self, key: &str) -> Result<bool> {
        if self.load(key).await?.is_none() {
            return Ok(false);
        }
        let removed = self.section().remove(key).await?.is_some();
        if removed {
            debug!(key = %key, "Stashed request removed");
        }
        Ok(removed)
    }

    fn section(&self) -> SessionSection {
        self.session.section(SECTION)
    }

    async fn unused_key(&self, section: &SessionSection) -> Result<StashKey> {
        for _ in 0..MAX_KEY_ATTEMPTS {
            let key = self.keys.generate();
            if !section.contains(key.as_str()).await? {
                return Ok(key);
            }
            debug!(key = %key, "Stash key collision, retrying");
        }
        Err(StashError::KeySpaceExhausted(MAX_KEY_ATTEMPTS))
    }

    /// Load a copy of the entry flagged as restored, plus its callback URL.
    async fn load(&self, key: &str) -> Result<Option<(AppRequest, Url)>> {
        let Some(value) = self.section().get(key).await? else {
            debug!(key = %key, "No stashed request under key");
            return Ok(None);
        };

        let stashed: StashedRequest = match serde_json::from_value(value) {
            Ok(stashed) => stashed,
            Err(e) => {
                warn!(key = %key, error = %e, "Ignoring undecodable stashed request");
                return Ok(None);
            }
        };

        if !stashed.owner.permits(&self.user) {
            debug!(key = %key, "Stashed request belongs to another user");
            return Ok(None);
        }

        let mut request = stashed.request;
        request.set_flag(RequestFlag::Restored, true);
        Ok(Some((request, stashed.url)))
    }
}

/// `url` with query parameter `name` set to `value`, replacing previous values.
fn with_query_param(url: &Url, name: &str, value: &str) -> Url {
    let mut updated = url.clone();
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(n, _)| n != name)
        .map(|(n, v)| (n.into_owned(), v.into_owned()))
        .collect();

    updated
        .query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(name, value);
    updated
}
