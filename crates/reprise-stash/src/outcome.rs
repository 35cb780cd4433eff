//! Result of restoring a stashed request.

use url::Url;

/// HTTP status used for a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectStatus {
    /// 302 Found.
    Found,
    /// 303 See Other; used after a POST so the browser follows with GET.
    SeeOther,
}

impl RedirectStatus {
    /// Numeric status code.
    pub fn code(self) -> u16 {
        match self {
            RedirectStatus::Found => 302,
            RedirectStatus::SeeOther => 303,
        }
    }
}

/// A redirect the caller must send instead of continuing normal handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    url: Url,
    status: RedirectStatus,
}

impl Redirect {
    /// Create a redirect.
    pub fn new(url: Url, status: RedirectStatus) -> Self {
        Self { url, status }
    }

    /// Target URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Target URL as a `Location` header value.
    pub fn location(&self) -> &str {
        self.url.as_str()
    }

    /// Redirect status.
    pub fn status(&self) -> RedirectStatus {
        self.status
    }
}

/// Outcome of [`RequestStash::restore_request`](crate::RequestStash::restore_request).
///
/// On `Redirect` the current request is finished: the handler must respond
/// with the redirect and do nothing else.
#[must_use = "a Redirect outcome must be sent back; continuing would skip the restore"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Respond with this redirect and stop handling the current request.
    Redirect(Redirect),
    /// Nothing was stashed under the key (or not for this user); carry on.
    Nothing,
}

impl RestoreOutcome {
    /// Check if this outcome is a redirect.
    pub fn is_redirect(&self) -> bool {
        matches!(self, RestoreOutcome::Redirect(_))
    }

    /// The redirect, if any.
    pub fn into_redirect(self) -> Option<Redirect> {
        match self {
            RestoreOutcome::Redirect(redirect) => Some(redirect),
            RestoreOutcome::Nothing => None,
        }
    }
}
