//! Request stash: persist an application request across a redirect boundary.
//!
//! A typical flow is a login challenge. The protected handler stores the
//! current request with [`RequestStash::store_request`] and sends the user to
//! the login page with the returned key. After authentication the login
//! handler calls [`RequestStash::restore_request`], which yields a redirect
//! back to the original URL carrying the reserved `_rid` parameter. On that
//! request, [`RequestStash::get_request`] hands back the original request
//! flagged as restored so it can be replayed.
//!
//! Stashed requests live in the `"requests"` section of the caller's session,
//! expire after a configurable time and are only handed back to the user who
//! created them (or to anyone, when they were created anonymously).

pub mod error;
pub mod expiration;
pub mod http;
pub mod identity;
pub mod key;
pub mod outcome;
pub mod presenter;
pub mod request;
pub mod stash;

pub use error::{Result, StashError};
pub use expiration::{DEFAULT_EXPIRATION, Expiration};
pub use http::{CurrentRequest, HttpRequest};
pub use identity::{Owner, UserId, UserIdentity};
pub use key::{KEY_LENGTH, KeyGenerator, RandomKeys, StashKey};
pub use outcome::{Redirect, RedirectStatus, RestoreOutcome};
pub use presenter::{FLASH_KEY, Presenter};
pub use request::{AppRequest, RequestFlag};
pub use stash::{REQUEST_KEY, RequestStash, SECTION, StashedRequest};
