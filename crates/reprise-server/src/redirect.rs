//! HTTP response for a restore redirect.

use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use reprise_stash::{Redirect, RedirectStatus};

/// A stash [`Redirect`] sent as an HTTP response.
#[derive(Debug, Clone)]
pub struct StashRedirect(pub Redirect);

impl IntoResponse for StashRedirect {
    fn into_response(self) -> Response {
        let status = match self.0.status() {
            RedirectStatus::Found => StatusCode::FOUND,
            RedirectStatus::SeeOther => StatusCode::SEE_OTHER,
        };

        match HeaderValue::from_str(self.0.location()) {
            Ok(location) => (status, [(header::LOCATION, location)]).into_response(),
            Err(e) => {
                tracing::error!(location = %self.0.location(), error = %e, "Unusable redirect target");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
