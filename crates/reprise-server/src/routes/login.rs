//! Login and logout endpoints.

use std::collections::HashMap;

use axum::{
    Extension, Form, Json, Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use reprise_session::Session;
use reprise_stash::{RequestStash, RestoreOutcome, UserId, UserIdentity};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServerError};
use crate::flash::FlashPresenter;
use crate::redirect::StashRedirect;
use crate::request::AxumRequest;
use crate::state::AppState;
use crate::user::SessionUser;

/// Query of the login page.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    /// Stash key of the request to return to after logging in.
    pub backlink: Option<String>,
}

/// Login challenge returned by `GET /login`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginChallenge {
    /// Where to post credentials.
    pub action: String,
    /// Stash key to send back with the credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backlink: Option<String>,
    /// Currently logged-in user, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// User name to log in as.
    pub user: String,
    /// Stash key of the request to return to.
    #[serde(default)]
    pub backlink: Option<String>,
    /// Flash message to show after the redirect.
    #[serde(default)]
    pub message: Option<String>,
}

/// Logout response.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    /// Whether a user was logged in.
    pub logged_out: bool,
}

/// GET /login
pub async fn login_page(
    State(state): State<AppState>,
    user: SessionUser,
    Query(query): Query<LoginQuery>,
) -> Json<LoginChallenge> {
    Json(LoginChallenge {
        action: state.config.login_path.clone(),
        backlink: query.backlink.filter(|b| !b.is_empty()),
        user: user.id().map(|id| id.to_string()),
    })
}

/// POST /login
///
/// Logs the user in, then sends them back to the stashed request named by
/// `backlink`. Without a live backlink the user lands on `/`.
pub async fn login(
    request: AxumRequest,
    mut user: SessionUser,
    Extension(session): Extension<Session>,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let name = form.user.trim();
    if name.is_empty() {
        return Err(ServerError::BadRequest("user must not be empty".to_string()));
    }
    user.login(UserId::new(name)).await?;

    let mut parameters = HashMap::new();
    if let Some(backlink) = &form.backlink {
        parameters.insert("backlink".to_string(), backlink.clone());
    }
    let mut presenter = FlashPresenter::load(&session, parameters).await?;
    if let Some(message) = form.message.as_deref().filter(|m| !m.is_empty()) {
        presenter.flash_message(&session, message).await?;
    }

    if let Some(backlink) = form.backlink.as_deref().filter(|b| !b.is_empty()) {
        let stash = RequestStash::new(request, session, &user);
        match stash.restore_request(backlink, &presenter).await? {
            RestoreOutcome::Redirect(redirect) => {
                return Ok(StashRedirect(redirect).into_response());
            }
            RestoreOutcome::Nothing => {
                tracing::debug!(backlink, "No stashed request to return to");
            }
        }
    }

    Ok(Redirect::to("/").into_response())
}

/// POST /logout
pub async fn logout(mut user: SessionUser) -> Result<Json<LogoutResponse>> {
    let logged_out = user.logout().await?;
    Ok(Json(LogoutResponse { logged_out }))
}

/// Create login routes.
pub fn login_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(&state.config.login_path, get(login_page).post(login))
        .route("/logout", post(logout))
}
