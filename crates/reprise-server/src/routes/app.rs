//! Protected application pages.
//!
//! Anonymous visitors get their request stashed and are sent to the login
//! page with the stash key as `backlink`. Logged-in users see the request,
//! replayed from the stash when the URL carries `_rid`.

use std::collections::BTreeMap;

use axum::{
    Extension, Json, Router,
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use reprise_session::Session;
use reprise_stash::{
    AppRequest, CurrentRequest, FLASH_KEY, REQUEST_KEY, RequestFlag, RequestStash, UserIdentity,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::flash::take_flash_messages;
use crate::request::AxumRequest;
use crate::state::AppState;
use crate::user::SessionUser;

/// Presenter name recorded on stashed application requests.
pub const APP_PRESENTER: &str = "App";

/// Response of a protected page.
#[derive(Debug, Serialize, Deserialize)]
pub struct AppResponse {
    /// Logged-in user.
    pub user: String,
    /// Requested path below `/app/`.
    pub path: String,
    /// HTTP method of the (possibly replayed) request.
    pub method: String,
    /// Whether the request was replayed from the stash.
    pub restored: bool,
    /// Request parameters.
    pub parameters: BTreeMap<String, Value>,
    /// Form fields of a replayed or current POST.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub post: BTreeMap<String, Value>,
    /// Flash messages delivered with this request.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flash: Vec<String>,
}

/// GET|POST /app/{*path}
pub async fn app_page(
    State(state): State<AppState>,
    Path(path): Path<String>,
    request: AxumRequest,
    user: SessionUser,
    Extension(session): Extension<Session>,
    body: Bytes,
) -> Result<Response> {
    let current = app_request(&request, &path, &body);
    let stash = RequestStash::new(request.clone(), session.clone(), &user);

    let Some(id) = user.id() else {
        let key = stash
            .store_request(&current, state.config.stash_expiration)
            .await?;
        let target = format!("{}?backlink={}", state.config.login_path, key);
        return Ok(Redirect::to(&target).into_response());
    };

    let replayed = stash.get_request(&request).await?;
    let restored = replayed.is_some();
    let shown = replayed.unwrap_or(current);

    let flash = match shown.parameter(FLASH_KEY).and_then(Value::as_str) {
        Some(fid) => take_flash_messages(&session, fid).await?,
        None => Vec::new(),
    };

    Ok(Json(AppResponse {
        user: id.to_string(),
        path,
        method: shown.method().to_string(),
        restored,
        parameters: shown.parameters().clone(),
        post: shown.post().clone(),
        flash,
    })
    .into_response())
}

/// Build the application request for the current HTTP request.
fn app_request(request: &AxumRequest, path: &str, body: &[u8]) -> AppRequest {
    let parameters: BTreeMap<String, Value> = request
        .url()
        .query_pairs()
        .filter(|(name, _)| name != REQUEST_KEY)
        .map(|(name, value)| (name.into_owned(), Value::String(value.into_owned())))
        .chain([("path".to_string(), Value::String(path.to_string()))])
        .collect();

    let post: BTreeMap<String, Value> = if request.is_method("POST") {
        url::form_urlencoded::parse(body)
            .map(|(name, value)| (name.into_owned(), Value::String(value.into_owned())))
            .collect()
    } else {
        BTreeMap::new()
    };

    AppRequest::new(APP_PRESENTER, request.method())
        .with_parameters(parameters)
        .with_post(post)
        .with_flag(RequestFlag::Secured, request.url().scheme() == "https")
}

/// Create application routes.
pub fn app_routes() -> Router<AppState> {
    Router::new().route("/app/{*path}", get(app_page).post(app_page))
}
