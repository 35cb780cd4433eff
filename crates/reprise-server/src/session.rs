//! Session cookie middleware.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request, header},
    middleware::Next,
    response::Response,
};
use reprise_session::SessionId;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Attach a [`Session`](reprise_session::Session) to every request.
///
/// The session id comes from the session cookie. A missing or malformed
/// cookie starts a fresh session and the response carries the new cookie.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let existing = session_cookie(request.headers(), &state.config.cookie_name);
    let id = existing.unwrap_or_default();

    if existing.is_none() {
        tracing::debug!(session_id = %id, "Starting new session");
    }

    request.extensions_mut().insert(state.session(id));

    let mut response = next.run(request).await;

    if existing.is_none() {
        match HeaderValue::from_str(&set_cookie_value(&state.config, id)) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::warn!(error = %e, "Invalid session cookie header"),
        }
    }

    response
}

/// Read the session id from the request cookies.
pub fn session_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .and_then(|(_, value)| value.trim().parse().ok())
}

/// `Set-Cookie` value for a session id.
pub fn set_cookie_value(config: &ServerConfig, id: SessionId) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        config.cookie_name, id
    );
    if config.secure_cookie {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_session_cookie_found_among_others() {
        let id = SessionId::new();
        let headers = headers(&format!("theme=dark; reprise_sid={id}; lang=en"));
        assert_eq!(session_cookie(&headers, "reprise_sid"), Some(id));
    }

    #[test]
    fn test_session_cookie_malformed() {
        let headers = headers("reprise_sid=not-a-uuid");
        assert_eq!(session_cookie(&headers, "reprise_sid"), None);
    }

    #[test]
    fn test_session_cookie_missing() {
        assert_eq!(session_cookie(&HeaderMap::new(), "reprise_sid"), None);
        assert_eq!(session_cookie(&headers("other=1"), "reprise_sid"), None);
    }

    #[test]
    fn test_set_cookie_attributes() {
        let id = SessionId::new();
        let config = ServerConfig::new();
        let value = set_cookie_value(&config, id);
        assert_eq!(
            value,
            format!("reprise_sid={id}; Path=/; HttpOnly; SameSite=Lax")
        );

        let secure = set_cookie_value(&config.with_secure_cookie(true), id);
        assert!(secure.ends_with("; Secure"));
    }
}
