//! The incoming HTTP request as seen by the stash.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use reprise_stash::CurrentRequest;
use url::Url;

use crate::error::ServerError;
use crate::state::AppState;

/// Header set by reverse proxies terminating TLS.
const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Method and absolute URL of the request being handled.
///
/// The URL is rebuilt from the `Host` header (falling back to the bind
/// address) and the request URI. The scheme is taken from
/// `X-Forwarded-Proto` when present.
#[derive(Debug, Clone)]
pub struct AxumRequest {
    method: String,
    url: Url,
}

impl AxumRequest {
    /// Build from request parts.
    pub fn from_parts(parts: &Parts, fallback_host: &str) -> Result<Self, ServerError> {
        let scheme = forwarded_scheme(&parts.headers).unwrap_or("http");
        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
            .unwrap_or(fallback_host);
        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        let raw = format!("{scheme}://{host}{path_and_query}");
        let url = Url::parse(&raw)
            .map_err(|e| ServerError::BadRequest(format!("Invalid request URL {raw}: {e}")))?;

        Ok(Self {
            method: parts.method.as_str().to_string(),
            url,
        })
    }
}

fn forwarded_scheme(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(FORWARDED_PROTO)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(',').next().unwrap_or(value).trim())
        .filter(|scheme| matches!(*scheme, "http" | "https"))
}

impl CurrentRequest for AxumRequest {
    fn url(&self) -> &Url {
        &self.url
    }

    fn method(&self) -> &str {
        &self.method
    }
}

impl FromRequestParts<AppState> for AxumRequest {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let fallback = state.config.bind_address.to_string();
        Self::from_parts(parts, &fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(request: Request<()>) -> Parts {
        request.into_parts().0
    }

    #[test]
    fn test_url_from_host_header() {
        let parts = parts(
            Request::get("/app/orders?page=2")
                .header(header::HOST, "shop.example:8443")
                .body(())
                .unwrap(),
        );
        let request = AxumRequest::from_parts(&parts, "127.0.0.1:8080").unwrap();

        assert_eq!(request.url().as_str(), "http://shop.example:8443/app/orders?page=2");
        assert_eq!(request.method(), "GET");
        assert_eq!(request.query("page").as_deref(), Some("2"));
    }

    #[test]
    fn test_url_falls_back_to_bind_address() {
        let parts = parts(Request::post("/login").body(()).unwrap());
        let request = AxumRequest::from_parts(&parts, "127.0.0.1:8080").unwrap();

        assert_eq!(request.url().as_str(), "http://127.0.0.1:8080/login");
        assert!(request.is_method("post"));
    }

    #[test]
    fn test_forwarded_proto() {
        let parts = parts(
            Request::get("/app/x")
                .header(header::HOST, "example.org")
                .header(FORWARDED_PROTO, "https, http")
                .body(())
                .unwrap(),
        );
        let request = AxumRequest::from_parts(&parts, "127.0.0.1:8080").unwrap();
        assert_eq!(request.url().scheme(), "https");
    }

    #[test]
    fn test_unknown_forwarded_proto_ignored() {
        let parts = parts(
            Request::get("/")
                .header(header::HOST, "example.org")
                .header(FORWARDED_PROTO, "gopher")
                .body(())
                .unwrap(),
        );
        let request = AxumRequest::from_parts(&parts, "127.0.0.1:8080").unwrap();
        assert_eq!(request.url().scheme(), "http");
    }

    #[test]
    fn test_bad_host_rejected() {
        let parts = parts(
            Request::get("/")
                .header(header::HOST, "bad host")
                .body(())
                .unwrap(),
        );
        assert!(matches!(
            AxumRequest::from_parts(&parts, "127.0.0.1:8080"),
            Err(ServerError::BadRequest(_))
        ));
    }
}
