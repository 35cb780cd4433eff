//! HTTP routes.

pub mod app;
pub mod health;
pub mod login;

pub use app::{AppResponse, app_page, app_routes};
pub use health::{HealthResponse, health, health_routes};
pub use login::{LoginChallenge, LoginForm, LogoutResponse, login, login_page, login_routes, logout};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Request, header},
        response::Response,
    };
    use reprise_session::{ManualClock, MemorySessionStore, SessionConfig};
    use tower::ServiceExt;

    use crate::{Server, ServerConfig};

    /// Router over an in-memory store driven by a manual clock.
    pub struct Harness {
        pub router: Router,
        pub clock: Arc<ManualClock>,
    }

    impl Harness {
        pub fn new() -> Self {
            let clock = Arc::new(ManualClock::new());
            let store = MemorySessionStore::with_clock(
                SessionConfig::new().with_cleanup_task(false),
                clock.clone(),
            );
            let server = Server::new(
                Arc::new(store),
                ServerConfig::new().with_request_logging(false),
            );
            Self {
                router: server.router(),
                clock,
            }
        }

        pub async fn send(&self, request: Request<Body>) -> Response {
            self.router.clone().oneshot(request).await.unwrap()
        }

        pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
            let mut builder = Request::get(uri);
            if let Some(cookie) = cookie {
                builder = builder.header(header::COOKIE, cookie);
            }
            self.send(builder.body(Body::empty()).unwrap()).await
        }

        pub async fn post_form(&self, uri: &str, cookie: Option<&str>, form: &str) -> Response {
            let mut builder = Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            if let Some(cookie) = cookie {
                builder = builder.header(header::COOKIE, cookie);
            }
            self.send(builder.body(Body::from(form.to_string())).unwrap())
                .await
        }
    }

    /// `name=value` pair of the session cookie set by a response.
    pub fn session_cookie(response: &Response) -> String {
        let set = response.headers()[header::SET_COOKIE].to_str().unwrap();
        set.split(';').next().unwrap().to_string()
    }

    /// `Location` header of a response.
    pub fn location(response: &Response) -> String {
        response.headers()[header::LOCATION]
            .to_str()
            .unwrap()
            .to_string()
    }

    /// Path and query of an absolute URL.
    pub fn path_and_query(location: &str) -> String {
        let url = url::Url::parse(location).unwrap();
        match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        }
    }

    pub async fn body_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }
}
