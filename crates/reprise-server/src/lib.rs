//! HTTP server demonstrating the request stash.
//!
//! Anonymous requests to `/app/...` are stashed in the session and the
//! visitor is sent to the login page. After logging in they are redirected
//! back and the original request is replayed.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use reprise_server::{Server, ServerConfig};
//! use reprise_session::{MemorySessionStore, SessionConfig};
//!
//! let store = Arc::new(MemorySessionStore::new(SessionConfig::default()));
//! let config = ServerConfig::new().with_bind_address("127.0.0.1:8080".parse()?);
//!
//! Server::new(store, config).run().await?;
//! ```

pub mod config;
pub mod error;
pub mod flash;
pub mod logging;
pub mod redirect;
pub mod request;
pub mod routes;
pub mod session;
pub mod state;
pub mod user;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use flash::{FLASH_EXPIRATION, FLASH_SECTION, FlashPresenter};
pub use logging::request_logging_middleware;
pub use redirect::StashRedirect;
pub use request::AxumRequest;
pub use session::session_middleware;
pub use state::AppState;
pub use user::{AUTH_SECTION, SessionUser};

use std::net::SocketAddr;

use axum::{Router, middleware};
use reprise_session::SharedSessionStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// The Reprise HTTP server.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a new server over a session store.
    pub fn new(store: SharedSessionStore, config: ServerConfig) -> Self {
        Self {
            state: AppState::new(store, config),
        }
    }

    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        Router::new()
            .merge(routes::health_routes())
            .merge(self.session_routes())
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                logging::request_logging_middleware,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Routes that need a session.
    fn session_routes(&self) -> Router<AppState> {
        Router::new()
            .merge(routes::login_routes(&self.state))
            .merge(routes::app_routes())
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                session::session_middleware,
            ))
    }

    /// Run the server on the configured address.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.bind_address;
        self.run_on(addr).await
    }

    /// Run the server on a specific address.
    pub async fn run_on(self, addr: SocketAddr) -> Result<()> {
        let router = self.router();

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind {addr}: {e}")))?;

        info!(addr = %addr, "Server listening");

        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {e}")))?;

        Ok(())
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }

    /// Get the application state.
    pub fn state(&self) -> &AppState {
        &self.state
    }
}
