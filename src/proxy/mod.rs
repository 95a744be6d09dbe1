//! CORS-attaching reverse proxy in front of the remote backend.
//!
//! Deployed when the admin frontend and the backend are not on the same
//! origin: the browser talks to this proxy, which relays to the fixed
//! upstream and answers preflights itself. Stateless; no retries, no
//! connection pooling beyond the shared client, no streaming.

pub mod handlers;

use std::time::Duration;

use axum::routing::any;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Default upstream timeout; an unreachable upstream fails after this
/// rather than hanging.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared proxy state: the fixed upstream origin and the HTTP client.
#[derive(Clone)]
pub struct ProxyState {
    upstream: String,
    http: reqwest::Client,
}

impl ProxyState {
    pub fn new(upstream: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(upstream, DEFAULT_UPSTREAM_TIMEOUT)
    }

    pub fn with_timeout(
        upstream: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            upstream: upstream.into(),
            http,
        })
    }

    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

/// Build the proxy router: every method on every sub-path is forwarded.
pub fn create_proxy_router(state: ProxyState) -> Router {
    Router::new()
        .route("/", any(handlers::forward))
        .route("/{*path}", any(handlers::forward))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
