//! Proxy request handling.
//!
//! One request in, one response out. The inbound path is joined onto
//! the fixed upstream base URL; method, `content-type` and
//! `authorization` headers and the body are forwarded; the upstream's
//! status and body are relayed verbatim. Every response, including
//! preflights and proxy errors, carries the permissive CORS header set.

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::{header, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{debug, warn};

use super::ProxyState;

/// Upper bound on a buffered request or response body.
const BODY_LIMIT: usize = 10 * 1024 * 1024;

fn cors_headers() -> [(HeaderName, HeaderValue); 4] {
    [
        (
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, Authorization"),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        ),
    ]
}

/// The proxy's single error shape: any transport failure becomes a
/// fixed internal-error status with a structured payload. No retries.
fn proxy_error(message: String) -> Response {
    warn!("Proxy error: {}", message);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        cors_headers(),
        Json(json!({
            "error": "Proxy Error",
            "message": message,
        })),
    )
        .into_response()
}

/// Forward one request to the upstream backend.
pub async fn forward(State(state): State<ProxyState>, request: Request) -> Response {
    let method = request.method().clone();

    // Preflight short-circuits with success and no body.
    if method == Method::OPTIONS {
        return (StatusCode::OK, cors_headers()).into_response();
    }

    let path = request.uri().path().to_string();
    let target = format!(
        "{}/{}",
        state.upstream().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    debug!(%method, %path, %target, "Proxying request");

    let content_type = request.headers().get(header::CONTENT_TYPE).cloned();
    let authorization = request.headers().get(header::AUTHORIZATION).cloned();

    let body = match to_bytes(request.into_body(), BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(e) => return proxy_error(e.to_string()),
    };

    let mut builder = state.http().request(method.clone(), &target);
    builder = match content_type {
        Some(value) => builder.header(header::CONTENT_TYPE, value),
        None => builder.header(header::CONTENT_TYPE, "application/json"),
    };
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    if method != Method::GET && method != Method::HEAD {
        builder = builder.body(body);
    }

    let upstream = match builder.send().await {
        Ok(response) => response,
        Err(e) => return proxy_error(e.to_string()),
    };

    let status = upstream.status();
    let bytes = match upstream.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => return proxy_error(e.to_string()),
    };
    debug!(status = status.as_u16(), "Upstream responded");

    // Relay structured payloads as JSON, anything else as opaque text.
    // The payload is never altered or rejected based on its shape.
    match serde_json::from_slice::<serde_json::Value>(&bytes) {
        Ok(value) => (status, cors_headers(), Json(value)).into_response(),
        Err(_) => {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            (status, cors_headers(), text).into_response()
        }
    }
}
