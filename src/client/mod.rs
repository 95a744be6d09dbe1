//! Typed REST client for the remote authentication/user backend.
//!
//! Attaches `Authorization: Bearer <token>` from the credential store to
//! every request when a token is present, applies a bounded timeout, and
//! maps non-success responses onto [`ApiError`], extracting the
//! backend's `detail` message when one is provided.

pub mod dto;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use validator::Validate;

use crate::domain::UserProfile;
use crate::session::store::CredentialStore;
use crate::shared::errors::ApiError;

use self::dto::{
    CreateUserRequest, ErrorBody, LoginRequest, LoginResponse, ResetPasswordRequest,
    ResetTokenStatus, ToggleActiveRequest, UpdateUserRequest,
};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the remote backend.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn CredentialStore>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, store: Arc<dyn CredentialStore>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, store, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        store: Arc<dyn CredentialStore>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Build a request with the bearer token attached when one is stored.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self.http.request(method, self.url(path));
        if let Some(token) = self.store.token() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send and resolve the response, mapping any non-success status
    /// onto the error taxonomy.
    async fn send_checked(&self, builder: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(Self::error_from(status, response).await)
    }

    async fn error_from(status: StatusCode, response: reqwest::Response) -> ApiError {
        let detail = response
            .text()
            .await
            .ok()
            .and_then(|raw| serde_json::from_str::<ErrorBody>(&raw).ok())
            .and_then(|body| body.detail);
        debug!(
            status = status.as_u16(),
            detail = detail.as_deref().unwrap_or(""),
            "Backend returned an error"
        );
        ApiError::from_status(status.as_u16(), detail)
    }

    async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send_checked(builder).await?;
        Ok(response.json().await?)
    }

    // ── Auth ───────────────────────────────────────────────────────

    /// POST `/auth/login`
    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.json(self.request(Method::POST, "/auth/login").json(credentials))
            .await
    }

    /// GET `/auth/me`, validating the stored token against the backend.
    pub async fn current_user(&self) -> Result<UserProfile, ApiError> {
        self.json(self.request(Method::GET, "/auth/me")).await
    }

    /// GET `/auth/reset-password/{token}`: check a reset token before
    /// showing the reset form.
    pub async fn verify_reset_token(&self, token: &str) -> Result<ResetTokenStatus, ApiError> {
        let builder = self.request(Method::GET, &format!("/auth/reset-password/{}", token));
        let response = builder.send().await?;
        match response.status() {
            s if s.is_success() => Ok(ResetTokenStatus::Valid),
            StatusCode::NOT_FOUND => Ok(ResetTokenStatus::Invalid),
            StatusCode::GONE => Ok(ResetTokenStatus::AlreadyUsed),
            s => Err(Self::error_from(s, response).await),
        }
    }

    /// POST `/auth/reset-password`. The password is validated locally
    /// first; a weak one never reaches the backend.
    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<(), ApiError> {
        request
            .validate()
            .map_err(|e| ApiError::from_validation(&e))?;
        self.send_checked(self.request(Method::POST, "/auth/reset-password").json(request))
            .await?;
        Ok(())
    }

    // ── Users ──────────────────────────────────────────────────────

    /// GET `/users`
    pub async fn list_users(&self) -> Result<Vec<UserProfile>, ApiError> {
        self.json(self.request(Method::GET, "/users")).await
    }

    /// POST `/users`
    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<UserProfile, ApiError> {
        self.json(self.request(Method::POST, "/users").json(request))
            .await
    }

    /// PUT `/users/{id}`
    pub async fn update_user(
        &self,
        id: &str,
        request: &UpdateUserRequest,
    ) -> Result<UserProfile, ApiError> {
        self.json(
            self.request(Method::PUT, &format!("/users/{}", id))
                .json(request),
        )
        .await
    }

    /// DELETE `/users/{id}`
    pub async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        self.send_checked(self.request(Method::DELETE, &format!("/users/{}", id)))
            .await?;
        Ok(())
    }

    /// PATCH `/users/{id}` with `{"is_active": ...}`
    pub async fn set_user_active(&self, id: &str, is_active: bool) -> Result<UserProfile, ApiError> {
        self.json(
            self.request(Method::PATCH, &format!("/users/{}", id))
                .json(&ToggleActiveRequest { is_active }),
        )
        .await
    }
}
