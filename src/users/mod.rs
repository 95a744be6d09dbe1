//! Client-side user management.
//!
//! Wraps the REST client for the admin views' CRUD actions. Input is
//! validated locally before anything is sent; field-level validation
//! failures never reach the backend. Any authentication-rejected
//! response is reported to the session manager, which discards the
//! stored session.
//!
//! The cached role only gates what the UI offers; the backend enforces
//! authorization on every call and may still refuse.

use std::sync::Arc;

use tracing::debug;
use validator::Validate;

use crate::client::dto::{CreateUserRequest, UpdateUserRequest};
use crate::client::ApiClient;
use crate::domain::UserProfile;
use crate::session::policy;
use crate::session::AuthSessionManager;
use crate::shared::errors::ApiError;

/// User CRUD against the backend, tied into the session lifecycle.
pub struct UserService {
    api: ApiClient,
    session: Arc<AuthSessionManager>,
}

impl UserService {
    pub fn new(api: ApiClient, session: Arc<AuthSessionManager>) -> Self {
        Self { api, session }
    }

    /// UI gating helper: whether the signed-in account may manage
    /// `target`. False when nobody is signed in.
    pub fn can_manage(&self, target: &UserProfile) -> bool {
        match self.session.snapshot().user {
            Some(actor) => policy::can_manage(&actor, target),
            None => false,
        }
    }

    pub async fn list_users(&self) -> Result<Vec<UserProfile>, ApiError> {
        self.api.list_users().await.map_err(|e| self.observe(e))
    }

    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<UserProfile, ApiError> {
        request
            .validate()
            .map_err(|e| ApiError::from_validation(&e))?;
        self.api
            .create_user(request)
            .await
            .map_err(|e| self.observe(e))
    }

    pub async fn update_user(
        &self,
        id: &str,
        request: &UpdateUserRequest,
    ) -> Result<UserProfile, ApiError> {
        request
            .validate()
            .map_err(|e| ApiError::from_validation(&e))?;
        self.api
            .update_user(id, request)
            .await
            .map_err(|e| self.observe(e))
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        self.api.delete_user(id).await.map_err(|e| self.observe(e))
    }

    pub async fn set_user_active(
        &self,
        id: &str,
        is_active: bool,
    ) -> Result<UserProfile, ApiError> {
        self.api
            .set_user_active(id, is_active)
            .await
            .map_err(|e| self.observe(e))
    }

    /// Route authentication rejections into the session manager before
    /// handing the error back to the caller.
    fn observe(&self, error: ApiError) -> ApiError {
        if error.is_auth_rejection() {
            debug!("User call rejected; clearing session");
            self.session.token_rejected();
        }
        error
    }
}
