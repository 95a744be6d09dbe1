//! Auth session manager.
//!
//! Single owner of session mutation. Orchestrates login/logout/refresh
//! against the remote backend, keeps the credential store in step, and
//! exposes a read-only [`SessionState`] snapshot to consumers.
//!
//! State machine: `Initializing -> {Authenticated, Unauthenticated}`,
//! with `Login`, `Logout`, `ProfileRefresh` and the out-of-band
//! `TokenRejected` transitions. Verification is fail-closed: on startup,
//! an unreachable backend is treated exactly like a rejected token.
//!
//! Navigation is never performed here. Where the UI shell should move
//! after a transition, the target path is handed back as a value
//! (`LoginOutcome::redirect`, the return of [`AuthSessionManager::logout`]).

use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use crate::client::dto::{LoginRequest, LoginResponse};
use crate::client::ApiClient;
use crate::domain::UserProfile;
use crate::shared::errors::ApiError;

use super::policy::{self, LOGIN_PATH};
use super::store::CredentialStore;

/// Authentication status of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    /// Startup verification has not resolved yet.
    Initializing,
    Authenticated,
    Unauthenticated,
}

/// Read-only view of the session for consumers (route guard, UI shell).
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub user: Option<UserProfile>,
    pub is_authenticated: bool,
    /// True only during the startup verification round-trip or while a
    /// login call is in flight.
    pub is_loading: bool,
}

/// Result of a login attempt. Login never fails with an `Err`; failures
/// are reported through `success`/`error`.
#[derive(Debug)]
pub struct LoginOutcome {
    pub success: bool,
    pub user: Option<UserProfile>,
    pub error: Option<String>,
    /// Where the shell should navigate on success, per the role's
    /// landing page. `None` on failure.
    pub redirect: Option<&'static str>,
}

struct Inner {
    status: AuthStatus,
    user: Option<UserProfile>,
    login_in_flight: bool,
}

/// Orchestrates the session lifecycle. Cheap to share behind an `Arc`.
pub struct AuthSessionManager {
    store: Arc<dyn CredentialStore>,
    api: ApiClient,
    inner: RwLock<Inner>,
}

impl AuthSessionManager {
    pub fn new(store: Arc<dyn CredentialStore>, api: ApiClient) -> Self {
        // Seed the view from whatever is cached so the UI can render a
        // username immediately; it is overwritten once verification
        // resolves.
        let cached = store.user_profile();
        Self {
            store,
            api,
            inner: RwLock::new(Inner {
                status: AuthStatus::Initializing,
                user: cached,
                login_in_flight: false,
            }),
        }
    }

    pub fn status(&self) -> AuthStatus {
        self.read().status
    }

    /// Current session view.
    pub fn snapshot(&self) -> SessionState {
        let inner = self.read();
        SessionState {
            user: inner.user.clone(),
            is_authenticated: inner.status == AuthStatus::Authenticated,
            is_loading: inner.status == AuthStatus::Initializing || inner.login_in_flight,
        }
    }

    /// Startup verification.
    ///
    /// With stored credentials, asks the backend who the token belongs
    /// to and overwrites the cached profile with the answer. Any failure,
    /// including an unreachable backend, discards the stored session.
    /// Without stored credentials no network call is made.
    pub async fn initialize(&self) -> SessionState {
        let has_credentials = self.store.token().is_some() && self.store.user_profile().is_some();

        if has_credentials {
            match self.api.current_user().await {
                Ok(profile) => {
                    self.store.set_user_profile(&profile);
                    info!(username = %profile.username, "Stored session verified");
                    self.transition(AuthStatus::Authenticated, Some(profile));
                }
                Err(e) => {
                    warn!("Stored session rejected: {}", e);
                    self.store.clear();
                    self.transition(AuthStatus::Unauthenticated, None);
                }
            }
        } else {
            self.transition(AuthStatus::Unauthenticated, None);
        }

        self.snapshot()
    }

    /// Attempt a login. Resolves with an outcome value in all cases.
    pub async fn login(&self, credentials: LoginRequest) -> LoginOutcome {
        self.write().login_in_flight = true;

        let result = self.api.login(&credentials).await;

        match result {
            Ok(LoginResponse { access_token, user }) => {
                // Token and profile land in the store as one record.
                self.store.set_session(&access_token, &user);
                {
                    let mut inner = self.write();
                    inner.status = AuthStatus::Authenticated;
                    inner.user = Some(user.clone());
                    inner.login_in_flight = false;
                }
                info!(username = %user.username, role = %user.role, "Login succeeded");
                let redirect = policy::redirect_target_for(user.role);
                LoginOutcome {
                    success: true,
                    user: Some(user),
                    error: None,
                    redirect: Some(redirect),
                }
            }
            Err(e) => {
                self.write().login_in_flight = false;
                let message = login_error_message(&e);
                warn!("Login failed: {}", e);
                LoginOutcome {
                    success: false,
                    user: None,
                    error: Some(message),
                    redirect: None,
                }
            }
        }
    }

    /// Synchronous logout: the stored session is discarded immediately,
    /// with no server round-trip. Returns the path the shell should
    /// navigate to.
    pub fn logout(&self) -> &'static str {
        self.store.clear();
        self.transition(AuthStatus::Unauthenticated, None);
        info!("Logged out");
        LOGIN_PATH
    }

    /// Replace the cached profile (after a profile edit) without
    /// touching the token or the authentication status.
    pub fn refresh_profile(&self, profile: UserProfile) {
        self.store.set_user_profile(&profile);
        self.write().user = Some(profile);
    }

    /// Out-of-band transition for an authentication-rejected response
    /// observed by any other API call. Same effect as a rejected
    /// startup verification.
    pub fn token_rejected(&self) {
        warn!("Session token rejected by the backend; discarding session");
        self.store.clear();
        self.transition(AuthStatus::Unauthenticated, None);
    }

    fn transition(&self, status: AuthStatus, user: Option<UserProfile>) {
        let mut inner = self.write();
        inner.status = status;
        inner.user = user;
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Server-provided message when one exists, regardless of status;
/// generic fallback for transport failures and detail-less responses.
fn login_error_message(error: &ApiError) -> String {
    error
        .server_message()
        .map(str::to_string)
        .unwrap_or_else(|| "Login failed".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::session::store::MemoryCredentialStore;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use chrono::Utc;

    fn profile(username: &str, role: Role) -> UserProfile {
        UserProfile {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            role,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    async fn spawn_backend(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn manager(base: &str, store: Arc<MemoryCredentialStore>) -> AuthSessionManager {
        let api = ApiClient::new(base, store.clone() as Arc<dyn CredentialStore>).unwrap();
        AuthSessionManager::new(store, api)
    }

    #[tokio::test]
    async fn test_startup_with_confirmed_session_uses_server_profile() {
        let server_profile = profile("fresh", Role::Admin);
        let response = Json(server_profile.clone());
        let base = spawn_backend(
            Router::new().route(
                "/auth/me",
                get(move || {
                    let response = response.clone();
                    async move { response }
                }),
            ),
        )
        .await;

        let store = Arc::new(MemoryCredentialStore::new());
        store.set_session("tok-1", &profile("stale", Role::Admin));

        let mgr = manager(&base, store.clone());
        let state = mgr.initialize().await;

        assert!(state.is_authenticated);
        assert!(!state.is_loading);
        assert_eq!(state.user.as_ref().unwrap().username, "fresh");
        // Cached profile was overwritten, not the stale one.
        assert_eq!(store.user_profile().unwrap().username, "fresh");
    }

    #[tokio::test]
    async fn test_startup_with_rejected_token_clears_store() {
        let base = spawn_backend(Router::new().route(
            "/auth/me",
            get(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(serde_json::json!({ "detail": "Token expired" })),
                )
            }),
        ))
        .await;

        let store = Arc::new(MemoryCredentialStore::new());
        store.set_session("tok-1", &profile("alice", Role::User));

        let mgr = manager(&base, store.clone());
        let state = mgr.initialize().await;

        assert!(!state.is_authenticated);
        assert!(state.user.is_none());
        assert!(store.token().is_none());
        assert!(store.user_profile().is_none());
    }

    #[tokio::test]
    async fn test_startup_with_unreachable_backend_fails_closed() {
        let store = Arc::new(MemoryCredentialStore::new());
        store.set_session("tok-1", &profile("alice", Role::User));

        let mgr = manager("http://127.0.0.1:9", store.clone());
        let state = mgr.initialize().await;

        assert!(!state.is_authenticated);
        assert!(store.token().is_none());
    }

    #[tokio::test]
    async fn test_startup_without_credentials_skips_network() {
        // An unreachable base proves no call is attempted: the result
        // resolves immediately as unauthenticated.
        let store = Arc::new(MemoryCredentialStore::new());
        let mgr = manager("http://127.0.0.1:9", store);
        let state = mgr.initialize().await;

        assert!(!state.is_authenticated);
        assert!(!state.is_loading);
        assert_eq!(mgr.status(), AuthStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn test_login_success_persists_session_and_redirects() {
        let user = profile("root", Role::Superadmin);
        let response = Json(serde_json::json!({
            "access_token": "tok-new",
            "user": user,
        }));
        let base = spawn_backend(
            Router::new().route(
                "/auth/login",
                post(move || {
                    let response = response.clone();
                    async move { response }
                }),
            ),
        )
        .await;

        let store = Arc::new(MemoryCredentialStore::new());
        let mgr = manager(&base, store.clone());
        mgr.initialize().await;

        let outcome = mgr
            .login(LoginRequest {
                username: "root".into(),
                password: "secret123".into(),
            })
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.redirect, Some("/dashboard"));
        assert_eq!(outcome.user.unwrap().username, "root");
        assert_eq!(store.token().as_deref(), Some("tok-new"));
        assert!(store.user_profile().is_some());
        assert!(mgr.snapshot().is_authenticated);
        assert!(!mgr.snapshot().is_loading);
    }

    #[tokio::test]
    async fn test_login_failure_reports_server_message() {
        let base = spawn_backend(Router::new().route(
            "/auth/login",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(serde_json::json!({ "detail": "Invalid credentials" })),
                )
            }),
        ))
        .await;

        let store = Arc::new(MemoryCredentialStore::new());
        let mgr = manager(&base, store.clone());
        mgr.initialize().await;

        let outcome = mgr
            .login(LoginRequest {
                username: "root".into(),
                password: "wrong".into(),
            })
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Invalid credentials"));
        assert!(outcome.redirect.is_none());
        // Store untouched by the failed attempt.
        assert!(store.token().is_none());
        assert!(!mgr.snapshot().is_authenticated);
    }

    #[tokio::test]
    async fn test_login_failure_surfaces_server_error_detail() {
        let base = spawn_backend(Router::new().route(
            "/auth/login",
            post(|| async {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(serde_json::json!({ "detail": "Backend down for maintenance" })),
                )
            }),
        ))
        .await;

        let store = Arc::new(MemoryCredentialStore::new());
        let mgr = manager(&base, store);
        mgr.initialize().await;

        let outcome = mgr
            .login(LoginRequest {
                username: "root".into(),
                password: "secret123".into(),
            })
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Backend down for maintenance"));
    }

    #[tokio::test]
    async fn test_login_failure_without_detail_uses_generic_message() {
        let base = spawn_backend(Router::new().route(
            "/auth/login",
            post(|| async { StatusCode::UNAUTHORIZED }),
        ))
        .await;

        let store = Arc::new(MemoryCredentialStore::new());
        let mgr = manager(&base, store);
        mgr.initialize().await;

        let outcome = mgr
            .login(LoginRequest {
                username: "root".into(),
                password: "wrong".into(),
            })
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Login failed"));
    }

    #[tokio::test]
    async fn test_login_failure_on_network_error_uses_generic_message() {
        let store = Arc::new(MemoryCredentialStore::new());
        let mgr = manager("http://127.0.0.1:9", store);
        mgr.initialize().await;

        let outcome = mgr
            .login(LoginRequest {
                username: "root".into(),
                password: "secret123".into(),
            })
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Login failed"));
    }

    #[tokio::test]
    async fn test_logout_is_synchronous_and_clears_everything() {
        let store = Arc::new(MemoryCredentialStore::new());
        store.set_session("tok-1", &profile("alice", Role::User));
        let mgr = manager("http://127.0.0.1:9", store.clone());

        let target = mgr.logout();

        assert_eq!(target, "/login");
        assert!(store.token().is_none());
        assert!(store.user_profile().is_none());
        assert_eq!(mgr.status(), AuthStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn test_refresh_profile_keeps_token_and_status() {
        let user = profile("alice", Role::User);
        let response = Json(user.clone());
        let base = spawn_backend(
            Router::new().route(
                "/auth/me",
                get(move || {
                    let response = response.clone();
                    async move { response }
                }),
            ),
        )
        .await;

        let store = Arc::new(MemoryCredentialStore::new());
        store.set_session("tok-1", &user);
        let mgr = manager(&base, store.clone());
        mgr.initialize().await;

        let mut edited = user.clone();
        edited.email = "new@example.com".to_string();
        mgr.refresh_profile(edited.clone());

        assert_eq!(store.token().as_deref(), Some("tok-1"));
        assert_eq!(store.user_profile(), Some(edited));
        assert!(mgr.snapshot().is_authenticated);
    }

    #[tokio::test]
    async fn test_token_rejected_out_of_band() {
        let store = Arc::new(MemoryCredentialStore::new());
        store.set_session("tok-1", &profile("alice", Role::User));
        let mgr = manager("http://127.0.0.1:9", store.clone());

        mgr.token_rejected();

        assert!(store.token().is_none());
        assert_eq!(mgr.status(), AuthStatus::Unauthenticated);
        assert!(!mgr.snapshot().is_authenticated);
    }
}
