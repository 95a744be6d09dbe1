//! # Admin Gateway
//!
//! Session core and API gateway for a role-based administrative portal.
//!
//! ## Architecture
//!
//! - **domain**: identity types (roles, profiles)
//! - **session**: credential store, session policy, lifecycle manager
//!   and route guard
//! - **client**: typed REST client for the remote auth/user backend
//! - **users**: client-side user management tied into the session
//! - **proxy**: CORS-attaching reverse proxy in front of the backend
//! - **shared**: error taxonomy

pub mod client;
pub mod config;
pub mod domain;
pub mod proxy;
pub mod server;
pub mod session;
pub mod shared;
pub mod users;

pub use config::{default_config_path, AppConfig};

// Re-export the session surface for easy access
pub use session::{AuthSessionManager, AuthStatus, CredentialStore, SessionState};

// Re-export proxy entry points
pub use proxy::{create_proxy_router, ProxyState};
