//! Session layer: credential persistence, policy, lifecycle and route
//! gating.

pub mod guard;
pub mod manager;
pub mod policy;
pub mod store;

pub use guard::{evaluate, RouteDecision};
pub use manager::{AuthSessionManager, AuthStatus, LoginOutcome, SessionState};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
