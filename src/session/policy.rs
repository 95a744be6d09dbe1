//! Session policy: pure authorization checks over stored session data.
//!
//! No I/O and no side effects; everything here is computed from the
//! credential store contents or from profiles passed in by the caller.

use crate::domain::{Role, UserProfile};

use super::store::CredentialStore;

/// Navigation targets handed back to the shell.
pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const PROFILE_PATH: &str = "/profile";

/// True iff both token and profile are currently stored.
pub fn is_authenticated(store: &dyn CredentialStore) -> bool {
    store.token().is_some() && store.user_profile().is_some()
}

/// Minimum-level role check: the current role's level must be at least
/// the required role's level. A superadmin therefore passes every check.
pub fn role_at_least(current: Role, required: Role) -> bool {
    current.level() >= required.level()
}

/// [`role_at_least`] evaluated against the currently stored profile.
///
/// Callers must ensure the store reflects the session they intend to
/// check; an empty store fails every role check.
pub fn has_role(store: &dyn CredentialStore, required: Role) -> bool {
    match store.user_profile() {
        Some(profile) => role_at_least(profile.role, required),
        None => false,
    }
}

/// Whether `actor` may manage `target`.
///
/// Superadmins manage anyone; admins manage only accounts with role
/// `user`; users manage only themselves. Unknown actor roles are denied
/// outright.
pub fn can_manage(actor: &UserProfile, target: &UserProfile) -> bool {
    match actor.role {
        Role::Superadmin => true,
        Role::Admin => target.role == Role::User,
        Role::User => actor.id == target.id,
        Role::Unknown => false,
    }
}

/// Landing page for a freshly authenticated role.
pub fn redirect_target_for(role: Role) -> &'static str {
    match role {
        Role::Superadmin | Role::Admin => DASHBOARD_PATH,
        Role::User => PROFILE_PATH,
        Role::Unknown => LOGIN_PATH,
    }
}
