//! Route guard: decides whether a protected view may render.
//!
//! Pure function of the current [`SessionState`] and an optional
//! required role. Redirects are returned as values; the shell performs
//! the navigation.

use crate::domain::Role;

use super::manager::SessionState;
use super::policy::{self, DASHBOARD_PATH, LOGIN_PATH, PROFILE_PATH};

/// What the shell should do with a protected route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Startup verification has not resolved; render a neutral pending
    /// indicator and do not redirect yet.
    Pending,
    /// Navigate away instead of rendering.
    Redirect(&'static str),
    /// Render the protected content unchanged.
    Allow,
}

/// Evaluate a protected route against the session.
///
/// Insufficient role redirects to a role-appropriate fallback rather
/// than a universal access-denied page: plain users land on their
/// profile, everyone else on the dashboard.
pub fn evaluate(state: &SessionState, required: Option<Role>) -> RouteDecision {
    if state.is_loading {
        return RouteDecision::Pending;
    }

    if !state.is_authenticated {
        return RouteDecision::Redirect(LOGIN_PATH);
    }

    if let Some(required) = required {
        let current = state.user.as_ref().map(|u| u.role).unwrap_or(Role::Unknown);
        if !policy::role_at_least(current, required) {
            let fallback = if current == Role::User {
                PROFILE_PATH
            } else {
                DASHBOARD_PATH
            };
            return RouteDecision::Redirect(fallback);
        }
    }

    RouteDecision::Allow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserProfile;
    use chrono::Utc;

    fn state(user: Option<Role>, is_authenticated: bool, is_loading: bool) -> SessionState {
        SessionState {
            user: user.map(|role| UserProfile {
                id: "u-1".to_string(),
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                role,
                is_active: true,
                created_at: Utc::now(),
            }),
            is_authenticated,
            is_loading,
        }
    }

    #[test]
    fn test_pending_while_loading() {
        let s = state(None, false, true);
        assert_eq!(evaluate(&s, None), RouteDecision::Pending);
        // No redirect flicker even when a role is required.
        assert_eq!(evaluate(&s, Some(Role::Admin)), RouteDecision::Pending);
    }

    #[test]
    fn test_unauthenticated_redirects_to_login() {
        let s = state(None, false, false);
        assert_eq!(evaluate(&s, None), RouteDecision::Redirect("/login"));
    }

    #[test]
    fn test_authenticated_without_required_role_allows() {
        let s = state(Some(Role::User), true, false);
        assert_eq!(evaluate(&s, None), RouteDecision::Allow);
    }

    #[test]
    fn test_sufficient_role_allows() {
        let s = state(Some(Role::Superadmin), true, false);
        assert_eq!(evaluate(&s, Some(Role::Admin)), RouteDecision::Allow);
    }

    #[test]
    fn test_plain_user_falls_back_to_profile() {
        let s = state(Some(Role::User), true, false);
        assert_eq!(
            evaluate(&s, Some(Role::Admin)),
            RouteDecision::Redirect("/profile")
        );
    }

    #[test]
    fn test_admin_falls_back_to_dashboard() {
        let s = state(Some(Role::Admin), true, false);
        assert_eq!(
            evaluate(&s, Some(Role::Superadmin)),
            RouteDecision::Redirect("/dashboard")
        );
    }
}
