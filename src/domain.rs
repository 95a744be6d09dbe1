//! Core identity types shared across the session layer and the REST client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role, ordered by privilege.
///
/// Role strings the backend may send that are not part of the closed set
/// deserialize to [`Role::Unknown`] rather than failing, and carry no
/// privileges at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Admin,
    User,
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Privilege level used for minimum-level checks.
    pub fn level(&self) -> u8 {
        match self {
            Role::Superadmin => 3,
            Role::Admin => 2,
            Role::User => 1,
            Role::Unknown => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Admin => "admin",
            Role::User => "user",
            Role::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account profile as returned by the backend.
///
/// Cached locally as a hint for UI gating only; the backend remains the
/// source of truth and may reject actions the cached role appears to
/// permit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
