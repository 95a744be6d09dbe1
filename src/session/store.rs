//! Persistent credential store.
//!
//! The browser-facing deployment keeps the session in two short-lived
//! cookies (`auth_token` and `user_data`); this module is the same
//! contract over a local record jar. Records carry their own expiry and
//! read as absent once stale. Token and profile are conceptually one
//! session record: [`CredentialStore::set_session`] and
//! [`CredentialStore::clear`] touch both in a single store mutation so no
//! partial state is observable.
//!
//! Storage operations never fail loudly: malformed or unreadable
//! persisted data reads as absent, and write errors are logged and
//! swallowed, mirroring cookie semantics.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::UserProfile;

/// Record name for the bearer token.
pub const TOKEN_RECORD: &str = "auth_token";
/// Record name for the serialized profile.
pub const PROFILE_RECORD: &str = "user_data";

/// Default record lifetime, matching the backend's token expiry.
pub fn default_ttl() -> Duration {
    Duration::hours(1)
}

/// One stored value with its expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Record {
    value: String,
    expires_at: DateTime<Utc>,
}

type Jar = HashMap<String, Record>;

fn fresh_value(jar: &Jar, name: &str) -> Option<String> {
    let record = jar.get(name)?;
    if record.expires_at <= Utc::now() {
        return None;
    }
    Some(record.value.clone())
}

fn parse_profile(value: &str) -> Option<UserProfile> {
    match serde_json::from_str(value) {
        Ok(profile) => Some(profile),
        Err(e) => {
            warn!("Discarding malformed stored profile: {}", e);
            None
        }
    }
}

/// Session persistence contract.
///
/// Synchronous and infallible from the caller's perspective; no network
/// I/O ever happens here.
pub trait CredentialStore: Send + Sync {
    fn token(&self) -> Option<String>;
    fn set_token(&self, token: &str);
    fn remove_token(&self);

    /// Returns the cached profile, or `None` when absent, expired or
    /// malformed.
    fn user_profile(&self) -> Option<UserProfile>;
    fn set_user_profile(&self, profile: &UserProfile);
    fn remove_user_profile(&self);

    /// Persist token and profile together in one mutation.
    fn set_session(&self, token: &str, profile: &UserProfile);

    /// Remove token and profile together. Idempotent.
    fn clear(&self);
}

// ── File-backed store ──────────────────────────────────────────────

/// Credential store persisted as a single JSON file.
pub struct FileCredentialStore {
    path: PathBuf,
    ttl: Duration,
    lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl: default_ttl(),
            lock: Mutex::new(()),
        }
    }

    pub fn with_ttl(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Jar {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            Err(_) => Jar::default(),
        }
    }

    fn persist(&self, jar: &Jar) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("Failed to create session directory: {}", e);
                return;
            }
        }
        match serde_json::to_string(jar) {
            Ok(raw) => {
                if let Err(e) = std::fs::write(&self.path, raw) {
                    warn!("Failed to persist session file: {}", e);
                }
            }
            Err(e) => warn!("Failed to serialize session records: {}", e),
        }
    }

    fn mutate(&self, f: impl FnOnce(&mut Jar)) {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut jar = self.load();
        f(&mut jar);
        self.persist(&jar);
    }

    fn record(&self, value: String) -> Record {
        Record {
            value,
            expires_at: Utc::now() + self.ttl,
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn token(&self) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        fresh_value(&self.load(), TOKEN_RECORD)
    }

    fn set_token(&self, token: &str) {
        let record = self.record(token.to_string());
        self.mutate(|jar| {
            jar.insert(TOKEN_RECORD.to_string(), record);
        });
    }

    fn remove_token(&self) {
        self.mutate(|jar| {
            jar.remove(TOKEN_RECORD);
        });
    }

    fn user_profile(&self) -> Option<UserProfile> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        fresh_value(&self.load(), PROFILE_RECORD).and_then(|v| parse_profile(&v))
    }

    fn set_user_profile(&self, profile: &UserProfile) {
        let Ok(serialized) = serde_json::to_string(profile) else {
            return;
        };
        let record = self.record(serialized);
        self.mutate(|jar| {
            jar.insert(PROFILE_RECORD.to_string(), record);
        });
    }

    fn remove_user_profile(&self) {
        self.mutate(|jar| {
            jar.remove(PROFILE_RECORD);
        });
    }

    fn set_session(&self, token: &str, profile: &UserProfile) {
        let Ok(serialized) = serde_json::to_string(profile) else {
            return;
        };
        let token_record = self.record(token.to_string());
        let profile_record = self.record(serialized);
        self.mutate(|jar| {
            jar.insert(TOKEN_RECORD.to_string(), token_record);
            jar.insert(PROFILE_RECORD.to_string(), profile_record);
        });
    }

    fn clear(&self) {
        self.mutate(|jar| {
            jar.remove(TOKEN_RECORD);
            jar.remove(PROFILE_RECORD);
        });
    }
}

// ── In-memory store ────────────────────────────────────────────────

/// Credential store held entirely in memory, with the same TTL
/// semantics as the file-backed store. Used in tests and embeddings
/// that do not want session persistence across restarts.
pub struct MemoryCredentialStore {
    ttl: Duration,
    records: Mutex<Jar>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::with_ttl(default_ttl())
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            records: Mutex::new(Jar::default()),
        }
    }

    fn record(&self, value: String) -> Record {
        Record {
            value,
            expires_at: Utc::now() + self.ttl,
        }
    }

    fn jar(&self) -> std::sync::MutexGuard<'_, Jar> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn token(&self) -> Option<String> {
        fresh_value(&self.jar(), TOKEN_RECORD)
    }

    fn set_token(&self, token: &str) {
        let record = self.record(token.to_string());
        self.jar().insert(TOKEN_RECORD.to_string(), record);
    }

    fn remove_token(&self) {
        self.jar().remove(TOKEN_RECORD);
    }

    fn user_profile(&self) -> Option<UserProfile> {
        fresh_value(&self.jar(), PROFILE_RECORD).and_then(|v| parse_profile(&v))
    }

    fn set_user_profile(&self, profile: &UserProfile) {
        let Ok(serialized) = serde_json::to_string(profile) else {
            return;
        };
        let record = self.record(serialized);
        self.jar().insert(PROFILE_RECORD.to_string(), record);
    }

    fn remove_user_profile(&self) {
        self.jar().remove(PROFILE_RECORD);
    }

    fn set_session(&self, token: &str, profile: &UserProfile) {
        let Ok(serialized) = serde_json::to_string(profile) else {
            return;
        };
        let token_record = self.record(token.to_string());
        let profile_record = self.record(serialized);
        let mut jar = self.jar();
        jar.insert(TOKEN_RECORD.to_string(), token_record);
        jar.insert(PROFILE_RECORD.to_string(), profile_record);
    }

    fn clear(&self) {
        let mut jar = self.jar();
        jar.remove(TOKEN_RECORD);
        jar.remove(PROFILE_RECORD);
    }
}
