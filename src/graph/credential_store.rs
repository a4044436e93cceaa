//! Persistence for the Microsoft identity authentication record.
//!
//! The record holds the last access token, its expiry and the refresh token,
//! so later runs can skip the browser sign-in.

use crate::error::GraphResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Seconds before expiry at which a cached access token is no longer reused.
pub const EXPIRY_SKEW_SECS: i64 = 60;

/// Cached tokens for one signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Unix seconds at which `access_token` expires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Client the tokens were issued to; tokens for another client are ignored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

impl AuthRecord {
    /// The access token, if it outlives `now` by more than the skew.
    pub fn valid_access_token(&self, now: i64) -> Option<&str> {
        let expires_at = self.expires_at?;
        if expires_at - EXPIRY_SKEW_SECS > now {
            self.access_token.as_deref()
        } else {
            None
        }
    }
}

/// Load/save seam for the authentication record.
pub trait CredentialStore: Send + Sync {
    /// The stored record, or `None` when nothing usable is stored.
    fn load(&self) -> GraphResult<Option<AuthRecord>>;

    fn save(&self, record: &AuthRecord) -> GraphResult<()>;
}

/// JSON file store. The file is written unencrypted.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> GraphResult<Option<AuthRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&text) {
            Ok(record) => {
                tracing::debug!("Loaded auth record from {}", self.path.display());
                Ok(Some(record))
            }
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable auth record {}: {}",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    fn save(&self, record: &AuthRecord) -> GraphResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(record)?)?;
        tracing::debug!("Saved auth record to {}", self.path.display());
        Ok(())
    }
}

/// In-process store, used by tests and short-lived sessions.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    record: Mutex<Option<AuthRecord>>,
}

impl MemoryCredentialStore {
    pub fn new(record: Option<AuthRecord>) -> Self {
        Self {
            record: Mutex::new(record),
        }
    }

    /// Copy of the currently stored record.
    pub fn current(&self) -> Option<AuthRecord> {
        self.record.lock().ok().and_then(|guard| guard.clone())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> GraphResult<Option<AuthRecord>> {
        Ok(self.current())
    }

    fn save(&self, record: &AuthRecord) -> GraphResult<()> {
        if let Ok(mut guard) = self.record.lock() {
            *guard = Some(record.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_access_token_respects_skew() {
        let record = AuthRecord {
            access_token: Some("tok".to_string()),
            expires_at: Some(1_000),
            ..Default::default()
        };
        assert_eq!(record.valid_access_token(900), Some("tok"));
        assert_eq!(record.valid_access_token(940), None);
        assert_eq!(AuthRecord::default().valid_access_token(0), None);
    }

    #[test]
    fn test_file_store_round_trip_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested/auth_record.json"));
        assert_eq!(store.load().unwrap(), None);

        let record = AuthRecord {
            refresh_token: Some("refresh".to_string()),
            client_id: Some("client".to_string()),
            ..Default::default()
        };
        store.save(&record).unwrap();
        assert_eq!(store.load().unwrap(), Some(record));
    }

    #[test]
    fn test_file_store_ignores_corrupt_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth_record.json");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(FileCredentialStore::new(path).load().unwrap(), None);
    }
}
