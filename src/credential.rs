//! Persisted analytics credential.
//!
//! The token is an opaque string stored under a fixed key in a small JSON
//! file, so it survives restarts. Other keys in the file are preserved.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Key the analytics token is stored under.
pub const CREDENTIAL_KEY: &str = "analytics_token";

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Credential cannot be empty")]
    Empty,

    #[error("Credential file is corrupt: {0}")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored token, or `None` when nothing has been saved.
    pub fn load(&self) -> Result<Option<String>, CredentialError> {
        Ok(self.read_entries()?.remove(CREDENTIAL_KEY))
    }

    /// Save a token (trimmed). Blank tokens are rejected.
    pub fn save(&self, token: &str) -> Result<String, CredentialError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(CredentialError::Empty);
        }
        let mut entries = self.read_entries()?;
        entries.insert(CREDENTIAL_KEY.to_string(), token.to_string());
        self.write_entries(&entries)?;
        tracing::info!(path = %self.path.display(), "Analytics credential saved");
        Ok(token.to_string())
    }

    pub fn clear(&self) -> Result<(), CredentialError> {
        let mut entries = self.read_entries()?;
        if entries.remove(CREDENTIAL_KEY).is_some() {
            self.write_entries(&entries)?;
            tracing::info!("Analytics credential cleared");
        }
        Ok(())
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, CredentialError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| CredentialError::Corrupt(e.to_string()))
    }

    /// Write via a sibling temp file and rename.
    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| CredentialError::Corrupt(e.to_string()))?;
        let staging = self.path.with_extension("json.tmp");
        std::fs::write(&staging, json)?;
        std::fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> CredentialStore {
        CredentialStore::new(dir.path().join("nested").join("credentials.json"))
    }

    #[test]
    fn missing_file_means_no_credential() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(store_in(&dir).load().unwrap(), None);
    }

    #[test]
    fn saved_token_survives_a_new_store() {
        let dir = tempfile::tempdir().unwrap();
        let saved = store_in(&dir).save("  tok-123 ").unwrap();
        assert_eq!(saved, "tok-123");
        assert_eq!(store_in(&dir).load().unwrap().as_deref(), Some("tok-123"));
    }

    #[test]
    fn blank_token_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(store_in(&dir).save("   "), Err(CredentialError::Empty)));
    }

    #[test]
    fn clear_removes_only_the_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), r#"{"analytics_token":"a","theme":"dark"}"#).unwrap();

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("theme"));
    }

    #[test]
    fn clear_without_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        store_in(&dir).clear().unwrap();
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("credentials.json"));
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(store.load(), Err(CredentialError::Corrupt(_))));
    }
}
