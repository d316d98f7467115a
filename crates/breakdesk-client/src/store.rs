// SPDX-FileCopyrightText: 2026 Breakdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Saved operator credentials.
//!
//! One JSON file holding a username and a password, written after every
//! successful login and read at startup. A missing file (or one with both
//! fields empty) means the operator has to log in.

use std::io;
use std::path::{Path, PathBuf};

use breakdesk_core::{BreakdeskError, Credentials};

/// JSON file store for one set of credentials.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config_dir>/breakdesk/credentials.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("breakdesk").join("credentials.json"))
    }

    /// Store at `path`, or at [`default_path`](Self::default_path).
    pub fn at(path: Option<&Path>) -> Result<Self, BreakdeskError> {
        path.map(Path::to_path_buf)
            .or_else(Self::default_path)
            .map(Self::new)
            .ok_or_else(|| {
                BreakdeskError::Config(
                    "no config directory; set client.credentials_path".to_string(),
                )
            })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<Credentials>, BreakdeskError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error(e)),
        };
        let credentials: Credentials = serde_json::from_str(&content).map_err(storage_error)?;
        if credentials.username.is_empty() && credentials.password.is_empty() {
            return Ok(None);
        }
        Ok(Some(credentials))
    }

    pub fn save(&self, credentials: &Credentials) -> Result<(), BreakdeskError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(storage_error)?;
        }
        let json = serde_json::to_string_pretty(credentials).map_err(storage_error)?;
        std::fs::write(&self.path, json).map_err(storage_error)?;
        restrict_permissions(&self.path)?;
        tracing::debug!(path = %self.path.display(), "credentials saved");
        Ok(())
    }

    /// Forget saved credentials. Clearing an empty store is not an error.
    pub fn clear(&self) -> Result<(), BreakdeskError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(e)),
        }
    }
}

fn storage_error(e: impl std::error::Error + Send + Sync + 'static) -> BreakdeskError {
    BreakdeskError::Storage {
        source: Box::new(e),
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), BreakdeskError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(storage_error)
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), BreakdeskError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_means_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("credentials.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_in_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("breakdesk/credentials.json"));
        let credentials = Credentials::new("streamer", "hunter2");
        store.save(&credentials).unwrap();
        assert_eq!(store.load().unwrap(), Some(credentials));
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("credentials.json"));
        store.save(&Credentials::new("a", "b")).unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn empty_fields_mean_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, r#"{"username":"","password":""}"#).unwrap();
        assert!(CredentialStore::new(path).load().unwrap().is_none());
    }

    #[test]
    fn corrupt_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "not json").unwrap();
        let err = CredentialStore::new(path).load().unwrap_err();
        assert!(matches!(err, BreakdeskError::Storage { .. }));
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("credentials.json"));
        store.save(&Credentials::new("a", "b")).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
