//! Durable holder of the session credential.
//!
//! The token is the only durable state this layer owns. It is persisted as a
//! small JSON document at a fixed path, read once at startup, and cleared on
//! sign-out or when the service rejects the session. No other component
//! mutates it directly.

use ledgerkit_core::ClientError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Serialize, Deserialize)]
struct PersistedCredential {
    token: String,
}

/// Process-wide store for the bearer token.
///
/// State machine: absent -> present on [`set`](Self::set), present -> absent
/// on [`clear`](Self::clear) or [`take`](Self::take). Initial state is read
/// from disk, so a prior session survives a restart.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    token: RwLock<Option<String>>,
}

impl CredentialStore {
    /// Open the store, loading a previously persisted credential if one
    /// exists at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let path = path.into();
        let token = load(&path)?.map(|persisted| persisted.token);
        Ok(Self {
            path,
            token: RwLock::new(token),
        })
    }

    /// Persist a new token durably. Idempotent; a repeated `set` with the
    /// same token is a no-op for callers.
    pub fn set(&self, token: &str) -> Result<(), ClientError> {
        save(
            &self.path,
            &PersistedCredential {
                token: token.to_string(),
            },
        )?;
        *self.write_guard() = Some(token.to_string());
        Ok(())
    }

    /// The current token, or `None` when absent. Never blocks on IO.
    pub fn get(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove the token durably. Safe to call when already absent.
    pub fn clear(&self) -> Result<(), ClientError> {
        remove(&self.path)?;
        *self.write_guard() = None;
        Ok(())
    }

    /// Atomically clear the token and return the previous value.
    ///
    /// Used by the gateway on session rejection: the returned `Some` tells
    /// the caller it was the one that actually performed the clear, so the
    /// session-terminated signal fires at most once per rejection even when
    /// several in-flight requests reject concurrently. File removal is
    /// best-effort here; the in-memory state is authoritative for signalling.
    pub fn take(&self) -> Option<String> {
        let previous = self.write_guard().take();
        if previous.is_some() {
            if let Err(err) = remove(&self.path) {
                tracing::warn!(error = %err, "failed to remove persisted credential");
            }
        }
        previous
    }

    fn write_guard(&self) -> std::sync::RwLockWriteGuard<'_, Option<String>> {
        self.token.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn load(path: &Path) -> Result<Option<PersistedCredential>, ClientError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path).map_err(storage_error)?;
    let persisted = serde_json::from_str(&contents).map_err(storage_error)?;
    Ok(Some(persisted))
}

fn save(path: &Path, credential: &PersistedCredential) -> Result<(), ClientError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(storage_error)?;
    }
    let contents = serde_json::to_string_pretty(credential).map_err(storage_error)?;
    std::fs::write(path, contents).map_err(storage_error)?;
    Ok(())
}

fn remove(path: &Path) -> Result<(), ClientError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(storage_error(err)),
    }
}

fn storage_error(err: impl std::fmt::Display) -> ClientError {
    ClientError::Storage {
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_absent_when_nothing_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open(dir.path().join("credential.json")).unwrap();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn set_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credential.json");

        let store = CredentialStore::open(&path).unwrap();
        store.set("tok-123").unwrap();

        let reopened = CredentialStore::open(&path).unwrap();
        assert_eq!(reopened.get(), Some("tok-123".to_string()));
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open(dir.path().join("credential.json")).unwrap();

        store.set("tok-123").unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn take_returns_the_token_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open(dir.path().join("credential.json")).unwrap();

        store.set("tok-123").unwrap();
        assert_eq!(store.take(), Some("tok-123".to_string()));
        assert_eq!(store.take(), None);
        assert_eq!(store.get(), None);
    }

    #[test]
    fn cleared_credential_does_not_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credential.json");

        let store = CredentialStore::open(&path).unwrap();
        store.set("tok-123").unwrap();
        store.clear().unwrap();

        let reopened = CredentialStore::open(&path).unwrap();
        assert_eq!(reopened.get(), None);
    }
}
