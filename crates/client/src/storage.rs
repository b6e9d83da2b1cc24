//! Durable local mirror of client state.
//!
//! A single JSON file (`state.json`) holds the credential token, the
//! serialized user record, and the anonymous session id. In-memory
//! state is the source of truth once loaded; the file exists so a
//! restart resumes with the same identity.
//!
//! The token and user are one logical pair: [`LocalStore::set_auth`]
//! and [`LocalStore::clear_auth`] write them in a single file write,
//! so no reader can ever observe a token without its matching user or
//! vice versa.
//!
//! The stored user is kept as raw JSON. A corrupt user value is a
//! recoverable condition the auth store handles at load time, and it
//! must not poison the rest of the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const STATE_FILE: &str = "state.json";

/// Errors that can occur reading or writing the state file.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// State could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersistedState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
}

/// File-backed key-value mirror for {token, user, session id}.
///
/// Cheaply cloneable; all clones share the same in-memory state and
/// file. Writes go through a temp file + rename so a crash mid-write
/// leaves the previous state intact.
#[derive(Clone)]
pub struct LocalStore {
    inner: Arc<LocalStoreInner>,
}

struct LocalStoreInner {
    path: PathBuf,
    state: Mutex<PersistedState>,
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore")
            .field("path", &self.inner.path)
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl LocalStore {
    /// Open (or create) the store in `dir`.
    ///
    /// A missing state file means a first-time visitor. An unreadable
    /// or unparsable file is treated as empty rather than fatal; the
    /// old content is logged and discarded on the next write.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(STATE_FILE);

        let state = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<PersistedState>(&bytes) {
                Ok(state) => state,
                Err(err) => {
                    tracing::warn!(error = %err, path = %path.display(), "corrupt state file, starting empty");
                    PersistedState::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => PersistedState::default(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            inner: Arc::new(LocalStoreInner {
                path,
                state: Mutex::new(state),
            }),
        })
    }

    /// The stored credential token, if any.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.lock().token.clone().map(SecretString::from)
    }

    /// The stored user record as raw JSON, if any. Parsing is the
    /// caller's concern so corruption can be handled deliberately.
    #[must_use]
    pub fn raw_user(&self) -> Option<serde_json::Value> {
        self.lock().user.clone()
    }

    /// The stored anonymous session id, if any.
    #[must_use]
    pub fn session_id(&self) -> Option<String> {
        self.lock().session_id.clone()
    }

    /// Persist the token and user together, in one write.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be written; the
    /// previous pair stays intact in that case.
    pub fn set_auth(&self, token: &str, user: serde_json::Value) -> Result<(), StorageError> {
        self.mutate(|state| {
            state.token = Some(token.to_owned());
            state.user = Some(user);
        })
    }

    /// Clear the token and user together, in one write.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be written.
    pub fn clear_auth(&self) -> Result<(), StorageError> {
        self.mutate(|state| {
            state.token = None;
            state.user = None;
        })
    }

    /// Replace the stored user record, leaving the token untouched.
    /// Only valid while a token is stored (profile updates).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be written.
    pub fn set_user(&self, user: serde_json::Value) -> Result<(), StorageError> {
        self.mutate(|state| {
            debug_assert!(state.token.is_some(), "set_user without a stored token");
            state.user = Some(user);
        })
    }

    /// Persist the session id. Callers go through
    /// [`crate::session::ensure_session_id`], which never overwrites
    /// an existing value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be written.
    pub fn set_session_id(&self, session_id: &str) -> Result<(), StorageError> {
        self.mutate(|state| {
            state.session_id = Some(session_id.to_owned());
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PersistedState> {
        // A poisoned mutex means a writer panicked between field
        // updates; the state itself is still a valid snapshot.
        self.inner
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn mutate(
        &self,
        apply: impl FnOnce(&mut PersistedState),
    ) -> Result<(), StorageError> {
        let mut state = self.lock();
        let mut next = state.clone();
        apply(&mut next);
        write_atomic(&self.inner.path, &next)?;
        *state = next;
        Ok(())
    }
}

/// Write the serialized state via a temp file + rename.
fn write_atomic(path: &Path, state: &PersistedState) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec_pretty(state)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_open_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        assert!(store.token().is_none());
        assert!(store.raw_user().is_none());
        assert!(store.session_id().is_none());
    }

    #[test]
    fn test_auth_pair_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = LocalStore::open(dir.path()).unwrap();
            store
                .set_auth("tok-1", json!({"_id": "u-1", "email": "jo@example.com"}))
                .unwrap();
        }
        let store = LocalStore::open(dir.path()).unwrap();
        assert_eq!(store.token().unwrap().expose_secret(), "tok-1");
        assert_eq!(store.raw_user().unwrap()["_id"], "u-1");
    }

    #[test]
    fn test_clear_auth_removes_both() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        store.set_auth("tok-1", json!({"_id": "u-1"})).unwrap();
        store.clear_auth().unwrap();
        assert!(store.token().is_none());
        assert!(store.raw_user().is_none());
    }

    #[test]
    fn test_pair_never_observed_mismatched() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();

        // Any sequence of pair operations ends with both or neither.
        store.set_auth("t1", json!({"_id": "u-1"})).unwrap();
        store.set_auth("t2", json!({"_id": "u-2"})).unwrap();
        store.clear_auth().unwrap();
        store.set_auth("t3", json!({"_id": "u-3"})).unwrap();

        let reopened = LocalStore::open(dir.path()).unwrap();
        assert_eq!(
            reopened.token().is_some(),
            reopened.raw_user().is_some(),
            "token and user must be present together or absent together"
        );
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STATE_FILE), b"{not json").unwrap();

        let store = LocalStore::open(dir.path()).unwrap();
        assert!(store.token().is_none());
        assert!(store.session_id().is_none());

        // The store remains writable afterwards.
        store.set_session_id("session_1_abc").unwrap();
        assert_eq!(store.session_id().unwrap(), "session_1_abc");
    }

    #[test]
    fn test_session_id_independent_of_auth() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        store.set_session_id("session_1_abc").unwrap();
        store.set_auth("tok", json!({})).unwrap();
        store.clear_auth().unwrap();
        assert_eq!(store.session_id().unwrap(), "session_1_abc");
    }

    #[test]
    fn test_debug_redacts_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        store.set_auth("super-secret", json!({})).unwrap();
        let debug = format!("{store:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
