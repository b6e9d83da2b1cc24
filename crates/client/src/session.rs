//! Anonymous session identity.
//!
//! Guests get a device-scoped session identifier that associates a
//! cart with them before they authenticate. It is generated exactly
//! once and survives until the local store is cleared.

use rand::Rng;

use crate::storage::{LocalStore, StorageError};

/// Length of the random suffix in a generated session id.
const RANDOM_SUFFIX_LEN: usize = 9;

/// Return the device's session id, generating and persisting one if
/// absent. Idempotent: an existing value is never replaced.
///
/// # Errors
///
/// Returns `StorageError` if a freshly generated id cannot be
/// persisted.
pub fn ensure_session_id(store: &LocalStore) -> Result<String, StorageError> {
    if let Some(existing) = store.session_id() {
        return Ok(existing);
    }

    let id = generate_session_id();
    store.set_session_id(&id)?;
    tracing::debug!(session_id = %id, "generated anonymous session id");
    Ok(id)
}

/// Build a `session_<millis>_<random>` identifier. The timestamp
/// component plus nine random alphanumerics make collisions across
/// devices overwhelmingly improbable.
fn generate_session_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let mut rng = rand::rng();
    let suffix: String = (0..RANDOM_SUFFIX_LEN)
        .map(|_| rng.sample(rand::distr::Alphanumeric))
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("session_{millis}_{suffix}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();

        let first = ensure_session_id(&store).unwrap();
        let second = ensure_session_id(&store).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_cleared_storage_yields_new_id() {
        let dir = tempfile::tempdir().unwrap();
        let first = {
            let store = LocalStore::open(dir.path()).unwrap();
            ensure_session_id(&store).unwrap()
        };

        // Simulate the device's persistent store being cleared.
        let fresh_dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(fresh_dir.path()).unwrap();
        let second = ensure_session_id(&store).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_id_format() {
        let id = generate_session_id();
        let mut parts = id.splitn(3, '_');
        assert_eq!(parts.next(), Some("session"));
        let millis = parts.next().unwrap();
        assert!(millis.parse::<i64>().is_ok());
        let suffix = parts.next().unwrap();
        assert_eq!(suffix.len(), RANDOM_SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let first = {
            let store = LocalStore::open(dir.path()).unwrap();
            ensure_session_id(&store).unwrap()
        };
        let store = LocalStore::open(dir.path()).unwrap();
        assert_eq!(ensure_session_id(&store).unwrap(), first);
    }
}
