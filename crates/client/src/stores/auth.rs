//! Auth state store.
//!
//! Holds the current user identity and credential token. The pair is
//! persisted together through [`LocalStore::set_auth`] /
//! [`LocalStore::clear_auth`], so no failure sequence can leave a
//! token without its matching user.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use clementine_core::{
    AuthPayload, Email, LoginRequest, ProfileUpdate, RegisterRequest, User, UserRole,
};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::notify::Notifier;
use crate::storage::LocalStore;

/// Minimum password length accepted at registration.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication state as seen by the view layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// Persisted identity not yet examined ([`AuthStore::load`] has
    /// not run); the view layer should hold navigation decisions.
    Loading,
    /// No user is signed in.
    Unauthenticated,
    /// A user is signed in.
    Authenticated(User),
}

/// The auth state store.
///
/// Cheaply cloneable; all clones share the same in-memory identity.
#[derive(Clone)]
pub struct AuthStore {
    inner: Arc<AuthStoreInner>,
}

struct AuthStoreInner {
    api: ApiClient,
    store: LocalStore,
    notifier: Arc<dyn Notifier>,
    user: RwLock<Option<User>>,
    loaded: AtomicBool,
}

impl AuthStore {
    /// Create the store. Call [`AuthStore::load`] afterwards to pick
    /// up a persisted identity.
    #[must_use]
    pub fn new(api: ApiClient, store: LocalStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            inner: Arc::new(AuthStoreInner {
                api,
                store,
                notifier,
                user: RwLock::new(None),
                loaded: AtomicBool::new(false),
            }),
        }
    }

    /// Restore the persisted identity, if any.
    ///
    /// A stored pair whose user record does not parse is corrupt
    /// local cache: both halves are cleared and the store comes up
    /// unauthenticated. This never fails the caller.
    pub fn load(&self) {
        let token = self.inner.store.token();
        let raw_user = self.inner.store.raw_user();

        match (token, raw_user) {
            (Some(_), Some(raw)) => match serde_json::from_value::<User>(raw) {
                Ok(user) => {
                    tracing::debug!(user_id = %user.id, "restored persisted identity");
                    *self.write() = Some(user);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "stored user is corrupt, clearing auth pair");
                    self.clear_persisted();
                }
            },
            (None, None) => {}
            // Half a pair should be impossible given single-write
            // persistence; treat it as corruption all the same.
            _ => {
                tracing::warn!("stored token/user pair is mismatched, clearing");
                self.clear_persisted();
            }
        }

        self.inner.loaded.store(true, Ordering::SeqCst);
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// On success the token+user pair is persisted atomically and the
    /// store becomes authenticated. On failure the state is unchanged
    /// and the error is returned so callers can suppress navigation.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for a malformed email (before
    /// any network call), otherwise whatever the endpoint failed with.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        role: Option<UserRole>,
    ) -> Result<User, ApiError> {
        let result = self.login_inner(email, password, role).await;
        match &result {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "login succeeded");
                self.inner.notifier.push_success("Login successful!");
            }
            Err(err) => self.notify_failure(err, "Login failed"),
        }
        result
    }

    async fn login_inner(
        &self,
        email: &str,
        password: &str,
        role: Option<UserRole>,
    ) -> Result<User, ApiError> {
        let email = Email::parse(email).map_err(|e| ApiError::Validation(e.to_string()))?;
        let request = LoginRequest {
            email,
            password: password.to_owned(),
            role,
        };

        let payload: AuthPayload = self.inner.api.post("api/auth/login", &request).await?;
        self.persist_pair(payload)
    }

    /// Create an account and sign in.
    ///
    /// Same contract as [`AuthStore::login`], with form-level checks
    /// (email shape, password length) applied before any network call.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for malformed input, otherwise
    /// whatever the endpoint failed with.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
        role: Option<UserRole>,
    ) -> Result<User, ApiError> {
        let result = self
            .register_inner(email, password, first_name, last_name, role)
            .await;
        match &result {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "registration succeeded");
                self.inner.notifier.push_success("Registration successful!");
            }
            Err(err) => self.notify_failure(err, "Registration failed"),
        }
        result
    }

    async fn register_inner(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
        role: Option<UserRole>,
    ) -> Result<User, ApiError> {
        let email = Email::parse(email).map_err(|e| ApiError::Validation(e.to_string()))?;
        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(ApiError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let request = RegisterRequest {
            email,
            password: password.to_owned(),
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            role,
        };

        let payload: AuthPayload = self.inner.api.post("api/auth/register", &request).await?;
        self.persist_pair(payload)
    }

    /// Sign out. Purely local: clears the persisted pair and the
    /// in-memory identity. Never calls the server and never fails.
    pub fn logout(&self) {
        self.clear_persisted();
        *self.write() = None;
        self.inner.loaded.store(true, Ordering::SeqCst);
        self.inner.notifier.push_success("Logged out successfully");
        tracing::info!("logged out");
    }

    /// Update profile fields. The server's full returned record
    /// replaces both the in-memory and the persisted user; partial
    /// data is never merged locally.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` when no field is set, otherwise
    /// whatever the endpoint failed with. On failure the state is
    /// unchanged.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<User, ApiError> {
        let result = self.update_profile_inner(update).await;
        match &result {
            Ok(_) => {
                self.inner
                    .notifier
                    .push_success("Profile updated successfully!");
            }
            Err(err) => self.notify_failure(err, "Update failed"),
        }
        result
    }

    async fn update_profile_inner(&self, update: ProfileUpdate) -> Result<User, ApiError> {
        if update.is_empty() {
            return Err(ApiError::Validation("no profile fields to update".to_owned()));
        }

        let user: User = self.inner.api.put("api/auth/profile", &update).await?;
        self.inner
            .store
            .set_user(serde_json::to_value(&user)?)?;
        *self.write() = Some(user.clone());
        Ok(user)
    }

    /// Fetch the profile from the server without mutating local state.
    ///
    /// # Errors
    ///
    /// Returns whatever the endpoint failed with.
    pub async fn fetch_profile(&self) -> Result<User, ApiError> {
        self.inner.api.get("api/auth/profile").await
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.read().clone()
    }

    /// Current authentication state. `Loading` until the persisted
    /// identity has been examined or an operation has settled it.
    #[must_use]
    pub fn state(&self) -> AuthState {
        if !self.inner.loaded.load(Ordering::SeqCst) {
            return AuthState::Loading;
        }
        self.read()
            .clone()
            .map_or(AuthState::Unauthenticated, AuthState::Authenticated)
    }

    /// Whether a user is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    /// Whether the signed-in user may use the admin console.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.read().as_ref().is_some_and(User::is_admin)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Persist the token+user pair in one write, then adopt the user.
    fn persist_pair(&self, payload: AuthPayload) -> Result<User, ApiError> {
        self.inner
            .store
            .set_auth(&payload.token, serde_json::to_value(&payload.user)?)?;
        *self.write() = Some(payload.user.clone());
        self.inner.loaded.store(true, Ordering::SeqCst);
        Ok(payload.user)
    }

    /// Clear the persisted pair, logging rather than failing: a
    /// defunct identity on disk must never block signing out.
    fn clear_persisted(&self) {
        if let Err(err) = self.inner.store.clear_auth() {
            tracing::warn!(error = %err, "failed to clear persisted auth pair");
        }
    }

    fn notify_failure(&self, err: &ApiError, fallback: &str) {
        let text = err.server_message().unwrap_or(fallback);
        self.inner.notifier.push_error(text);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<User>> {
        self.inner
            .user
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<User>> {
        self.inner
            .user
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use serde_json::json;

    use crate::config::ClientConfig;
    use crate::notify::{Notification, NotificationCenter};

    use super::*;

    struct Recorder(Mutex<Vec<Notification>>);

    impl Notifier for Recorder {
        fn notify(&self, notification: Notification) {
            self.0
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push(notification);
        }
    }

    fn store_in(dir: &std::path::Path) -> (AuthStore, LocalStore) {
        let config = ClientConfig::new("http://localhost:1", dir).unwrap();
        let local = LocalStore::open(dir).unwrap();
        let api = ApiClient::new(&config, local.clone()).unwrap();
        let notifier = Arc::new(NotificationCenter::new(Duration::from_secs(5)));
        (AuthStore::new(api, local.clone(), notifier), local)
    }

    fn valid_user_json() -> serde_json::Value {
        json!({
            "_id": "u-1",
            "email": "jo@example.com",
            "firstName": "Jo",
            "lastName": "March",
            "role": "customer",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z"
        })
    }

    #[test]
    fn test_load_restores_valid_pair() {
        let dir = tempfile::tempdir().unwrap();
        let (auth, local) = store_in(dir.path());
        local.set_auth("tok-1", valid_user_json()).unwrap();

        auth.load();
        assert!(auth.is_authenticated());
        assert_eq!(auth.current_user().unwrap().first_name, "Jo");
        assert!(matches!(auth.state(), AuthState::Authenticated(_)));
    }

    #[test]
    fn test_load_clears_corrupt_user() {
        let dir = tempfile::tempdir().unwrap();
        let (auth, local) = store_in(dir.path());
        local.set_auth("tok-1", json!("not a user record")).unwrap();

        auth.load();
        assert!(!auth.is_authenticated());
        // Both halves of the pair are gone.
        assert!(local.token().is_none());
        assert!(local.raw_user().is_none());
    }

    #[test]
    fn test_load_without_pair_stays_unauthenticated() {
        let dir = tempfile::tempdir().unwrap();
        let (auth, _) = store_in(dir.path());
        assert_eq!(auth.state(), AuthState::Loading);
        auth.load();
        assert_eq!(auth.state(), AuthState::Unauthenticated);
    }

    #[test]
    fn test_logout_clears_everything() {
        let dir = tempfile::tempdir().unwrap();
        let (auth, local) = store_in(dir.path());
        local.set_auth("tok-1", valid_user_json()).unwrap();
        auth.load();
        assert!(auth.is_authenticated());

        auth.logout();
        assert!(!auth.is_authenticated());
        assert!(local.token().is_none());
        assert!(local.raw_user().is_none());
    }

    #[tokio::test]
    async fn test_register_rejects_short_password_before_network() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::new("http://localhost:1", dir.path()).unwrap();
        let local = LocalStore::open(dir.path()).unwrap();
        let api = ApiClient::new(&config, local.clone()).unwrap();
        let recorder = Arc::new(Recorder(Mutex::new(vec![])));
        let auth = AuthStore::new(api, local.clone(), recorder.clone());

        // The base URL points nowhere; validation must fail first.
        let err = auth
            .register("jo@example.com", "short", "Jo", "March", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        // Failure notified, pair untouched.
        assert_eq!(
            recorder
                .0
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .len(),
            1
        );
        assert!(local.token().is_none());
        assert!(local.raw_user().is_none());
    }

    #[tokio::test]
    async fn test_login_rejects_malformed_email_before_network() {
        let dir = tempfile::tempdir().unwrap();
        let (auth, local) = store_in(dir.path());

        let err = auth.login("not-an-email", "hunter22", None).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(local.token().is_none());
    }
}
