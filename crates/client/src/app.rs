//! Application assembly.
//!
//! [`App`] wires the storage, session, API, notification, store, and
//! query layers together through constructor injection. Nothing here
//! is a global: two `App`s with different data directories are two
//! independent storefront sessions, which is also how the integration
//! tests run several identities against one backend.

use std::sync::Arc;

use tracing::info;

use crate::api::ApiClient;
use crate::catalog::Catalog;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::notify::{NotificationCenter, Notifier};
use crate::orders::Orders;
use crate::session::ensure_session_id;
use crate::storage::LocalStore;
use crate::stores::{AuthStore, CartStore};

/// A fully wired storefront client.
///
/// Cheaply cloneable; all clones share the same state.
#[derive(Clone)]
pub struct App {
    inner: Arc<AppInner>,
}

struct AppInner {
    config: ClientConfig,
    store: LocalStore,
    session_id: String,
    auth: AuthStore,
    cart: CartStore,
    catalog: Catalog,
    orders: Orders,
    notifications: Option<NotificationCenter>,
}

impl App {
    /// Assemble an app with the default in-memory notification center.
    ///
    /// Opens (or creates) the data directory, ensures the device has a
    /// session id, and restores any persisted identity.
    ///
    /// # Errors
    ///
    /// Returns an error if local storage cannot be opened or the HTTP
    /// client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let notifications = NotificationCenter::new(config.notification_ttl);
        Self::assemble(config, Arc::new(notifications.clone()), Some(notifications))
    }

    /// Assemble an app delivering notifications to a caller-supplied
    /// sink. Used by embedders with their own toast machinery and by
    /// tests that record outcomes.
    ///
    /// # Errors
    ///
    /// Returns an error if local storage cannot be opened or the HTTP
    /// client cannot be constructed.
    pub fn with_notifier(
        config: ClientConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ApiError> {
        Self::assemble(config, notifier, None)
    }

    fn assemble(
        config: ClientConfig,
        notifier: Arc<dyn Notifier>,
        notifications: Option<NotificationCenter>,
    ) -> Result<Self, ApiError> {
        let store = LocalStore::open(&config.data_dir)?;
        let session_id = ensure_session_id(&store)?;
        let api = ApiClient::new(&config, store.clone())?;

        let auth = AuthStore::new(api.clone(), store.clone(), Arc::clone(&notifier));
        auth.load();
        let cart = CartStore::new(api.clone(), store.clone(), notifier);
        let catalog = Catalog::new(api.clone());
        let orders = Orders::new(api);

        info!(
            base_url = %config.api_base_url,
            session_id = %session_id,
            authenticated = auth.is_authenticated(),
            "storefront client ready"
        );

        Ok(Self {
            inner: Arc::new(AppInner {
                config,
                store,
                session_id,
                auth,
                cart,
                catalog,
                orders,
                notifications,
            }),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// This device's anonymous session id.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    #[must_use]
    pub fn auth(&self) -> &AuthStore {
        &self.inner.auth
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    #[must_use]
    pub fn orders(&self) -> &Orders {
        &self.inner.orders
    }

    /// The default notification center, when one was assembled.
    /// `None` for apps built with [`App::with_notifier`].
    #[must_use]
    pub fn notifications(&self) -> Option<&NotificationCenter> {
        self.inner.notifications.as_ref()
    }

    /// Direct access to the persistence layer, mainly for tests
    /// asserting what survives a restart.
    #[must_use]
    pub fn local_store(&self) -> &LocalStore {
        &self.inner.store
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("base_url", &self.inner.config.api_base_url.as_str())
            .field("session_id", &self.inner.session_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_survives_reassembly() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::new("http://localhost:1", dir.path()).unwrap();

        let first = App::new(config.clone()).unwrap();
        let session_id = first.session_id().to_owned();
        drop(first);

        let second = App::new(config).unwrap();
        assert_eq!(second.session_id(), session_id);
    }

    #[test]
    fn test_independent_data_dirs_get_distinct_sessions() {
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        let app_a =
            App::new(ClientConfig::new("http://localhost:1", dir_a.path()).unwrap()).unwrap();
        let app_b =
            App::new(ClientConfig::new("http://localhost:1", dir_b.path()).unwrap()).unwrap();
        assert_ne!(app_a.session_id(), app_b.session_id());
    }

    #[test]
    fn test_fresh_app_is_unauthenticated() {
        let dir = tempfile::tempdir().unwrap();
        let app =
            App::new(ClientConfig::new("http://localhost:1", dir.path()).unwrap()).unwrap();
        assert!(!app.auth().is_authenticated());
        assert_eq!(app.cart().item_count(), 0);
        assert!(app.notifications().is_some());
    }
}
