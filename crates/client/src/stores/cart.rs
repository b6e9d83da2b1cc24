//! Cart state store.
//!
//! Holds the authoritative-as-known cart. Every mutation round-trips
//! through the server and replaces the whole in-memory cart with the
//! server's response; the total amount is displayed exactly as
//! returned, never recomputed locally.
//!
//! Responses are applied under a monotonic request sequence: if a
//! later request's response has already been applied, an earlier
//! request resolving afterwards is dropped instead of clobbering the
//! newer state (two rapid clicks still issue two requests, but the
//! stale answer can no longer win).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;

use clementine_core::{Cart, CartId, ProductId};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::notify::Notifier;
use crate::storage::LocalStore;

/// How far in the future an empty default cart expires.
const EMPTY_CART_TTL_HOURS: i64 = 24;

#[derive(Debug, Default)]
struct CartState {
    cart: Option<Cart>,
    loading: bool,
    applied_seq: u64,
}

/// Apply a response if no later one has been applied yet.
fn apply_if_newest(state: &mut CartState, seq: u64, cart: Option<Cart>) -> bool {
    if seq < state.applied_seq {
        return false;
    }
    state.applied_seq = seq;
    state.cart = cart;
    true
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddItemRequest<'a> {
    product_id: &'a ProductId,
    quantity: u32,
}

#[derive(Serialize)]
struct UpdateItemRequest {
    quantity: u32,
}

/// The cart state store.
///
/// Cheaply cloneable; all clones share the same in-memory cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    api: ApiClient,
    store: LocalStore,
    notifier: Arc<dyn Notifier>,
    state: RwLock<CartState>,
    next_seq: AtomicU64,
}

impl CartStore {
    /// Create the store with no cart loaded.
    #[must_use]
    pub fn new(api: ApiClient, store: LocalStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            inner: Arc::new(CartStoreInner {
                api,
                store,
                notifier,
                state: RwLock::new(CartState::default()),
                next_seq: AtomicU64::new(0),
            }),
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Fetch the current cart from the server.
    ///
    /// Absence of a cart (404, or 401 for an anonymous visitor) is
    /// normal, not an error: the store silently adopts an empty
    /// default cart carrying the current session id. Any other
    /// failure clears the cart and surfaces one error notification.
    ///
    /// # Errors
    ///
    /// Returns the failure for non-absence errors; callers on an
    /// initial page load may ignore it since the outcome is already
    /// reflected in state and notifications.
    pub async fn refresh_cart(&self) -> Result<(), ApiError> {
        let seq = self.begin();
        self.set_loading(true);

        let result = self.inner.api.get::<Cart>("api/cart").await;
        let outcome = match result {
            Ok(cart) => {
                self.apply(seq, Some(cart));
                Ok(())
            }
            Err(err) if err.is_cart_absence() => {
                tracing::debug!("no server cart yet, using empty default");
                self.apply(seq, Some(self.empty_cart()));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "cart fetch failed");
                self.apply(seq, None);
                self.notify_failure(&err, "Failed to load cart");
                Err(err)
            }
        };

        self.set_loading(false);
        outcome
    }

    /// Add a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for a zero quantity (before any
    /// network call), otherwise whatever the endpoint failed with; in
    /// either case the cart state is unchanged.
    pub async fn add_to_cart(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Cart, ApiError> {
        if quantity == 0 {
            let err = ApiError::Validation("quantity must be at least 1".to_owned());
            self.notify_failure(&err, "Failed to add item to cart");
            return Err(err);
        }

        let seq = self.begin();
        let request = AddItemRequest {
            product_id,
            quantity,
        };

        match self.inner.api.post::<Cart, _>("api/cart/items", &request).await {
            Ok(cart) => {
                self.apply(seq, Some(cart.clone()));
                self.inner.notifier.push_success("Item added to cart!");
                Ok(cart)
            }
            Err(err) => {
                tracing::warn!(error = %err, product_id = %product_id, "add to cart failed");
                self.notify_failure(&err, "Failed to add item to cart");
                Err(err)
            }
        }
    }

    /// Set a line item's quantity. Zero means removal; the resulting
    /// state is identical to [`CartStore::remove_item`], only the
    /// notification text differs.
    ///
    /// # Errors
    ///
    /// Returns whatever the endpoint failed with; the cart state is
    /// unchanged on failure.
    pub async fn update_item(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Cart, ApiError> {
        let seq = self.begin();
        let path = format!("api/cart/items/{product_id}");
        let request = UpdateItemRequest { quantity };

        match self.inner.api.put::<Cart, _>(&path, &request).await {
            Ok(cart) => {
                self.apply(seq, Some(cart.clone()));
                if quantity == 0 {
                    self.inner.notifier.push_success("Item removed from cart");
                } else {
                    self.inner.notifier.push_success("Cart updated");
                }
                Ok(cart)
            }
            Err(err) => {
                tracing::warn!(error = %err, product_id = %product_id, "cart update failed");
                self.notify_failure(&err, "Failed to update cart");
                Err(err)
            }
        }
    }

    /// Remove a line item.
    ///
    /// # Errors
    ///
    /// Returns whatever the endpoint failed with; the cart state is
    /// unchanged on failure.
    pub async fn remove_item(&self, product_id: &ProductId) -> Result<Cart, ApiError> {
        let seq = self.begin();
        let path = format!("api/cart/items/{product_id}");

        match self.inner.api.delete::<Cart>(&path).await {
            Ok(cart) => {
                self.apply(seq, Some(cart.clone()));
                self.inner.notifier.push_success("Item removed from cart");
                Ok(cart)
            }
            Err(err) => {
                tracing::warn!(error = %err, product_id = %product_id, "cart removal failed");
                self.notify_failure(&err, "Failed to remove item");
                Err(err)
            }
        }
    }

    /// Empty the cart in a single request.
    ///
    /// # Errors
    ///
    /// Returns whatever the endpoint failed with; the cart state is
    /// unchanged on failure.
    pub async fn clear(&self) -> Result<Cart, ApiError> {
        let seq = self.begin();

        match self.inner.api.delete::<Cart>("api/cart").await {
            Ok(cart) => {
                self.apply(seq, Some(cart.clone()));
                self.inner.notifier.push_success("Cart cleared");
                Ok(cart)
            }
            Err(err) => {
                tracing::warn!(error = %err, "cart clear failed");
                self.notify_failure(&err, "Failed to clear cart");
                Err(err)
            }
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The current cart, if one is loaded.
    #[must_use]
    pub fn cart(&self) -> Option<Cart> {
        self.read().cart.clone()
    }

    /// Sum of line item quantities; zero when no cart is loaded.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.read().cart.as_ref().map_or(0, Cart::item_count)
    }

    /// Whether a gating fetch is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read().loading
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Reserve the next request sequence number.
    fn begin(&self) -> u64 {
        self.inner.next_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn apply(&self, seq: u64, cart: Option<Cart>) {
        let mut state = self.write();
        if !apply_if_newest(&mut state, seq, cart) {
            tracing::debug!(seq, newest = state.applied_seq, "dropped stale cart response");
        }
    }

    fn set_loading(&self, loading: bool) {
        self.write().loading = loading;
    }

    /// The empty default cart adopted when the server has none:
    /// current session id, no items, zero total, forward expiry.
    fn empty_cart(&self) -> Cart {
        let now = Utc::now();
        Cart {
            id: CartId::new(""),
            user_id: None,
            session_id: self.inner.store.session_id(),
            items: vec![],
            total_amount: Decimal::ZERO,
            created_at: now,
            updated_at: now,
            expires_at: now + chrono::Duration::hours(EMPTY_CART_TTL_HOURS),
        }
    }

    fn notify_failure(&self, err: &ApiError, fallback: &str) {
        let text = err.server_message().unwrap_or(fallback);
        self.inner.notifier.push_error(text);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, CartState> {
        self.inner
            .state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, CartState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
