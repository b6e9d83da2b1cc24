//! Order placement and history.
//!
//! Checkout is a single server call: the server prices the cart,
//! creates the order, and clears the cart as one operation. The
//! client never totals anything itself.

use std::sync::Arc;

use tracing::instrument;

use clementine_core::{NewOrder, Order, OrderId, OrderPage};

use crate::api::ApiClient;
use crate::error::ApiError;

/// Pagination for an order history request.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl OrderQuery {
    fn to_params(self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }
}

/// Client for order placement and history. Cheaply cloneable.
#[derive(Clone)]
pub struct Orders {
    inner: Arc<OrdersInner>,
}

struct OrdersInner {
    api: ApiClient,
}

impl Orders {
    /// Create the orders layer.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            inner: Arc::new(OrdersInner { api }),
        }
    }

    /// Place an order from the caller's current cart.
    ///
    /// The server clears the cart on success, so callers should
    /// refresh their cart state afterwards.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if the cart is empty or the
    /// address is incomplete, `ApiError::Unauthorized` if not logged
    /// in, or an error if the API request fails.
    #[instrument(skip(self, order))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        self.inner.api.post("api/orders", order).await
    }

    /// Get the caller's order history, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, query: OrderQuery) -> Result<OrderPage, ApiError> {
        self.inner
            .api
            .get_with_query("api/orders", &query.to_params())
            .await
    }

    /// Get a single order. The server scopes the lookup to the
    /// caller, so another user's order id comes back as not found.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the order does not exist or
    /// belongs to someone else, or an error if the API request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: &OrderId) -> Result<Order, ApiError> {
        self.inner
            .api
            .get(&format!("api/orders/{order_id}"))
            .await
    }

    /// Cancel an order.
    ///
    /// Checked locally first so a stale listing cannot fire a request
    /// the order's status no longer permits; the server enforces the
    /// same rule.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if the order is past the
    /// cancellable stage, or an error if the API request fails.
    #[instrument(skip(self, order), fields(order_id = %order.id, status = %order.status))]
    pub async fn cancel_order(&self, order: &Order) -> Result<Order, ApiError> {
        if !order.status.is_cancellable() {
            return Err(ApiError::Validation(format!(
                "order in status '{}' can no longer be cancelled",
                order.status
            )));
        }

        self.inner
            .api
            .put_no_body(&format!("api/orders/{}/cancel", order.id))
            .await
    }

    /// Admin order listing across all users.
    ///
    /// The backend has no endpoint for this yet, so this returns an
    /// empty page without a network call rather than surfacing an
    /// error in the admin view.
    #[must_use]
    pub fn list_all_admin(&self, query: OrderQuery) -> OrderPage {
        OrderPage::empty(query.page.unwrap_or(1), query.limit.unwrap_or(10))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_query_params() {
        let query = OrderQuery {
            page: Some(3),
            limit: None,
        };
        assert_eq!(query.to_params(), vec![("page", "3".to_owned())]);
    }

    #[test]
    fn test_admin_listing_is_empty() {
        let page = OrderPage::empty(2, 25);
        assert!(page.orders.is_empty());
        assert_eq!(page.page, 2);
        assert_eq!(page.limit, 25);
    }
}
