//! Cart and line item wire types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::{CartId, ProductId, UserId};

/// One product entry within a cart.
///
/// Name and unit price are snapshots taken when the item was added;
/// they do not track later catalog edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub image_url: String,
}

/// The current cart for a visitor or user.
///
/// Owned by a user id once authenticated, otherwise keyed by session
/// id. `total_amount` is the server's figure; clients display it as
/// received and never recompute it locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(rename = "_id")]
    pub id: CartId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub items: Vec<CartItem>,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Cart {
    /// Sum of line item quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Line item for a product, if present.
    #[must_use]
    pub fn item(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.product_id == product_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_cart() -> Cart {
        serde_json::from_str(
            r#"{
                "_id": "c-1",
                "sessionId": "session_1_abc",
                "items": [
                    {"productId": "p-1", "name": "Crate", "price": 10.0, "quantity": 2, "imageUrl": ""},
                    {"productId": "p-2", "name": "Basket", "price": 4.5, "quantity": 1, "imageUrl": ""}
                ],
                "totalAmount": 24.5,
                "createdAt": "2026-01-01T00:00:00Z",
                "updatedAt": "2026-01-01T00:00:00Z",
                "expiresAt": "2026-01-02T00:00:00Z"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_item_count_sums_quantities() {
        let cart = sample_cart();
        assert_eq!(cart.item_count(), 3);
        assert!(!cart.is_empty());
    }

    #[test]
    fn test_item_lookup() {
        let cart = sample_cart();
        assert_eq!(cart.item(&ProductId::new("p-2")).unwrap().quantity, 1);
        assert!(cart.item(&ProductId::new("p-9")).is_none());
    }

    #[test]
    fn test_anonymous_cart_has_no_user() {
        let cart = sample_cart();
        assert!(cart.user_id.is_none());
        assert_eq!(cart.session_id.as_deref(), Some("session_1_abc"));
    }
}
