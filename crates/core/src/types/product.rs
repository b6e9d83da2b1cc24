//! Catalog product records and the paginated listing shape.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;

/// A catalog product as returned by the storefront API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub image_url: String,
    pub stock: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether the product can currently be added to a cart.
    #[must_use]
    pub const fn is_purchasable(&self) -> bool {
        self.is_active && self.stock > 0
    }
}

/// One page of products from `GET /api/products`.
///
/// Pagination is server-driven; the client only recomputes the page
/// count from the server-reported total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl ProductPage {
    /// Number of pages, `ceil(total / limit)`. Zero when the limit is
    /// zero (a degenerate server response).
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(self.limit as u64)
    }
}

/// Fields for `POST /api/products` (admin).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub image_url: String,
    pub stock: u32,
    pub is_active: bool,
}

/// Partial fields for `PUT /api/products/:id` (admin). Only set
/// fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn page(total: u64, limit: u32) -> ProductPage {
        ProductPage {
            products: vec![],
            total,
            page: 1,
            limit,
        }
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(page(0, 12).total_pages(), 0);
        assert_eq!(page(12, 12).total_pages(), 1);
        assert_eq!(page(13, 12).total_pages(), 2);
        assert_eq!(page(24, 12).total_pages(), 2);
    }

    #[test]
    fn test_total_pages_zero_limit() {
        assert_eq!(page(10, 0).total_pages(), 0);
    }

    #[test]
    fn test_product_wire_shape() {
        let product: Product = serde_json::from_str(
            r#"{
                "_id": "p-1",
                "name": "Clementine Crate",
                "description": "A crate of clementines",
                "price": 10.0,
                "category": "fruit",
                "imageUrl": "https://img.example/p-1.jpg",
                "stock": 5,
                "isActive": true,
                "createdAt": "2026-01-01T00:00:00Z",
                "updatedAt": "2026-01-01T00:00:00Z"
            }"#,
        )
        .unwrap();
        assert!(product.is_purchasable());
        assert_eq!(product.price, Decimal::new(100, 1));

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["imageUrl"], "https://img.example/p-1.jpg");
    }

    #[test]
    fn test_update_skips_unset_fields() {
        let update = ProductUpdate {
            stock: Some(0),
            ..ProductUpdate::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["stock"], 0);
        assert!(json.get("price").is_none());
    }
}
