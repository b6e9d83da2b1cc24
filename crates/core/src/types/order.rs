//! Order records: immutable snapshots of a cart at checkout time.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::cart::CartItem;
use crate::types::id::{OrderId, UserId};
use crate::types::status::{OrderStatus, PaymentMethod, PaymentStatus};

/// A postal address used for shipping and billing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// An order: a cart snapshot plus checkout details.
///
/// Created exclusively by checkout. The status advances server-side
/// or via an explicit cancel while [`OrderStatus::is_cancellable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    pub user_id: UserId,
    pub order_number: String,
    pub items: Vec<CartItem>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/orders`. A missing billing address means
/// "same as shipping" server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub shipping_address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<Address>,
    pub payment_method: PaymentMethod,
}

/// One page of orders from `GET /api/orders`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub page: u32,
    pub limit: u32,
}

impl OrderPage {
    /// An empty page, used where a listing endpoint is not yet backed.
    #[must_use]
    pub const fn empty(page: u32, limit: u32) -> Self {
        Self {
            orders: vec![],
            page,
            limit,
        }
    }
}
