//! Checkout and order history commands.

use clap::{Args, Subcommand};

use clementine_client::App;
use clementine_client::orders::OrderQuery;
use clementine_core::{Address, NewOrder, Order, OrderId, PaymentMethod};

#[derive(Args)]
pub struct AddressArgs {
    /// Recipient first name (defaults to the signed-in user's)
    #[arg(long)]
    first_name: Option<String>,

    /// Recipient last name (defaults to the signed-in user's)
    #[arg(long)]
    last_name: Option<String>,

    /// Street address
    #[arg(long)]
    street: String,

    /// City
    #[arg(long)]
    city: String,

    /// State or province
    #[arg(long)]
    state: String,

    /// Postal code
    #[arg(long)]
    zip: String,

    /// Country
    #[arg(long)]
    country: String,
}

#[derive(Subcommand)]
pub enum OrderAction {
    /// Place an order from the current cart
    Place {
        #[command(flatten)]
        address: AddressArgs,

        /// Payment method (credit_card, debit_card, paypal)
        #[arg(long)]
        payment: PaymentMethod,
    },
    /// List your orders, newest first
    List {
        /// Page number (1-based)
        #[arg(short, long)]
        page: Option<u32>,

        /// Items per page
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Show one order in full
    Show {
        /// Order id
        order_id: String,
    },
    /// Cancel an order that has not shipped yet
    Cancel {
        /// Order id
        order_id: String,
    },
}

pub async fn run(app: &App, action: OrderAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        OrderAction::Place { address, payment } => {
            let user = app.auth().current_user();
            let shipping = Address {
                first_name: address
                    .first_name
                    .or_else(|| user.as_ref().map(|u| u.first_name.clone()))
                    .unwrap_or_default(),
                last_name: address
                    .last_name
                    .or_else(|| user.as_ref().map(|u| u.last_name.clone()))
                    .unwrap_or_default(),
                address: address.street,
                city: address.city,
                state: address.state,
                zip_code: address.zip,
                country: address.country,
            };
            let new_order = NewOrder {
                shipping_address: shipping,
                billing_address: None,
                payment_method: payment,
            };

            let order = app.orders().create_order(&new_order).await?;
            // The server cleared the cart as part of checkout.
            app.cart().refresh_cart().await?;

            tracing::info!("Order {} placed", order.order_number);
            display(&order);
        }
        OrderAction::List { page, limit } => {
            let listing = app.orders().list_orders(OrderQuery { page, limit }).await?;
            if listing.orders.is_empty() {
                tracing::info!("No orders yet");
            }
            for order in &listing.orders {
                tracing::info!(
                    "{}  {}  {:>8}  {} / {}",
                    order.order_number,
                    order.created_at.format("%Y-%m-%d"),
                    order.total_amount,
                    order.status,
                    order.payment_status
                );
            }
        }
        OrderAction::Show { order_id } => {
            let order = app.orders().get_order(&OrderId::from(order_id)).await?;
            display(&order);
        }
        OrderAction::Cancel { order_id } => {
            let order = app.orders().get_order(&OrderId::from(order_id)).await?;
            let cancelled = app.orders().cancel_order(&order).await?;
            tracing::info!("Order {} is now {}", cancelled.order_number, cancelled.status);
        }
    }
    Ok(())
}

fn display(order: &Order) {
    tracing::info!("Order {} ({})", order.order_number, order.id);
    tracing::info!("  Status:  {} (payment {})", order.status, order.payment_status);
    for item in &order.items {
        tracing::info!(
            "  {:>3} x {:<32} @ {:>8}",
            item.quantity,
            item.name,
            item.price
        );
    }
    tracing::info!("  Total:   {}", order.total_amount);
    tracing::info!(
        "  Ship to: {} {}, {}, {} {} {}",
        order.shipping_address.first_name,
        order.shipping_address.last_name,
        order.shipping_address.address,
        order.shipping_address.city,
        order.shipping_address.state,
        order.shipping_address.country
    );
}
