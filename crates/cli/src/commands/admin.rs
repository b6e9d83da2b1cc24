//! Admin catalog management commands.
//!
//! All of these require an admin login (`clem auth login --admin`);
//! the server rejects them otherwise.

use clap::Subcommand;
use rust_decimal::Decimal;

use clementine_client::App;
use clementine_client::catalog::DeleteConfirmation;
use clementine_client::orders::OrderQuery;
use clementine_core::{NewProduct, ProductId, ProductUpdate};

#[derive(Subcommand)]
pub enum AdminAction {
    /// Create a product
    ProductCreate {
        /// Product name
        #[arg(short, long)]
        name: String,

        /// Product description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Unit price
        #[arg(short, long)]
        price: Decimal,

        /// Category
        #[arg(short, long)]
        category: String,

        /// Image URL
        #[arg(short, long, default_value = "")]
        image_url: String,

        /// Units in stock
        #[arg(short, long, default_value = "0")]
        stock: u32,
    },
    /// Update a product's fields
    ProductUpdate {
        /// Product id
        product_id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New unit price
        #[arg(long)]
        price: Option<Decimal>,

        /// New category
        #[arg(long)]
        category: Option<String>,

        /// New image URL
        #[arg(long)]
        image_url: Option<String>,

        /// New stock count
        #[arg(long)]
        stock: Option<u32>,

        /// Activate or deactivate the listing
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete a product
    ProductDelete {
        /// Product id
        product_id: String,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// List orders across all users
    Orders {
        /// Page number (1-based)
        #[arg(short, long)]
        page: Option<u32>,

        /// Items per page
        #[arg(short, long)]
        limit: Option<u32>,
    },
}

pub async fn run(app: &App, action: AdminAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AdminAction::ProductCreate {
            name,
            description,
            price,
            category,
            image_url,
            stock,
        } => {
            let new_product = NewProduct {
                name,
                description,
                price,
                category,
                image_url,
                stock,
                is_active: true,
            };
            let product = app.catalog().create_product(&new_product).await?;
            tracing::info!("Created product {} ({})", product.name, product.id);
        }
        AdminAction::ProductUpdate {
            product_id,
            name,
            description,
            price,
            category,
            image_url,
            stock,
            active,
        } => {
            let update = ProductUpdate {
                name,
                description,
                price,
                category,
                image_url,
                stock,
                is_active: active,
            };
            let product = app
                .catalog()
                .update_product(&ProductId::from(product_id), &update)
                .await?;
            tracing::info!("Updated product {} ({})", product.name, product.id);
        }
        AdminAction::ProductDelete { product_id, yes } => {
            if !yes {
                return Err("refusing to delete without --yes".into());
            }
            app.catalog()
                .delete_product(&ProductId::from(product_id), DeleteConfirmation::Confirmed)
                .await?;
            tracing::info!("Product deleted");
        }
        AdminAction::Orders { page, limit } => {
            let listing = app.orders().list_all_admin(OrderQuery { page, limit });
            if listing.orders.is_empty() {
                tracing::info!("No orders to show");
            }
            for order in &listing.orders {
                tracing::info!(
                    "{}  {}  {:>8}  {}",
                    order.order_number,
                    order.user_id,
                    order.total_amount,
                    order.status
                );
            }
        }
    }
    Ok(())
}
