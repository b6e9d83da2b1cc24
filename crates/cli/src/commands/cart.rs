//! Shopping cart commands.

use clap::Subcommand;

use clementine_client::App;
use clementine_core::{Cart, ProductId};

#[derive(Subcommand)]
pub enum CartAction {
    /// Fetch and display the current cart
    Show,
    /// Add a product to the cart
    Add {
        /// Product id
        product_id: String,

        /// Quantity to add
        #[arg(short, long, default_value = "1")]
        quantity: u32,
    },
    /// Set a line item's quantity (0 removes it)
    Update {
        /// Product id
        product_id: String,

        /// New quantity
        #[arg(short, long)]
        quantity: u32,
    },
    /// Remove a line item
    Remove {
        /// Product id
        product_id: String,
    },
    /// Empty the cart
    Clear,
}

pub async fn run(app: &App, action: CartAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        CartAction::Show => {
            app.cart().refresh_cart().await?;
            if let Some(cart) = app.cart().cart() {
                display(&cart);
            }
        }
        CartAction::Add {
            product_id,
            quantity,
        } => {
            let cart = app
                .cart()
                .add_to_cart(&ProductId::from(product_id), quantity)
                .await?;
            display(&cart);
        }
        CartAction::Update {
            product_id,
            quantity,
        } => {
            let cart = app
                .cart()
                .update_item(&ProductId::from(product_id), quantity)
                .await?;
            display(&cart);
        }
        CartAction::Remove { product_id } => {
            let cart = app.cart().remove_item(&ProductId::from(product_id)).await?;
            display(&cart);
        }
        CartAction::Clear => {
            let cart = app.cart().clear().await?;
            display(&cart);
        }
    }
    Ok(())
}

fn display(cart: &Cart) {
    if cart.is_empty() {
        tracing::info!("Cart is empty");
        return;
    }
    for item in &cart.items {
        tracing::info!(
            "{:>3} x {:<32} @ {:>8}  ({})",
            item.quantity,
            item.name,
            item.price,
            item.product_id
        );
    }
    // Total exactly as the server computed it.
    tracing::info!("Total: {}", cart.total_amount);
}
