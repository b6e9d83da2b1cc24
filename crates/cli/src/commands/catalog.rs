//! Catalog browsing commands.

use clap::Subcommand;

use clementine_client::App;
use clementine_client::catalog::ProductQuery;
use clementine_core::ProductId;

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List products, one page at a time
    List {
        /// Page number (1-based)
        #[arg(short, long)]
        page: Option<u32>,

        /// Items per page
        #[arg(short, long)]
        limit: Option<u32>,

        /// Filter to one category
        #[arg(short, long)]
        category: Option<String>,

        /// Free-text search (always hits the server)
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one product in full
    Show {
        /// Product id
        product_id: String,
    },
    /// List the available categories
    Categories,
}

pub async fn run(app: &App, action: CatalogAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        CatalogAction::List {
            page,
            limit,
            category,
            search,
        } => {
            let query = ProductQuery {
                page,
                limit,
                category,
                search,
            };
            let listing = app.catalog().list_products(&query).await?;
            for product in &listing.products {
                tracing::info!(
                    "{}  {:<32} {:>8}  [{}]{}",
                    product.id,
                    product.name,
                    product.price,
                    product.category,
                    if product.is_purchasable() { "" } else { "  (unavailable)" }
                );
            }
            tracing::info!(
                "Page {} of {} ({} products total)",
                listing.page,
                listing.total_pages(),
                listing.total
            );
        }
        CatalogAction::Show { product_id } => {
            let product = app.catalog().get_product(&ProductId::from(product_id)).await?;
            tracing::info!("{} ({})", product.name, product.id);
            tracing::info!("  Price:    {}", product.price);
            tracing::info!("  Category: {}", product.category);
            tracing::info!("  Stock:    {}", product.stock);
            tracing::info!("  Active:   {}", product.is_active);
            tracing::info!("  {}", product.description);
        }
        CatalogAction::Categories => {
            let categories = app.catalog().list_categories().await?;
            for category in categories {
                tracing::info!("{category}");
            }
        }
    }
    Ok(())
}
