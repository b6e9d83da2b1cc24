//! Clementine CLI - storefront client for the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! clem catalog list --category citrus
//! clem catalog show <product-id>
//!
//! # Sign in and manage the cart
//! clem auth login -e jo@example.com -p <password>
//! clem cart add <product-id> -q 2
//! clem cart show
//!
//! # Check out and follow up
//! clem orders place --street "1 Orchard Way" --city Amity --state MA \
//!     --zip 01002 --country US --payment credit_card
//! clem orders list
//! ```
//!
//! # Environment Variables
//!
//! - `CLEMENTINE_API_URL` - Base URL of the storefront API (required)
//! - `CLEMENTINE_DATA_DIR` - Where session and login state persist

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use clementine_client::{App, ClientConfig};

mod commands;

#[derive(Parser)]
#[command(name = "clem")]
#[command(author, version, about = "Clementine Market storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in, register, and manage the account
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Browse products and categories
    Catalog {
        #[command(subcommand)]
        action: commands::catalog::CatalogAction,
    },
    /// View and modify the shopping cart
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// Place orders and view order history
    Orders {
        #[command(subcommand)]
        action: commands::orders::OrderAction,
    },
    /// Manage the catalog (admin)
    Admin {
        #[command(subcommand)]
        action: commands::admin::AdminAction,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    let app = App::new(config)?;

    match cli.command {
        Commands::Auth { action } => commands::auth::run(&app, action).await?,
        Commands::Catalog { action } => commands::catalog::run(&app, action).await?,
        Commands::Cart { action } => commands::cart::run(&app, action).await?,
        Commands::Orders { action } => commands::orders::run(&app, action).await?,
        Commands::Admin { action } => commands::admin::run(&app, action).await?,
    }
    Ok(())
}
