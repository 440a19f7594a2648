//! GoMarketplace CLI - Inspect and edit a locally persisted cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! gm-cart list
//!
//! # Add a product (adding it again bumps the quantity)
//! gm-cart add --id p1 --title "Widget" --image-url http://img/p1.png --price 9.99
//!
//! # Change quantities
//! gm-cart increment p1
//! gm-cart decrement p1
//!
//! # Print the stored JSON
//! gm-cart dump
//!
//! # Use another store file or key
//! gm-cart --store /tmp/cart.json --key cart:guest list
//! ```
//!
//! # Commands
//!
//! - `list` - Show line items and total quantity
//! - `add` - Add one unit of a product
//! - `increment` / `decrement` - Change the quantity of a product
//! - `dump` - Print the persisted cart value

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gomarketplace_core::{NewCartItem, Price, ProductId};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::cart::CartOptions;

#[derive(Parser)]
#[command(name = "gm-cart")]
#[command(author, version, about = "GoMarketplace cart tools")]
struct Cli {
    /// Cart store file (overrides `CART_STORE_PATH`)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Storage key holding the cart (overrides `CART_STORAGE_KEY`)
    #[arg(long, global = true)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart
    List,
    /// Add one unit of a product
    Add {
        /// Product ID
        #[arg(long)]
        id: String,

        /// Product title
        #[arg(long)]
        title: String,

        /// Product image URL
        #[arg(long)]
        image_url: String,

        /// Unit price (e.g. 9.99)
        #[arg(long)]
        price: Price,
    },
    /// Add one unit to a product already in the cart
    Increment {
        /// Product ID
        id: String,
    },
    /// Remove one unit of a product
    Decrement {
        /// Product ID
        id: String,
    },
    /// Print the persisted cart value
    Dump,
}

#[tokio::main]
async fn main() {
    // Defaults to info level for the cart crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "gomarketplace_cart=info,gm_cart=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let options = CartOptions {
        store: cli.store,
        key: cli.key,
    };

    match cli.command {
        Commands::List => commands::cart::list(&options).await?,
        Commands::Add {
            id,
            title,
            image_url,
            price,
        } => {
            let item = NewCartItem::new(id, title, image_url, price);
            commands::cart::add(&options, item).await?;
        }
        Commands::Increment { id } => {
            commands::cart::increment(&options, &ProductId::new(id)).await?;
        }
        Commands::Decrement { id } => {
            commands::cart::decrement(&options, &ProductId::new(id)).await?;
        }
        Commands::Dump => commands::cart::dump(&options).await?,
    }
    Ok(())
}
