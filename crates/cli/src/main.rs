//! Ng Store CLI - Browse the catalog and drive the storefront pages.
//!
//! # Usage
//!
//! ```bash
//! # List products, optionally filtered by category
//! ng-store products --category-slug electronica
//!
//! # Show a product page, reveal related products and add it to the cart
//! ng-store product producto-prueba --related --image 1 --add-to-cart
//!
//! # Use the buffered transport instead of the streaming one
//! ng-store --transport fetch categories
//! ```
//!
//! # Commands
//!
//! - `products` - List products
//! - `product` - Product detail page
//! - `product-id` - Get a product by id
//! - `related` - Related products for a slug
//! - `categories` - List categories
//!
//! Results are printed to stdout as JSON; logs go to stderr.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use ng_store_storefront::catalog::TransportKind;
use ng_store_storefront::config::StoreConfig;
use ng_store_storefront::error::AppError;
use ng_store_storefront::meta::HeadTagsSink;
use ng_store_storefront::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "ng-store")]
#[command(author, version, about = "Ng Store catalog and cart CLI")]
struct Cli {
    /// Catalog transport (overrides `NG_STORE_TRANSPORT`)
    #[arg(long, global = true)]
    transport: Option<TransportKind>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Filter by category id
        #[arg(long)]
        category_id: Option<String>,

        /// Filter by category slug
        #[arg(long)]
        category_slug: Option<String>,
    },
    /// Show a product detail page
    Product {
        /// Product slug
        slug: String,

        /// Load the related products block
        #[arg(long)]
        related: bool,

        /// Select the image at this index as the cover
        #[arg(long)]
        image: Option<usize>,

        /// Add the product to the cart
        #[arg(long)]
        add_to_cart: bool,
    },
    /// Get a product by id
    ProductId {
        /// Product id
        id: String,
    },
    /// List products related to a slug
    Related {
        /// Product slug
        slug: String,
    },
    /// List categories
    Categories,
}

/// Errors surfaced by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Storefront operation failed.
    #[error(transparent)]
    App(#[from] AppError),

    /// Output could not be written.
    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),

    /// Output could not be serialized.
    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CliError {
    fn is_reportable(&self) -> bool {
        match self {
            Self::App(err) => err.is_reportable(),
            Self::Output(_) | Self::Serialize(_) => false,
        }
    }
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StoreConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing(json: bool) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ng_store_storefront=info,ng_store_cli=info".into());

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter));

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration first; Sentry needs the DSN before tracing starts
    let config = StoreConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    init_tracing(cli.json_logs);

    let mut config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(transport) = cli.transport {
        config.transport = transport;
    }

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_reportable() {
                let event_id = sentry::capture_error(&e);
                tracing::error!(error = %e, sentry_event_id = %event_id, "Command failed");
            } else {
                tracing::error!("Command failed: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: StoreConfig) -> Result<(), CliError> {
    let head = Arc::new(HeadTagsSink::new());
    let state = AppState::new(config, head.clone()).map_err(AppError::from)?;

    match command {
        Commands::Products {
            category_id,
            category_slug,
        } => commands::catalog::products(&state, category_id, category_slug).await,
        Commands::Product {
            slug,
            related,
            image,
            add_to_cart,
        } => {
            let options = commands::product::DetailOptions {
                related,
                image,
                add_to_cart,
            };
            commands::product::show(&state, &head, &slug, options).await
        }
        Commands::ProductId { id } => commands::catalog::product_by_id(&state, &id).await,
        Commands::Related { slug } => commands::catalog::related(&state, &slug).await,
        Commands::Categories => commands::catalog::categories(&state).await,
    }
}
