use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use storefront::checkout::{CheckoutService, StripeConfig, StripeGateway};
use storefront::config::AppConfig;
use storefront::database;
use storefront::domain::catalog::AsciiSlugger;
use storefront::domain::identity::Argon2Hasher;
use storefront::domain::order::{PlaceOrderHandler, StampedReferenceGenerator};
use storefront::fixtures::{SeedPlan, Seeder};
use storefront::http::{start_http_server, AppState};
use storefront::metrics::Metrics;
use storefront::storage::PgStore;

/// Storefront order and checkout service
#[derive(Debug, Parser)]
#[command(name = "storefront", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the checkout, payment callback, health and metrics routes
    Serve,
    /// Apply migrations and load demo data
    Seed {
        /// Seed for reproducible demo data
        #[arg(long)]
        rng_seed: Option<u64>,
    },
    /// Apply pending database migrations
    Migrate,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (ignore if missing)
    _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,storefront=debug")),
        )
        .init();

    let pool = database::connect(&cli.config)
        .await
        .context("failed to connect to the database")?;
    let store = Arc::new(PgStore::new(pool.clone()));
    let metrics = Arc::new(Metrics::new()?);

    match cli.command {
        Command::Migrate => {
            database::migrate(&pool).await?;
        }
        Command::Seed { rng_seed } => {
            database::migrate(&pool).await?;

            let handler = PlaceOrderHandler::new(
                store.clone(),
                Arc::new(StampedReferenceGenerator::new()),
                metrics.clone(),
            );
            let mut seeder = Seeder::new(
                store.clone(),
                store.clone(),
                Arc::new(handler),
                Arc::new(Argon2Hasher),
                Arc::new(AsciiSlugger),
            );
            if let Some(seed) = rng_seed {
                seeder = seeder.with_seed(seed);
            }

            let report = seeder.run(&SeedPlan::default()).await?;
            tracing::info!(?report, "Seeding complete");
        }
        Command::Serve => {
            let secret_key = cli
                .config
                .stripe_secret_key
                .clone()
                .context("STRIPE_SECRET_KEY is required to serve checkout")?;

            let gateway = StripeGateway::new(
                &StripeConfig::new(secret_key, cli.config.stripe_api_base.clone()),
                metrics.clone(),
            )?;
            let checkout = CheckoutService::new(
                store.clone(),
                Arc::new(gateway),
                cli.config.currency,
                cli.config.callback_urls(),
            );

            tracing::info!(
                metrics = metrics.registry().gather().len(),
                currency = %cli.config.currency,
                "Storefront ready"
            );

            let state = AppState {
                catalog: store.clone(),
                checkout: Arc::new(checkout),
                metrics,
                db: Some(pool),
            };
            start_http_server(state, &cli.config.socket_addr()).await?;
        }
    }

    Ok(())
}
