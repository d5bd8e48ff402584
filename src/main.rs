use std::sync::Arc;

use actix_web::middleware::from_fn;
use actix_web::{web, App, HttpServer};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;
mod domain;
mod error;
mod metrics;
mod store;

use config::{AppConfig, StorageBackend};
use domain::account::{AccountService, Argon2Hasher};
use domain::order::OrderCommandHandler;
use store::{MemoryStore, PgStore, Store};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Local runs may keep their settings in a .env file
    let dotenv = dotenvy::dotenv();

    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,food_orders=debug"))
        )
        .init();

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded environment from file");
    }

    tracing::info!("🚀 Starting food ordering service");

    // === 1. Configuration ===
    let config = AppConfig::from_env()?;

    // === 2. Storage ===
    let store: Arc<dyn Store> = match config.storage {
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for the postgres backend"))?;

            tracing::info!(max_connections = config.database_max_connections, "Connecting to PostgreSQL...");
            let store = PgStore::connect(url, config.database_max_connections).await?;

            tracing::info!("Applying migrations");
            store.migrate().await?;
            Arc::new(store)
        }
        StorageBackend::Memory => {
            tracing::warn!("⚠️  Using in-memory storage, data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    // === 3. Services ===
    let hasher = Argon2Hasher::new(config.argon2_memory_kib, config.argon2_iterations)?;
    let accounts = AccountService::new(Arc::new(hasher));
    let orders = OrderCommandHandler::new(config.status_policy());
    tracing::info!(policy = ?orders.policy(), "Order status policy");

    // === 4. Prometheus metrics ===
    let metrics = metrics::Metrics::new()?;
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    let state = web::Data::new(api::AppState::new(store, accounts, orders, metrics));

    // === 5. HTTP server ===
    let (host, port) = config.bind_addr();
    tracing::info!("🌐 Listening on http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(from_fn(api::middleware::observe_request))
            .configure(api::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    tracing::info!("👋 Server stopped");
    Ok(())
}
