use std::sync::Arc;

use anyhow::Context;
use gateway_server::auth::TokenTable;
use gateway_server::config::{Config, StoreBackend};
use gateway_server::repository::{MemoryProgramRepository, PgProgramRepository, ProgramRepository};
use gateway_server::storage::FilesystemStorage;
use gateway_server::{AppState, Pagination, api, db};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gateway_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting program gateway...");

    let config = Config::from_env().context("Failed to read configuration")?;
    config.validate().context("Invalid configuration")?;

    let programs: Arc<dyn ProgramRepository> = match config.store {
        StoreBackend::Postgres => {
            tracing::info!("Connecting to database...");

            let pool = db::create_pool(&config.database_url)
                .await
                .context("Failed to create database pool")?;

            tracing::info!("Database connection pool created");

            db::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;

            Arc::new(PgProgramRepository::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory program store; records are lost on restart");
            Arc::new(MemoryProgramRepository::new())
        }
    };

    let artifacts = FilesystemStorage::new(&config.artifact_dir)
        .await
        .with_context(|| format!("Failed to open artifact directory {:?}", config.artifact_dir))?;

    tracing::info!("Storing artifacts under {:?}", artifacts.root());

    let tokens = TokenTable::new(&config.api_tokens);
    if tokens.is_empty() {
        tracing::warn!("No API tokens configured; all write requests will be refused");
    } else {
        tracing::info!("Loaded {} API token(s)", tokens.len());
    }

    let state = AppState::new(
        programs,
        Arc::new(artifacts),
        tokens,
        Pagination {
            page_size: config.page_size,
            max_page_size: config.max_page_size,
        },
    );

    // Build router with all API endpoints
    let app = api::create_router(state, config.max_upload_bytes);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
