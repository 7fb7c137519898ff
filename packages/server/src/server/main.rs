// Reviews API server

use std::sync::Arc;

use anyhow::{Context, Result};
use reviews_core::domains::reviews::ApprovalConfig;
use reviews_core::kernel::ServerDeps;
use reviews_core::{server::build_app, Config};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,reviews_core=debug,sqlx=warn".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Open the pool and bring the schema up to date
async fn connect_database(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database ready");

    Ok(pool)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        port = config.port,
        approval_min_count = config.approval_min_count,
        "Starting reviews API"
    );

    let pool = connect_database(&config.database_url).await?;

    let approval_policy = Arc::new(ApprovalConfig::new(config.approval_min_count));
    let app = build_app(
        ServerDeps::postgres(pool.clone(), approval_policy),
        Some(pool),
    );

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
