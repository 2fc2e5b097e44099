//! Docbox API Server
//!
//! Main entry point for the document intake service.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docbox_api::{AppState, create_router};
use docbox_db::connect;
use docbox_db::migration::{Migrator, MigratorTrait};
use docbox_shared::{AppConfig, RateLimiter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docbox=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database and bring the schema up to date
    let db = connect(&config.database.url).await?;
    Migrator::up(&db, None).await?;
    info!("Connected to database");

    let rate_limiter = RateLimiter::new(
        config.rate_limit.requests,
        Duration::from_secs(config.rate_limit.window_secs),
    );

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        storage: Arc::new(config.storage.clone()),
        rate_limiter: Arc::new(rate_limiter),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
