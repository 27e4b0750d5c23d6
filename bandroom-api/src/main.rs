//! # Bandroom API Server
//!
//! This is the main API server for Bandroom, a rehearsal planner for bands.
//! It exposes login, user management, and schedule endpoints.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - Cookie-session authentication backed by signed tokens
//! - Capability-gated user management (list, view, edit, soft delete)
//! - Per-user rehearsal schedules aggregated across band memberships
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p bandroom-api
//! ```

use bandroom_api::{
    app::{build_router, AppState},
    config::Config,
};
use bandroom_shared::db::{migrations::run_migrations, pool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bandroom_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Bandroom API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = Config::from_env()?;

    // Initialize database pool and apply migrations
    let pool = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;
    run_migrations(&pool).await?;

    let bind_address = config.bind_address();
    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
