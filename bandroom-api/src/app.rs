/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with all
/// routes and middleware.
///
/// # Example
///
/// ```no_run
/// use bandroom_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = bandroom_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    routing::get,
    Router,
};
use bandroom_shared::auth::{
    authorization::capability_gate,
    middleware::{session_auth_middleware, AuthError},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the session signing secret
    pub fn session_secret(&self) -> &str {
        &self.config.session.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                 # Health check (public)
/// ├── /login                  # GET form view-model, POST credentials (public)
/// ├── /home                   # Current user's bands (authenticated)
/// └── /users                  # User management (authenticated + capability gate)
///     ├── GET      /          # List active users       (edit)
///     ├── GET      /:id       # Profile with events     (view)
///     ├── GET      /:id/events# Events only             (view)
///     ├── GET/POST /:id/edit  # Edit form / submission  (edit)
///     └── GET/POST /:id/delete# Soft delete             (edit)
/// ```
///
/// # Middleware Stack
///
/// Protected routes run, outermost first:
/// 1. Session middleware (resolves the session cookie into an AuthContext)
/// 2. Capability gate (route -> required capability table, 403 before the
///    handler body runs)
///
/// The whole router carries tower-http tracing and CORS.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public routes, no session required
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/login",
            get(routes::login::login_form).post(routes::login::login),
        );

    // Protected routes: session middleware first, then the capability gate.
    // Layers apply inside-out, so the gate is added first.
    let protected_routes = Router::new()
        .route("/home", get(routes::home::home))
        .route("/users", get(routes::users::list_users))
        .route("/users/:id", get(routes::users::view_user))
        .route("/users/:id/events", get(routes::users::user_events))
        .route(
            "/users/:id/edit",
            get(routes::users::edit_user_form).post(routes::users::edit_user),
        )
        .route(
            "/users/:id/delete",
            get(routes::users::delete_user).post(routes::users::delete_user),
        )
        .layer(axum::middleware::from_fn(capability_gate))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_layer,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Session middleware adapter binding the shared middleware to AppState
async fn session_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    session_auth_middleware(
        state.db.clone(),
        state.session_secret().to_string(),
        req,
        next,
    )
    .await
}
