use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod allocator;
mod codegen;
mod config;
mod error;
mod handlers;
mod models;
mod resolver;
mod store;
mod url_check;

use allocator::Allocator;
use resolver::Resolver;
use store::{LinkStore, MemoryLinkStore, SqliteLinkStore};

// ── Shared application state ───────────────────────────────────────────────

/// Everything a request handler needs, built once at startup and passed in
/// through axum's `State`. Both services share the same store.
pub struct AppState {
    pub allocator: Allocator,
    pub resolver: Resolver,
    pub config: config::AppConfig,
}

// ── Router ─────────────────────────────────────────────────────────────────

pub fn router(state: Arc<AppState>) -> Router {
    // Any origin may call both endpoints.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/shorten", post(handlers::shorten::shorten))
        // Liveness only; does not touch the store.
        .route("/health", get(|| async { axum::http::StatusCode::OK }))
        // A bare "/" is a redirect request without a code.
        .route("/", get(handlers::redirect::redirect))
        .route("/:code", get(handlers::redirect::redirect))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ── Entry point ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present; real env vars take precedence
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snaplink=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::AppConfig::from_env()?;
    tracing::info!("Starting snaplink on {}:{}", config.host, config.port);
    match &config.base_url {
        Some(url) => tracing::info!("Base URL: {}", url),
        None => tracing::info!("Base URL: inferred from request headers"),
    }

    let store: Arc<dyn LinkStore> = if config.uses_memory_store() {
        tracing::warn!("Using in-memory link store; links will not survive a restart");
        Arc::new(MemoryLinkStore::new())
    } else {
        Arc::new(SqliteLinkStore::connect(&config.database_url).await?)
    };

    let state = Arc::new(AppState {
        allocator: Allocator::new(
            store.clone(),
            config.code_length,
            config.max_attempts,
            config.store_timeout,
        ),
        resolver: Resolver::new(store, config.store_timeout),
        config,
    });

    let bind_addr = format!("{}:{}", state.config.host, state.config.port);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
