mod config;
mod error;
mod models;
mod routes;
mod services;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::services::fetcher::FeedFetcher;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub fetcher: FeedFetcher,
    pub start_time: Instant,
}

/// Build the router: playlist endpoint plus health and metrics
pub fn build_router(state: Arc<AppState>) -> Router {
    let playlist = if state.config.strict_root_path {
        Router::new()
            .route("/", get(routes::playlist::get_playlist))
            .fallback(routes::playlist::not_found)
    } else {
        // Any path serves the playlist
        Router::new().fallback(routes::playlist::get_playlist)
    };

    playlist
        // Health endpoints
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .route("/live", get(routes::health::live))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mjh_playlist_gateway=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env();
    let port = config.port;

    tracing::info!("Starting mjh playlist gateway v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app_env);
    tracing::info!("Upstream feeds: {}", config.upstream_base_url);
    if config.strict_root_path {
        tracing::info!("Strict routing: playlists served on / only");
    }

    let fetcher = FeedFetcher::new(&config)?;

    let state = Arc::new(AppState {
        config,
        fetcher,
        start_time: Instant::now(),
    });

    let app = build_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
