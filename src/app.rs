use axum::Router;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::AppConfig;
use crate::routes::{counter_routes, system_routes};
use crate::services::counter_service::CounterStore;

/// Build the complete Axum application:
/// - /api      (like, view and share counters)
/// - /system   (storage health)
/// - anything else: static assets, falling back to index.html with 200
pub fn build_app(store: CounterStore, cfg: AppConfig) -> Router {
    let static_files = ServeDir::new(&cfg.static_dir).fallback(ServeFile::new(cfg.index_file()));

    Router::new()
        // /api/*
        .nest("/api", counter_routes::routes(store.clone()))

        // /system/*
        .nest("/system", system_routes::routes(store))

        // Static site + single-page fallback
        .fallback_service(static_files)

        // Logging middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
