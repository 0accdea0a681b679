/*****************************************************************************************
 *
 *  postcounter – like / view / share counters for blog posts
 *  ---------------------------------------------------------
 *
 *  One JSON document per counter kind, rewritten on every change.
 *
 *****************************************************************************************/

mod app;
mod config;
mod errors;
mod persistence;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use axum::serve;
use tokio::net::TcpListener;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::FmtSubscriber;

use crate::config::{AppConfig, StorageMode};
use crate::persistence::{CounterBackend, JsonFileBackend, MemoryBackend};
use crate::services::counter_service::CounterStore;
use crate::state::counters::CounterKind;

#[tokio::main]
async fn main() {
    //
    // ────────────────────────────────────────────────────────
    //  Locate and load config.json
    // ────────────────────────────────────────────────────────
    //
    let cfg = match config::locate().and_then(|path| AppConfig::load_from_file(&path)) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    //
    // ────────────────────────────────────────────────────────
    //  Configure logging
    // ────────────────────────────────────────────────────────
    //
    let level = match cfg.log_level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    tracing::info!("Starting postcounter…");
    tracing::info!("Loaded configuration: {:?}", cfg);

    //
    // ────────────────────────────────────────────────────────
    //  Counter store
    // ────────────────────────────────────────────────────────
    //
    let backend: Arc<dyn CounterBackend> = match cfg.storage {
        StorageMode::Json => {
            let files = JsonFileBackend::new(&cfg.data_dir);
            for kind in CounterKind::ALL {
                tracing::info!("{} stored in {}", kind, files.path_for(kind).display());
            }
            Arc::new(files)
        }
        StorageMode::Memory => {
            tracing::warn!("In-memory storage selected, counts are lost on exit");
            Arc::new(MemoryBackend::new())
        }
    };
    let store = CounterStore::new(backend);

    let app = app::build_app(store, cfg.clone());

    //
    // ────────────────────────────────────────────────────────
    //  Bind server and start listening
    // ────────────────────────────────────────────────────────
    //
    let addr = format!("{}:{}", cfg.host, cfg.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Listening on http://{}", addr);

    if let Err(e) = serve(listener, app).with_graceful_shutdown(shutdown()).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

//
// ─────────────────────────────────────────────────────────────
//  Graceful shutdown handler
// ─────────────────────────────────────────────────────────────
//
async fn shutdown() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }

    // Every change is persisted before its response, nothing to flush.
    tracing::warn!("CTRL+C received, shutting down. Goodbye.");
}
