use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Map, Value};

use crate::services::counter_service::CounterStore;
use crate::state::counters::CounterKind;

pub fn routes(store: CounterStore) -> Router {
    Router::new().route("/health", get(health)).with_state(store)
}

/// GET /system/health
///
/// Loads every counter document. 200 when all are readable, 503 otherwise,
/// with a per-kind `"ok"` / `"unavailable"` breakdown.
async fn health(State(store): State<CounterStore>) -> (StatusCode, Json<Value>) {
    let mut counters = Map::new();
    let mut healthy = true;

    for kind in CounterKind::ALL {
        let state = match store.load(kind).await {
            Ok(_) => "ok",
            Err(e) => {
                tracing::error!("Health check failed for {}: {e}", kind);
                healthy = false;
                "unavailable"
            }
        };
        counters.insert(kind.name().to_string(), Value::from(state));
    }

    let status = if healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    let label = if healthy { "ok" } else { "degraded" };

    (status, Json(json!({ "status": label, "counters": counters })))
}
