use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::json;

use crate::errors::CounterError;
use crate::services::counter_service::CounterStore;
use crate::state::counters::{Count, CounterKind, ItemId};

/// Build all counter routes under /api
pub fn routes(store: CounterStore) -> Router {
    Router::new()
        .route("/likes/:id", get(get_likes).post(like))
        .route("/unlike/:id", post(unlike))
        .route("/views/:id", get(get_views).post(view))
        .route("/shares/:id", get(get_shares).post(share))
        // Identifier segment missing or empty
        .route("/likes", get(missing_id).post(missing_id))
        .route("/likes/", get(missing_id).post(missing_id))
        .route("/unlike", post(missing_id))
        .route("/unlike/", post(missing_id))
        .route("/views", get(missing_id).post(missing_id))
        .route("/views/", get(missing_id).post(missing_id))
        .route("/shares", get(missing_id).post(missing_id))
        .route("/shares/", get(missing_id).post(missing_id))
        .with_state(store)
}

/// Response body `{ "<kind>": count }`, e.g. `{ "likes": 3 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountBody {
    pub kind: CounterKind,
    pub count: Count,
}

impl Serialize for CountBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.kind.name(), &self.count)?;
        map.end()
    }
}

/// Error surface of the counter API. Storage details never reach the client.
#[derive(Debug)]
pub struct ApiError(CounterError);

impl From<CounterError> for ApiError {
    fn from(err: CounterError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            CounterError::InvalidIdentifier => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid identifier" }))).into_response()
            }
            err => {
                tracing::error!("Counter request failed: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "internal error" }))).into_response()
            }
        }
    }
}

type ApiResult = Result<Json<CountBody>, ApiError>;

async fn read(store: &CounterStore, kind: CounterKind, raw: String) -> ApiResult {
    let id = ItemId::parse(raw)?;
    let count = store.get(kind, &id).await?;
    Ok(Json(CountBody { kind, count }))
}

async fn bump(store: &CounterStore, kind: CounterKind, raw: String) -> ApiResult {
    let id = ItemId::parse(raw)?;
    let count = store.increment(kind, &id).await?;
    Ok(Json(CountBody { kind, count }))
}

//
// ─────────────────────────────────────────────────────────────
// GET /api/likes/{id}
// POST /api/likes/{id}    like: +1
// POST /api/unlike/{id}   unlike: -1, floor 0
// ─────────────────────────────────────────────────────────────
//
async fn get_likes(Path(id): Path<String>, State(store): State<CounterStore>) -> ApiResult {
    read(&store, CounterKind::Like, id).await
}

async fn like(Path(id): Path<String>, State(store): State<CounterStore>) -> ApiResult {
    bump(&store, CounterKind::Like, id).await
}

async fn unlike(Path(id): Path<String>, State(store): State<CounterStore>) -> ApiResult {
    let id = ItemId::parse(id)?;
    let count = store.decrement(CounterKind::Like, &id).await?;
    Ok(Json(CountBody { kind: CounterKind::Like, count }))
}

//
// ─────────────────────────────────────────────────────────────
// GET /api/views/{id}
// POST /api/views/{id}
// ─────────────────────────────────────────────────────────────
//
async fn get_views(Path(id): Path<String>, State(store): State<CounterStore>) -> ApiResult {
    read(&store, CounterKind::View, id).await
}

async fn view(Path(id): Path<String>, State(store): State<CounterStore>) -> ApiResult {
    bump(&store, CounterKind::View, id).await
}

//
// ─────────────────────────────────────────────────────────────
// GET /api/shares/{id}
// POST /api/shares/{id}
// ─────────────────────────────────────────────────────────────
//
async fn get_shares(Path(id): Path<String>, State(store): State<CounterStore>) -> ApiResult {
    read(&store, CounterKind::Share, id).await
}

async fn share(Path(id): Path<String>, State(store): State<CounterStore>) -> ApiResult {
    bump(&store, CounterKind::Share, id).await
}

async fn missing_id() -> ApiError {
    ApiError(CounterError::InvalidIdentifier)
}
