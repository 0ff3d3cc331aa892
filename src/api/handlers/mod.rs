use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};

use crate::api::store::GraphStore;
use crate::models::{GraphRecord, RecordId};

fn not_found(id: &RecordId) -> (StatusCode, String) {
    tracing::warn!("Graph record {} not found", id);
    (StatusCode::NOT_FOUND, "Graph record not found".to_string())
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Graph
// ============================================================

pub async fn list_graphs(State(store): State<GraphStore>) -> Json<Vec<GraphRecord>> {
    Json(store.list())
}

pub async fn get_graph(
    State(store): State<GraphStore>,
    Path(id): Path<String>,
) -> Result<Json<GraphRecord>, (StatusCode, String)> {
    let id = RecordId::parse(&id);
    store.get(&id).map(Json).ok_or_else(|| not_found(&id))
}

pub async fn create_graph(
    State(store): State<GraphStore>,
    Json(input): Json<GraphRecord>,
) -> Result<(StatusCode, Json<GraphRecord>), (StatusCode, String)> {
    match store.insert(input) {
        Some(record) => {
            tracing::info!("Created graph record {:?}", record.id);
            Ok((StatusCode::CREATED, Json(record)))
        }
        None => Err((
            StatusCode::CONFLICT,
            "Graph record already exists".to_string(),
        )),
    }
}

pub async fn update_graph(
    State(store): State<GraphStore>,
    Path(id): Path<String>,
    Json(input): Json<GraphRecord>,
) -> Result<Json<GraphRecord>, (StatusCode, String)> {
    let id = RecordId::parse(&id);
    store
        .replace(&id, input)
        .map(Json)
        .ok_or_else(|| not_found(&id))
}

pub async fn patch_graph(
    State(store): State<GraphStore>,
    Path(id): Path<String>,
    Json(changes): Json<Map<String, Value>>,
) -> Result<Json<GraphRecord>, (StatusCode, String)> {
    let id = RecordId::parse(&id);
    store
        .merge(&id, changes)
        .map(Json)
        .ok_or_else(|| not_found(&id))
}

pub async fn delete_graph(
    State(store): State<GraphStore>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let id = RecordId::parse(&id);
    if store.delete(&id) {
        tracing::info!("Deleted graph record {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(&id))
    }
}
