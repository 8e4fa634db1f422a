// 🌐 Load Evaluation API - one load per request
//
// POST /            evaluate a single input record
// GET  /api/health  health check

use crate::error::IngestError;
use crate::ingest::LoadIngestor;
use crate::load::LoadResponse;
use crate::parser::parse_load;
use crate::store::LoadStore;
use crate::velocity::LoadValidator;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::{error, warn};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application state
pub struct AppState<S: LoadStore, V: LoadValidator> {
    ingestor: Arc<LoadIngestor<S, V>>,
}

impl<S: LoadStore, V: LoadValidator> Clone for AppState<S, V> {
    fn clone(&self) -> Self {
        Self {
            ingestor: Arc::clone(&self.ingestor),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorResponse { error: message })).into_response()
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: crate::VERSION,
    })
}

/// POST / - Evaluate one load
///
/// 200 with the decision, 400 for bad input or a duplicate, 500 for store failures.
async fn evaluate_load<S, V>(State(state): State<AppState<S, V>>, body: Bytes) -> Response
where
    S: LoadStore + 'static,
    V: LoadValidator + 'static,
{
    let candidate = match parse_load(&body) {
        Ok(candidate) => candidate,
        Err(e) => {
            warn!("rejecting malformed load: {}", e);
            return error_response(StatusCode::BAD_REQUEST, format!("Data in is incorrect. {e}"));
        }
    };

    // Runs to completion on the blocking pool even if the client goes away
    let ingestor = Arc::clone(&state.ingestor);
    let outcome = tokio::task::spawn_blocking(move || ingestor.ingest(candidate)).await;

    match outcome {
        Ok(Ok(record)) => (StatusCode::OK, Json(LoadResponse::from(&record))).into_response(),
        Ok(Err(e @ IngestError::Duplicate { .. })) => {
            warn!("{}", e);
            error_response(StatusCode::BAD_REQUEST, "Record already exists".to_string())
        }
        Ok(Err(IngestError::Store(e))) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error processing load. {e}"),
        ),
        Err(e) => {
            error!("load evaluation task failed: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error processing load.".to_string(),
            )
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn router<S, V>(ingestor: Arc<LoadIngestor<S, V>>) -> Router
where
    S: LoadStore + 'static,
    V: LoadValidator + 'static,
{
    let state = AppState { ingestor };

    Router::new()
        .route("/", post(evaluate_load::<S, V>))
        .route("/api/health", get(health_check))
        .with_state(state)
        .layer(CorsLayer::permissive())
}
