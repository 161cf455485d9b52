//! Run control API handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use artdump_core::{
    LibraryError, MediaType, RunScope, RunSignal, RunSummary, ServiceError,
};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for starting a run
#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub scope: RunScope,
    /// Skip items already processed under their current label
    #[serde(default)]
    pub only_new: bool,
}

/// Request body naming one library item
#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    pub media_type: MediaType,
    pub dbid: i64,
}

/// Run accepted response
#[derive(Debug, Serialize)]
pub struct RunAcceptedResponse {
    pub signal: RunSignal,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    /// False when nothing was running or pending
    pub cancelled: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

fn service_error_response(err: ServiceError) -> Response {
    let status = match &err {
        ServiceError::Busy => StatusCode::CONFLICT,
        ServiceError::NotQueueable(_) => StatusCode::BAD_REQUEST,
        ServiceError::Library(LibraryError::NotFound { .. }) => StatusCode::NOT_FOUND,
        ServiceError::Library(_) => StatusCode::BAD_GATEWAY,
        ServiceError::Media(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    error_response(status, err.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// Request a run of a library section. It starts on the service loop's next pass.
pub async fn start_run(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RunRequest>,
) -> Response {
    if !state.config().service.enabled {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Service loop is disabled in config",
        );
    }
    let signal = RunSignal::for_scope(request.scope, request.only_new);
    state.service().signal(signal).await;
    (StatusCode::ACCEPTED, Json(RunAcceptedResponse { signal })).into_response()
}

/// Abort the active run or drop a pending request.
pub async fn cancel_run(State(state): State<Arc<AppState>>) -> Json<CancelResponse> {
    let cancelled = state.service().cancel().await;
    Json(CancelResponse { cancelled })
}

/// Queue a recently added video for the next recently-added run.
pub async fn queue_recent(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ItemRequest>,
) -> Response {
    match state
        .service()
        .queue_recent(request.media_type, request.dbid)
        .await
    {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(RunAcceptedResponse {
                signal: RunSignal::RecentVideos,
            }),
        )
            .into_response(),
        Err(e) => service_error_response(e),
    }
}

/// Process one item now and return its run summary.
pub async fn process_item(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ItemRequest>,
) -> Result<Json<RunSummary>, Response> {
    info!(media_type = %request.media_type, dbid = request.dbid, "Processing single item");
    state
        .service()
        .process_item(request.media_type, request.dbid)
        .await
        .map(Json)
        .map_err(|e| {
            warn!(error = %e, "Single item run failed");
            service_error_response(e)
        })
}
