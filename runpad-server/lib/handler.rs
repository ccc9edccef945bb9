//! Request handlers for the runpad API.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use crate::error::{ServerError, ServerResult};
use crate::middleware;
use crate::payload::{
    CodeVersion, GetCodeRequest, GetCodeResponse, MessageResponse, RunRequest, RunResponse,
    SaveCodeRequest, SaveCodeResponse,
};
use crate::state::AppState;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Handler for health checks.
pub async fn health() -> ServerResult<impl IntoResponse> {
    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            message: "service is healthy".to_string(),
        }),
    ))
}

/// Execute a code submission in a pooled sandbox and return its output.
pub async fn run_code(
    State(state): State<AppState>,
    Json(req): Json<RunRequest>,
) -> ServerResult<impl IntoResponse> {
    let output = state.get_orchestra().run(&req.code).await?;
    Ok((StatusCode::OK, Json(RunResponse { output })))
}

/// Persist a snapshot of a note's code. Only allowlisted callers may save.
pub async fn save_code(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(req): Json<SaveCodeRequest>,
) -> ServerResult<impl IntoResponse> {
    let caller = middleware::client_ip(&headers, peer);
    if !state.get_config().get_security().is_allowed(&caller) {
        tracing::warn!("rejected save from {}", caller);
        return Err(ServerError::Forbidden);
    }

    let timestamp = state.get_store().save(&req.note_id, &req.code).await?;

    Ok((
        StatusCode::OK,
        Json(SaveCodeResponse {
            success: true,
            message: "code saved successfully".to_string(),
            timestamp,
        }),
    ))
}

/// Return a note's latest code along with its full version history.
pub async fn get_code(
    State(state): State<AppState>,
    Json(req): Json<GetCodeRequest>,
) -> ServerResult<impl IntoResponse> {
    let snapshots = state.get_store().list(&req.note_id).await?;

    let code = snapshots
        .first()
        .map(|snapshot| snapshot.get_content().clone())
        .unwrap_or_default();
    let versions: Vec<CodeVersion> = snapshots.into_iter().map(CodeVersion::from).collect();

    Ok((
        StatusCode::OK,
        Json(GetCodeResponse {
            code,
            success: true,
            message: "code retrieved successfully".to_string(),
            versions,
        }),
    ))
}
