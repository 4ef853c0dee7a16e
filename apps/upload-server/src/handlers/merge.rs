use axum::Json;
use axum::extract::State;
use resumable_protocol::{ApiResponse, MergeRequest};
use resumable_transfer::MergeOutcome;

use crate::app::AppState;
use crate::error::ApiError;

/// `POST /merge`: assemble the staged chunks.
pub async fn merge(
    State(state): State<AppState>,
    Json(req): Json<MergeRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let outcome = state
        .uploads
        .merge(&req.file_hash, &req.file_name, req.size)
        .await?;

    let msg = match outcome {
        MergeOutcome::Merged { .. } => "merge complete",
        MergeOutcome::AlreadyMerged => "file already exists",
    };
    Ok(Json(ApiResponse::success(msg)))
}
