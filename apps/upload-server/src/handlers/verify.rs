use axum::Json;
use axum::extract::State;
use resumable_protocol::{ApiResponse, VerifyData, VerifyRequest};

use crate::app::AppState;
use crate::error::ApiError;

/// `POST /verify`: is the file already here, and if not, which chunks are?
pub async fn verify(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<ApiResponse<VerifyData>>, ApiError> {
    let status = state
        .uploads
        .check_status(&req.file_hash, &req.file_name)
        .await?;

    let data = if status.needs_upload {
        VerifyData::pending(status.existing_chunks)
    } else {
        VerifyData::complete()
    };
    Ok(Json(ApiResponse::with_data(data)))
}
