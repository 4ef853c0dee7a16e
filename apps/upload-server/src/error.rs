//! Mapping of core errors onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use resumable_protocol::ApiResponse;
use resumable_transfer::TransferError;

/// An error answered as `{ok: false, msg}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    msg: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            msg: msg.into(),
        }
    }
}

impl From<TransferError> for ApiError {
    fn from(err: TransferError) -> Self {
        let status = match &err {
            TransferError::NotFound(_) => StatusCode::NOT_FOUND,
            TransferError::InvalidName(_) | TransferError::InvalidLayout(_) => {
                StatusCode::BAD_REQUEST
            }
            TransferError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            msg: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "{}", self.msg);
        } else {
            tracing::warn!(status = %self.status, "{}", self.msg);
        }
        (self.status, Json(ApiResponse::<()>::failure(self.msg))).into_response()
    }
}
