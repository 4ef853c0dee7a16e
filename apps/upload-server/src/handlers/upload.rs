use std::io;

use axum::Json;
use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use futures_util::TryStreamExt;
use resumable_protocol::{ApiResponse, fields};
use tokio_util::io::StreamReader;

use crate::app::AppState;
use crate::error::ApiError;

/// `POST /upload`: store one chunk.
///
/// The chunk body is streamed straight into storage when `fileHash` and
/// `chunkHash` precede it in the form; otherwise it is buffered until they
/// arrive.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let mut file_hash: Option<String> = None;
    let mut chunk_hash: Option<String> = None;
    let mut buffered: Option<Bytes> = None;
    let mut stored = false;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            fields::FILE_HASH => file_hash = Some(field.text().await.map_err(bad_multipart)?),
            fields::CHUNK_HASH => chunk_hash = Some(field.text().await.map_err(bad_multipart)?),
            fields::CHUNK => {
                if let (Some(file_id), Some(chunk_id)) = (&file_hash, &chunk_hash) {
                    let body =
                        StreamReader::new(field.map_err(|e| io::Error::other(e.to_string())));
                    tokio::pin!(body);
                    state.uploads.store_chunk(file_id, chunk_id, body).await?;
                    stored = true;
                } else {
                    buffered = Some(field.bytes().await.map_err(bad_multipart)?);
                }
            }
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }

    if !stored {
        let (Some(file_id), Some(chunk_id)) = (file_hash, chunk_hash) else {
            return Err(ApiError::bad_request(format!(
                "{} and {} are required",
                fields::FILE_HASH,
                fields::CHUNK_HASH
            )));
        };
        let Some(body) = buffered else {
            return Err(ApiError::bad_request(format!("{} is required", fields::CHUNK)));
        };
        state.uploads.store_chunk(&file_id, &chunk_id, &body[..]).await?;
    }

    Ok(Json(ApiResponse::success("chunk uploaded")))
}

fn bad_multipart(err: MultipartError) -> ApiError {
    ApiError::bad_request(format!("invalid multipart body: {err}"))
}
