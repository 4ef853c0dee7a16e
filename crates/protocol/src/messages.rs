use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Asks whether a file still needs uploading, and which chunks already exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub file_hash: String,
    pub file_name: String,
}

/// Asks the server to reassemble the staged chunks of a file.
///
/// `size` is the chunk size the client split the file with, not the file
/// size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequest {
    pub file_hash: String,
    pub file_name: String,
    pub size: u64,
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// Answer to [`VerifyRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyData {
    pub should_upload: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exist_chunks: Option<Vec<String>>,
}

impl VerifyData {
    /// The file is already stored; the client skips the upload.
    pub fn complete() -> Self {
        Self {
            should_upload: false,
            exist_chunks: None,
        }
    }

    /// The file must be (partly) uploaded; `exist_chunks` can be skipped.
    pub fn pending(exist_chunks: Vec<String>) -> Self {
        Self {
            should_upload: true,
            exist_chunks: Some(exist_chunks),
        }
    }
}
