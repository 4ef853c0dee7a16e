//! Resume and dedup checks.

use std::io;
use std::path::Path;
use std::sync::Arc;

use resumable_storage::Storage;

use crate::TransferError;
use crate::naming::{artifact_name, staging_dir, validate_identifier};
use crate::ordering::compare_chunk_ids;
use crate::types::UploadStatus;

/// Answers "does this file still need uploading, and what is already here?"
///
/// Pure reads only; safe to call at any time, including while the same
/// file is being merged.
pub struct CompletenessOracle<S> {
    storage: Arc<S>,
}

impl<S> Clone for CompletenessOracle<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<S: Storage> CompletenessOracle<S> {
    pub(crate) fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    pub async fn check_status(
        &self,
        file_id: &str,
        file_name: &str,
    ) -> Result<UploadStatus, TransferError> {
        validate_identifier("file id", file_id)?;

        let artifact = artifact_name(file_id, file_name);
        if self.storage.is_file(Path::new(&artifact)).await? {
            return Ok(UploadStatus::complete());
        }

        let mut chunks = match self.storage.list_dir(&staging_dir(file_id)).await {
            Ok(chunks) => chunks,
            // Never started, or merged and cleared since the check above.
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        chunks.sort_by(|a, b| compare_chunk_ids(a, b));

        tracing::debug!(file_id, staged = chunks.len(), "upload status checked");
        Ok(UploadStatus::pending(chunks))
    }
}
