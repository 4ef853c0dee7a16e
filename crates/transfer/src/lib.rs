//! Resumable chunked upload core.
//!
//! Three cooperating pieces over a [`Storage`](resumable_storage::Storage):
//!
//! - [`ChunkStore`] stages chunk bodies under `.chunks/<fileId>/<chunkId>`.
//! - [`CompletenessOracle`] reports whether a file is already assembled, and
//!   otherwise which chunks are staged.
//! - [`MergeEngine`] concatenates the staged chunks in index order into
//!   `<fileId><ext>` and clears the staging area.
//!
//! No upload state lives in memory: everything is derived from what the
//! storage holds, so a restarted server resumes where it left off.
//! [`UploadService`] bundles the three for a transport to call.

mod gate;
mod merge;
mod naming;
mod oracle;
mod ordering;
mod service;
mod store;
mod types;

#[cfg(test)]
mod testutil;

use std::path::Path;

use resumable_storage::Storage;

pub use merge::MergeEngine;
pub use naming::{INCOMING_DIR, STAGING_DIR, artifact_name, extension_of, validate_identifier};
pub use oracle::CompletenessOracle;
pub use ordering::{chunk_index, compare_chunk_ids};
pub use service::UploadService;
pub use store::ChunkStore;
pub use types::{MergeOutcome, UploadStatus};

/// Default number of chunk copies a single merge runs at once.
pub const DEFAULT_MERGE_CONCURRENCY: usize = 16;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("nothing to merge for {0}, re-upload required")]
    NotFound(String),

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("invalid chunk layout: {0}")]
    InvalidLayout(String),
}

/// Removes a scratch blob, logging instead of failing.
async fn discard<S: Storage>(storage: &S, path: &Path) {
    match storage.remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove scratch file");
        }
    }
}
