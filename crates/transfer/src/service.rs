//! Single entry point bundling the store, the oracle and the merger.

use std::sync::Arc;

use resumable_storage::Storage;
use tokio::io::AsyncRead;

use crate::gate::FileGates;
use crate::{
    ChunkStore, CompletenessOracle, DEFAULT_MERGE_CONCURRENCY, MergeEngine, MergeOutcome,
    TransferError, UploadStatus,
};

/// The three upload operations over one storage.
///
/// Cheap to clone; clones share the storage and the per-file gates.
pub struct UploadService<S> {
    store: ChunkStore<S>,
    oracle: CompletenessOracle<S>,
    merger: MergeEngine<S>,
}

impl<S> Clone for UploadService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            oracle: self.oracle.clone(),
            merger: self.merger.clone(),
        }
    }
}

impl<S: Storage> UploadService<S> {
    pub fn new(storage: S) -> Self {
        Self::with_merge_concurrency(storage, DEFAULT_MERGE_CONCURRENCY)
    }

    /// Like [`new`](Self::new) with an explicit bound on concurrent chunk
    /// copies per merge (at least 1).
    pub fn with_merge_concurrency(storage: S, max_concurrency: usize) -> Self {
        let storage = Arc::new(storage);
        let gates = Arc::new(FileGates::default());
        Self {
            store: ChunkStore::new(Arc::clone(&storage), Arc::clone(&gates)),
            oracle: CompletenessOracle::new(Arc::clone(&storage)),
            merger: MergeEngine::new(storage, gates, max_concurrency),
        }
    }

    /// See [`ChunkStore::store_chunk`].
    pub async fn store_chunk<R>(
        &self,
        file_id: &str,
        chunk_id: &str,
        data: R,
    ) -> Result<u64, TransferError>
    where
        R: AsyncRead + Unpin + Send,
    {
        self.store.store_chunk(file_id, chunk_id, data).await
    }

    /// See [`CompletenessOracle::check_status`].
    pub async fn check_status(
        &self,
        file_id: &str,
        file_name: &str,
    ) -> Result<UploadStatus, TransferError> {
        self.oracle.check_status(file_id, file_name).await
    }

    /// See [`MergeEngine::merge`].
    pub async fn merge(
        &self,
        file_id: &str,
        file_name: &str,
        chunk_size: u64,
    ) -> Result<MergeOutcome, TransferError> {
        self.merger.merge(file_id, file_name, chunk_size).await
    }
}
