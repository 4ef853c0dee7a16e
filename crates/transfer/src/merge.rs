//! Ordered reassembly of staged chunks.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use resumable_storage::Storage;
use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::gate::FileGates;
use crate::naming::{
    INCOMING_DIR, artifact_name, chunk_path, scratch_path, staging_dir, validate_identifier,
};
use crate::ordering::order_for_merge;
use crate::types::{MergeOutcome, StagedChunk};
use crate::{TransferError, discard};

/// Concatenates a file's staged chunks into its artifact.
pub struct MergeEngine<S> {
    storage: Arc<S>,
    gates: Arc<FileGates>,
    max_concurrency: usize,
}

impl<S> Clone for MergeEngine<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            gates: Arc::clone(&self.gates),
            max_concurrency: self.max_concurrency,
        }
    }
}

impl<S: Storage> MergeEngine<S> {
    /// `max_concurrency` bounds the chunk copies in flight per merge.
    pub(crate) fn new(storage: Arc<S>, gates: Arc<FileGates>, max_concurrency: usize) -> Self {
        Self {
            storage,
            gates,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Assembles `<fileId><ext>` from the staged chunks.
    ///
    /// Chunks are placed by their position in index order: the `i`-th chunk
    /// lands at byte `i * chunk_size`. Output goes to a scratch file that is
    /// renamed onto the artifact only after every copy succeeded, so a
    /// failed merge leaves the staging area intact and can simply be
    /// retried. Calling this again after success is a no-op.
    ///
    /// # Errors
    ///
    /// - [`TransferError::NotFound`] if nothing is staged and no artifact exists.
    /// - [`TransferError::InvalidLayout`] for a zero `chunk_size`, chunk ids
    ///   without a distinct index, or a chunk longer than `chunk_size`.
    ///   Any of these would place bytes at the wrong offset or let chunks
    ///   overwrite each other, so the merge is refused rather than producing
    ///   a corrupt artifact. Gaps in the indices are not detected.
    /// - [`TransferError::Io`] for any storage failure.
    pub async fn merge(
        &self,
        file_id: &str,
        file_name: &str,
        chunk_size: u64,
    ) -> Result<MergeOutcome, TransferError> {
        validate_identifier("file id", file_id)?;
        if chunk_size == 0 {
            return Err(TransferError::InvalidLayout(
                "chunk size must be greater than zero".into(),
            ));
        }

        let _sealed = self.gates.seal(file_id).await;

        let artifact = PathBuf::from(artifact_name(file_id, file_name));
        if self.storage.is_file(&artifact).await? {
            tracing::debug!(file_id, "artifact already present, nothing to merge");
            return Ok(MergeOutcome::AlreadyMerged);
        }

        let names = match self.storage.list_dir(&staging_dir(file_id)).await {
            Ok(names) => names,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(TransferError::NotFound(file_id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        if names.is_empty() {
            return Err(TransferError::NotFound(file_id.to_string()));
        }

        let chunks = order_for_merge(names)?;
        self.check_lengths(file_id, &chunks, chunk_size).await?;

        let limiter = Arc::new(Semaphore::new(self.max_concurrency));
        self.storage.create_dir_all(Path::new(INCOMING_DIR)).await?;
        let scratch = scratch_path("merge");

        let bytes = match self
            .copy_all(file_id, &chunks, &scratch, chunk_size, &limiter)
            .await
        {
            Ok(bytes) => bytes,
            Err(e) => {
                discard(&*self.storage, &scratch).await;
                tracing::error!(file_id, error = %e, "merge failed, staging kept for retry");
                return Err(e);
            }
        };

        if let Err(e) = self.storage.rename(&scratch, &artifact).await {
            discard(&*self.storage, &scratch).await;
            return Err(e.into());
        }

        tracing::info!(
            file_id,
            artifact = %artifact.display(),
            chunks = chunks.len(),
            bytes,
            "chunks merged"
        );

        self.clear_staging(file_id, &chunks, &limiter).await?;

        Ok(MergeOutcome::Merged {
            chunks: chunks.len(),
            bytes,
        })
    }

    /// Refuses chunks that would spill into their neighbour's range.
    async fn check_lengths(
        &self,
        file_id: &str,
        chunks: &[StagedChunk],
        chunk_size: u64,
    ) -> Result<(), TransferError> {
        for chunk in chunks {
            let len = self.storage.file_len(&chunk_path(file_id, &chunk.id)).await?;
            if len > chunk_size {
                return Err(TransferError::InvalidLayout(format!(
                    "chunk {} is {len} bytes, larger than chunk size {chunk_size}",
                    chunk.id
                )));
            }
        }
        Ok(())
    }

    /// Copies every chunk into `target` concurrently and returns the bytes
    /// written. Stops all copies on the first failure.
    async fn copy_all(
        &self,
        file_id: &str,
        chunks: &[StagedChunk],
        target: &Path,
        chunk_size: u64,
        limiter: &Arc<Semaphore>,
    ) -> Result<u64, TransferError> {
        drop(self.storage.create(target).await?);

        let mut tasks = JoinSet::new();
        for (position, chunk) in chunks.iter().enumerate() {
            let offset = (position as u64).checked_mul(chunk_size).ok_or_else(|| {
                TransferError::InvalidLayout(format!("offset of chunk {} overflows", chunk.id))
            })?;
            let storage = Arc::clone(&self.storage);
            let limiter = Arc::clone(limiter);
            let source = chunk_path(file_id, &chunk.id);
            let target = target.to_path_buf();

            tasks.spawn(async move {
                let _permit = limiter.acquire_owned().await.map_err(io::Error::other)?;
                copy_chunk(&*storage, &source, &target, offset).await
            });
        }

        let mut total = 0u64;
        while let Some(joined) = tasks.join_next().await {
            let copied = joined.map_err(io::Error::other).and_then(|r| r);
            match copied {
                Ok(n) => total += n,
                Err(e) => {
                    tasks.shutdown().await;
                    return Err(e.into());
                }
            }
        }
        Ok(total)
    }

    /// Deletes every staged chunk, then the staging area itself.
    async fn clear_staging(
        &self,
        file_id: &str,
        chunks: &[StagedChunk],
        limiter: &Arc<Semaphore>,
    ) -> Result<(), TransferError> {
        let mut tasks = JoinSet::new();
        for chunk in chunks {
            let storage = Arc::clone(&self.storage);
            let limiter = Arc::clone(limiter);
            let path = chunk_path(file_id, &chunk.id);

            tasks.spawn(async move {
                let _permit = limiter.acquire_owned().await.map_err(io::Error::other)?;
                storage.remove_file(&path).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined.map_err(io::Error::other).and_then(|r| r) {
                tasks.shutdown().await;
                tracing::warn!(file_id, error = %e, "artifact complete but staging not cleared");
                return Err(e.into());
            }
        }

        self.storage.remove_dir_all(&staging_dir(file_id)).await?;
        Ok(())
    }
}

/// Streams one chunk into `target` starting at `offset`.
async fn copy_chunk<S: Storage>(
    storage: &S,
    source: &Path,
    target: &Path,
    offset: u64,
) -> io::Result<u64> {
    let mut reader = storage.open_read(source).await?;
    let mut writer = storage.open_write_at(target, offset).await?;
    let n = tokio::io::copy(&mut reader, &mut writer).await?;
    writer.shutdown().await?;
    tracing::debug!(source = %source.display(), offset, bytes = n, "chunk copied");
    Ok(n)
}
