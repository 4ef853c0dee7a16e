//! Chunk staging.

use std::io;
use std::path::Path;
use std::sync::Arc;

use resumable_storage::Storage;
use tokio::io::{AsyncRead, AsyncWriteExt};

use crate::gate::FileGates;
use crate::naming::{INCOMING_DIR, chunk_path, scratch_path, staging_dir, validate_identifier};
use crate::{TransferError, discard};

/// Writes chunk bodies into a file's staging area.
pub struct ChunkStore<S> {
    storage: Arc<S>,
    gates: Arc<FileGates>,
}

impl<S> Clone for ChunkStore<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            gates: Arc::clone(&self.gates),
        }
    }
}

impl<S: Storage> ChunkStore<S> {
    pub(crate) fn new(storage: Arc<S>, gates: Arc<FileGates>) -> Self {
        Self { storage, gates }
    }

    /// Stores one chunk, replacing any earlier upload of the same chunk.
    ///
    /// The staging area is created on first use. The body is received into
    /// a scratch file and moved into place only once complete, so a broken
    /// upload never shows up as an existing chunk. Returns the number of
    /// bytes stored.
    pub async fn store_chunk<R>(
        &self,
        file_id: &str,
        chunk_id: &str,
        mut data: R,
    ) -> Result<u64, TransferError>
    where
        R: AsyncRead + Unpin + Send,
    {
        validate_identifier("file id", file_id)?;
        validate_identifier("chunk id", chunk_id)?;

        let _open = self.gates.open(file_id).await;

        self.storage.create_dir_all(Path::new(INCOMING_DIR)).await?;
        self.storage.create_dir_all(&staging_dir(file_id)).await?;

        let scratch = scratch_path("chunk");
        let bytes = match self.receive(&scratch, &mut data).await {
            Ok(n) => n,
            Err(e) => {
                discard(&*self.storage, &scratch).await;
                return Err(e.into());
            }
        };

        if let Err(e) = self
            .storage
            .rename(&scratch, &chunk_path(file_id, chunk_id))
            .await
        {
            discard(&*self.storage, &scratch).await;
            return Err(e.into());
        }

        tracing::info!(file_id, chunk_id, bytes, "chunk stored");
        Ok(bytes)
    }

    async fn receive<R>(&self, path: &Path, data: &mut R) -> io::Result<u64>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut out = self.storage.create(path).await?;
        let n = tokio::io::copy(data, &mut out).await?;
        out.shutdown().await?;
        Ok(n)
    }
}
