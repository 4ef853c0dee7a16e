/// What the oracle knows about a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadStatus {
    /// `false` once the artifact exists; the client skips the upload.
    pub needs_upload: bool,
    /// Chunk identities already staged, in index order. Empty when
    /// `needs_upload` is `false`.
    pub existing_chunks: Vec<String>,
}

impl UploadStatus {
    pub fn complete() -> Self {
        Self {
            needs_upload: false,
            existing_chunks: Vec::new(),
        }
    }

    pub fn pending(existing_chunks: Vec<String>) -> Self {
        Self {
            needs_upload: true,
            existing_chunks,
        }
    }
}

/// Result of a successful merge call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Staged chunks were assembled into the artifact.
    Merged { chunks: usize, bytes: u64 },
    /// The artifact already existed; staging was not touched.
    AlreadyMerged,
}

/// A staged chunk with its parsed index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StagedChunk {
    pub index: u64,
    pub id: String,
}
