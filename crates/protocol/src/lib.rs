//! Wire types shared between the upload server and its browser client.
//!
//! Every endpoint answers with the same [`ApiResponse`] envelope; the
//! request bodies of `/verify` and `/merge` are JSON, `/upload` is multipart
//! with the field names in [`fields`].

pub mod envelope;
pub mod messages;

pub use envelope::ApiResponse;
pub use messages::{MergeRequest, VerifyData, VerifyRequest};

/// Multipart field names accepted by `/upload`.
pub mod fields {
    /// Content-derived identity of the whole file.
    pub const FILE_HASH: &str = "fileHash";
    /// Identity of the chunk, `<anything>-<index>`.
    pub const CHUNK_HASH: &str = "chunkHash";
    /// The chunk body.
    pub const CHUNK: &str = "chunk";
}
