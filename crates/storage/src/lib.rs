//! Storage capabilities used by the upload core.
//!
//! The core never touches the filesystem directly: it asks a [`Storage`]
//! implementation to create, list, stream, move and delete named blobs.
//! [`LocalStorage`] is the `tokio::fs` backed implementation used by the
//! server.

mod local;

use std::future::Future;
use std::io;
use std::path::Path;

use tokio::io::{AsyncRead, AsyncWrite};

pub use local::LocalStorage;

/// Blob and directory operations, addressed by paths relative to a root.
///
/// Every method returns a `Send` future so callers can drive them from
/// spawned tasks.
pub trait Storage: Send + Sync + 'static {
    /// Stream returned by [`open_read`](Self::open_read).
    type Reader: AsyncRead + Unpin + Send + 'static;
    /// Stream returned by [`create`](Self::create) and
    /// [`open_write_at`](Self::open_write_at).
    type Writer: AsyncWrite + Unpin + Send + 'static;

    /// Creates a directory and its parents. Succeeds if it already exists,
    /// including when another caller created it concurrently.
    fn create_dir_all(&self, path: &Path) -> impl Future<Output = io::Result<()>> + Send;

    /// Returns the entry names of a directory.
    fn list_dir(&self, path: &Path) -> impl Future<Output = io::Result<Vec<String>>> + Send;

    /// Returns `true` if a regular file exists at `path`. Directories and
    /// missing paths both give `false`.
    fn is_file(&self, path: &Path) -> impl Future<Output = io::Result<bool>> + Send;

    /// Size of a blob in bytes.
    fn file_len(&self, path: &Path) -> impl Future<Output = io::Result<u64>> + Send;

    /// Opens a blob for sequential reading.
    fn open_read(&self, path: &Path) -> impl Future<Output = io::Result<Self::Reader>> + Send;

    /// Creates a blob, truncating any previous content.
    fn create(&self, path: &Path) -> impl Future<Output = io::Result<Self::Writer>> + Send;

    /// Opens an existing blob for writing starting at `offset`.
    ///
    /// The blob is not truncated. Several writers may hold disjoint ranges
    /// of the same blob at once.
    fn open_write_at(
        &self,
        path: &Path,
        offset: u64,
    ) -> impl Future<Output = io::Result<Self::Writer>> + Send;

    /// Moves `from` onto `to`, replacing `to` if it exists.
    fn rename(&self, from: &Path, to: &Path) -> impl Future<Output = io::Result<()>> + Send;

    /// Deletes a single blob.
    fn remove_file(&self, path: &Path) -> impl Future<Output = io::Result<()>> + Send;

    /// Deletes a directory and everything below it.
    fn remove_dir_all(&self, path: &Path) -> impl Future<Output = io::Result<()>> + Send;
}
