//! Test helpers: instrumented storages and directory inspection.

use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

use resumable_storage::{LocalStorage, Storage};
use tokio::fs::File;
use tokio::io::AsyncWrite;

use crate::naming::{INCOMING_DIR, STAGING_DIR};

/// Which operation [`FaultyStorage`] breaks.
#[derive(Debug, Clone)]
pub(crate) enum Fault {
    /// Every `create` fails.
    Create,
    /// Opening the named blob for reading fails.
    Read(String),
    /// Removing any blob outside the scratch area fails.
    RemoveStaged,
}

/// [`LocalStorage`] with one operation made to fail.
pub(crate) struct FaultyStorage {
    inner: LocalStorage,
    fault: Fault,
}

impl FaultyStorage {
    pub fn new(root: &Path, fault: Fault) -> Self {
        Self {
            inner: LocalStorage::new(root),
            fault,
        }
    }
}

fn injected() -> io::Error {
    io::Error::other("injected fault")
}

impl Storage for FaultyStorage {
    type Reader = File;
    type Writer = File;

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.inner.create_dir_all(path).await
    }

    async fn list_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        self.inner.list_dir(path).await
    }

    async fn is_file(&self, path: &Path) -> io::Result<bool> {
        self.inner.is_file(path).await
    }

    async fn file_len(&self, path: &Path) -> io::Result<u64> {
        self.inner.file_len(path).await
    }

    async fn open_read(&self, path: &Path) -> io::Result<File> {
        if let Fault::Read(name) = &self.fault {
            if path.file_name().is_some_and(|f| f == name.as_str()) {
                return Err(injected());
            }
        }
        self.inner.open_read(path).await
    }

    async fn create(&self, path: &Path) -> io::Result<File> {
        if matches!(self.fault, Fault::Create) {
            return Err(injected());
        }
        self.inner.create(path).await
    }

    async fn open_write_at(&self, path: &Path, offset: u64) -> io::Result<File> {
        self.inner.open_write_at(path, offset).await
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.inner.rename(from, to).await
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        if matches!(self.fault, Fault::RemoveStaged) && !path.starts_with(INCOMING_DIR) {
            return Err(injected());
        }
        self.inner.remove_file(path).await
    }

    async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        self.inner.remove_dir_all(path).await
    }
}

/// [`LocalStorage`] that records the peak number of positional writers
/// open at the same time.
///
/// Each `open_write_at` holds its slot for a short while before opening, so
/// writers that are allowed to overlap actually do.
pub(crate) struct CountingStorage {
    inner: LocalStorage,
    open: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl CountingStorage {
    pub fn new(root: &Path) -> Self {
        Self {
            inner: LocalStorage::new(root),
            open: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// A [`File`] that frees its [`CountingStorage`] slot when dropped.
pub(crate) struct CountedWriter {
    inner: File,
    open: Option<Arc<AtomicUsize>>,
}

impl Drop for CountedWriter {
    fn drop(&mut self) {
        if let Some(open) = &self.open {
            open.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl AsyncWrite for CountedWriter {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

impl Storage for CountingStorage {
    type Reader = File;
    type Writer = CountedWriter;

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.inner.create_dir_all(path).await
    }

    async fn list_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        self.inner.list_dir(path).await
    }

    async fn is_file(&self, path: &Path) -> io::Result<bool> {
        self.inner.is_file(path).await
    }

    async fn file_len(&self, path: &Path) -> io::Result<u64> {
        self.inner.file_len(path).await
    }

    async fn open_read(&self, path: &Path) -> io::Result<File> {
        self.inner.open_read(path).await
    }

    async fn create(&self, path: &Path) -> io::Result<CountedWriter> {
        Ok(CountedWriter {
            inner: self.inner.create(path).await?,
            open: None,
        })
    }

    async fn open_write_at(&self, path: &Path, offset: u64) -> io::Result<CountedWriter> {
        let now = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;

        match self.inner.open_write_at(path, offset).await {
            Ok(file) => Ok(CountedWriter {
                inner: file,
                open: Some(Arc::clone(&self.open)),
            }),
            Err(e) => {
                self.open.fetch_sub(1, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.inner.rename(from, to).await
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.inner.remove_file(path).await
    }

    async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        self.inner.remove_dir_all(path).await
    }
}

/// Sorted entry names of `root/dir`, empty if it does not exist.
pub(crate) fn staged(root: &Path, dir: &str) -> Vec<String> {
    let mut names: Vec<String> = match std::fs::read_dir(root.join(dir)) {
        Ok(entries) => entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}

/// Sorted chunk ids staged for `file_id`.
pub(crate) fn staged_chunks(root: &Path, file_id: &str) -> Vec<String> {
    staged(&root.join(STAGING_DIR), file_id)
}

/// On-disk location of a staged chunk.
pub(crate) fn chunk_file(root: &Path, file_id: &str, chunk_id: &str) -> PathBuf {
    root.join(STAGING_DIR).join(file_id).join(chunk_id)
}

/// Splits `data` into `chunk_size` pieces named `<file_id>-<index>`.
pub(crate) fn split(file_id: &str, data: &[u8], chunk_size: usize) -> Vec<(String, Vec<u8>)> {
    data.chunks(chunk_size)
        .enumerate()
        .map(|(i, c)| (format!("{file_id}-{i}"), c.to_vec()))
        .collect()
}

/// Deterministic non-repeating test payload.
pub(crate) fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}
