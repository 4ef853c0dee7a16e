//! `tokio::fs` implementation of [`Storage`].

use std::io::{self, SeekFrom};
use std::path::{Component, Path, PathBuf};

use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncSeekExt;

use crate::Storage;

/// Storage rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Joins `path` onto the root, refusing anything that could leave it.
    fn resolve(&self, path: &Path) -> io::Result<PathBuf> {
        for component in path.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("path escapes storage root: {}", path.display()),
                    ));
                }
            }
        }
        Ok(self.root.join(path))
    }
}

impl Storage for LocalStorage {
    type Reader = File;
    type Writer = File;

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(self.resolve(path)?).await
    }

    async fn list_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut entries = fs::read_dir(self.resolve(path)?).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    async fn is_file(&self, path: &Path) -> io::Result<bool> {
        match fs::metadata(self.resolve(path)?).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn file_len(&self, path: &Path) -> io::Result<u64> {
        Ok(fs::metadata(self.resolve(path)?).await?.len())
    }

    async fn open_read(&self, path: &Path) -> io::Result<File> {
        File::open(self.resolve(path)?).await
    }

    async fn create(&self, path: &Path) -> io::Result<File> {
        File::create(self.resolve(path)?).await
    }

    async fn open_write_at(&self, path: &Path, offset: u64) -> io::Result<File> {
        let mut file = OpenOptions::new()
            .write(true)
            .open(self.resolve(path)?)
            .await?;
        file.seek(SeekFrom::Start(offset)).await?;
        Ok(file)
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(self.resolve(from)?, self.resolve(to)?).await
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(self.resolve(path)?).await
    }

    async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        let full = self.resolve(path)?;
        fs::remove_dir_all(&full).await?;
        tracing::debug!(path = %full.display(), "removed directory");
        Ok(())
    }
}
