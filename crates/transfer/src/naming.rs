//! Where things live inside the storage root.
//!
//! ```text
//! <fileId><ext>                   assembled artifact
//! .chunks/<fileId>/<chunkId>       staged chunk
//! .incoming/<uuid>.chunk           chunk body still being received
//! .incoming/<uuid>.merge           artifact still being assembled
//! ```
//!
//! Identifiers never start with `.`, so artifacts cannot collide with the
//! staging or scratch trees, even for names without an extension.

use std::path::{Path, PathBuf};

use crate::TransferError;

/// Scratch directory for in-flight chunk bodies and merge output.
pub const INCOMING_DIR: &str = ".incoming";

/// Parent of every file's staging area.
pub const STAGING_DIR: &str = ".chunks";

/// Checks that an identifier can be used as a single storage name.
///
/// Rejects:
/// - Empty identifiers
/// - Path separators (`/`, `\`) and NUL
/// - A leading `.` (covers `.`, `..` and the scratch directory)
pub fn validate_identifier(kind: &str, value: &str) -> Result<(), TransferError> {
    if value.is_empty() {
        return Err(TransferError::InvalidName(format!("empty {kind}")));
    }

    if value.starts_with('.') {
        return Err(TransferError::InvalidName(format!(
            "{kind} must not start with '.': {value}"
        )));
    }

    if value.contains(['/', '\\', '\0']) {
        return Err(TransferError::InvalidName(format!(
            "{kind} must be a single path segment: {value}"
        )));
    }

    Ok(())
}

/// Returns the extension of `file_name` including its dot, or `""`.
///
/// Only the last path segment is considered and everything from its last
/// `.` on is the extension, so `movie.tar.gz` gives `.gz` and `.bashrc`
/// gives `.bashrc`.
pub fn extension_of(file_name: &str) -> &str {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    match base.rfind('.') {
        Some(dot) => &base[dot..],
        None => "",
    }
}

/// Name of the assembled artifact for a file.
pub fn artifact_name(file_id: &str, file_name: &str) -> String {
    format!("{file_id}{}", extension_of(file_name))
}

pub(crate) fn staging_dir(file_id: &str) -> PathBuf {
    Path::new(STAGING_DIR).join(file_id)
}

pub(crate) fn chunk_path(file_id: &str, chunk_id: &str) -> PathBuf {
    staging_dir(file_id).join(chunk_id)
}

/// A fresh scratch path, unique per call.
pub(crate) fn scratch_path(kind: &str) -> PathBuf {
    Path::new(INCOMING_DIR).join(format!("{}.{kind}", uuid::Uuid::new_v4()))
}
