//! Async filesystem helpers
//!
//! Small wrappers over `tokio::fs` for existence checks, nested file
//! creation and directory emptiness checks.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use courier_fs::{create_nested_file, exists, is_empty_dir};
//!
//! # async fn example() -> courier_fs::Result<()> {
//! let _file = create_nested_file("cache/objects/ab/cdef").await?;
//! assert!(exists("cache/objects/ab").await);
//! assert!(!is_empty_dir("cache/objects").await?);
//! # Ok(())
//! # }
//! ```

mod error;

pub use error::{FsError, Result};

use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::{self, DirBuilder, File};
use tracing::debug;

/// Whether a file or directory exists at `path`.
///
/// Only a definite "not found" counts as missing; any other failure to stat
/// the path (permissions, for instance) reports it as existing.
pub async fn exists(path: impl AsRef<Path>) -> bool {
    match fs::metadata(path).await {
        Ok(_) => true,
        Err(e) => e.kind() != ErrorKind::NotFound,
    }
}

/// Create (or truncate) the file at `path`, creating missing parent
/// directories first. New directories are private to the owner on unix.
pub async fn create_nested_file(path: impl AsRef<Path>) -> Result<File> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !exists(parent).await
    {
        debug!(path = %parent.display(), "Creating parent directories");
        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o700);
        builder
            .create(parent)
            .await
            .map_err(|e| FsError::io(parent, e))?;
    }

    File::create(path).await.map_err(|e| FsError::io(path, e))
}

/// Whether the directory at `path` has no entries.
pub async fn is_empty_dir(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    let mut entries = fs::read_dir(path).await.map_err(|e| FsError::io(path, e))?;

    let first = entries
        .next_entry()
        .await
        .map_err(|e| FsError::io(path, e))?;
    Ok(first.is_none())
}
