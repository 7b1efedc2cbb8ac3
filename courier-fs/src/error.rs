//! Error types for filesystem helpers

use std::path::PathBuf;
use thiserror::Error;

/// Filesystem helper error types
#[derive(Error, Debug)]
pub enum FsError {
    /// IO error on a specific path
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Underlying IO error kind
    pub fn kind(&self) -> std::io::ErrorKind {
        match self {
            Self::Io { source, .. } => source.kind(),
        }
    }
}

/// Result type for filesystem helpers
pub type Result<T> = std::result::Result<T, FsError>;
