//! Error types for shim operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("resolution failed for command '{0}': target not found")]
    NotFound(String),

    #[error("invalid file pattern '{0}': {1}")]
    Pattern(String, String),

    #[error("failed to list '{path}': {source}")]
    ReadDir {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Fs(#[from] mpienv_fs::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
