use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to link '{link}' -> '{target}': {source}")]
    Symlink {
        target: PathBuf,
        link: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to replace directory '{path}': {source}")]
    ReplaceDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to lock '{path}': {source}")]
    Lock {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("'{0}' has no parent directory")]
    NoParent(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;
