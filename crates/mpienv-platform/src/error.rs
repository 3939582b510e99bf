use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown shell: {0}")]
    UnknownShell(String),

    #[error("command not found: {cmd}")]
    CommandNotFound { cmd: String },

    #[error("command failed: {cmd}, source: {source}")]
    CommandFailed { cmd: String, source: std::io::Error },

    #[error("search path entry contains a separator: {0}")]
    JoinPaths(String),

    #[error("home directory could not be determined")]
    NoHome,
}
