pub mod lock;
pub mod workspace;

pub use lock::FileLock;
pub use workspace::Workspace;
