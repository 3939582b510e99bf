pub mod replace_dir;
pub mod rw;
pub mod symlink;

pub use replace_dir::{replace_dir, Options as ReplaceDirOptions};
pub use rw::{atomic_write, Options as AtomicWriteOptions};
pub use symlink::{atomic_symlink, real_target};
