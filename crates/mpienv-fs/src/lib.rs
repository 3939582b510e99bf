//! Filesystem primitives used by mpienv.
//!
//! Everything mpienv persists goes through this crate: the registry file is
//! written with [`atomic_write`], the shim tree is assembled in a staging
//! [`Workspace`] and swapped in with [`replace_dir`], and mutating commands
//! serialize on a [`FileLock`].

mod error;
pub mod primitives;
pub mod workflow;

pub use error::{Error, Result};
pub use primitives::{
    atomic_symlink, atomic_write, real_target, replace_dir, AtomicWriteOptions,
    ReplaceDirOptions,
};
pub use workflow::{FileLock, Workspace};
