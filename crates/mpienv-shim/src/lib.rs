//! The shim: a directory of symbolic links standing in for the active MPI.
//!
//! # Architecture
//!
//! Two halves, both free of MPI knowledge:
//!
//! - [`TargetResolver`] maps a command name to the binary a shell would run,
//!   which is how "active" is decided.
//! - [`ShimBuilder`] mirrors selected files of an installation into the
//!   fixed `bin/`, `lib/`, `include/`, `libexec/` layout. Which files are
//!   selected is the caller's policy.
//!
//! # Example
//!
//! ```no_run
//! use mpienv_shim::{Category, ShimBuilder};
//!
//! # fn main() -> mpienv_shim::Result<()> {
//! let report = ShimBuilder::new("/home/me/.mpienv/versions/shims")
//!     .mirror(Category::Bin, "/opt/mpich/bin", &["mpi*", "hydra_*"])?
//!     .build()?;
//! println!("{} links", report.linked);
//! # Ok(())
//! # }
//! ```

pub use error::{Error, Result};
pub use layout::{Category, Pattern, ShimBuilder, ShimReport};
pub use resolver::{SearchPathResolver, TargetResolver};

mod error;
mod layout;
mod resolver;
