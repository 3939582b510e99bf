//! Detection, registry and activation engine for mpienv.
//!
//! Data flows one way: the [`Detector`] classifies launchers, the
//! [`Registry`] persists names for them and classifies lazily, the
//! [`Activator`] rebuilds the shim for one record and moves the active
//! pointer, and [`ExecPlan`] launches programs under whatever is active.

pub mod activate;
pub mod config;
pub mod detect;
mod error;
pub mod exec;
pub mod installation;
pub mod launch;
pub mod python;
pub mod registry;
pub mod vendor;

pub use activate::{Activation, Activator, Assignment, InheritedEnv, Outcome};
pub use config::{MpienvEnv, Settings};
pub use detect::Detector;
pub use error::{Error, Result};
pub use exec::ExecPlan;
pub use installation::InstallationRecord;
pub use launch::{escape_shell_args, parse_hosts, split_launcher_args};
pub use python::{PipBinding, PythonBinding};
pub use registry::Registry;
pub use vendor::Vendor;
