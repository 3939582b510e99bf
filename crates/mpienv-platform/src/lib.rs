pub use error::{Error, Result};

pub mod command;
pub mod dir;
pub mod env;
mod error;
pub mod shell;

pub use command::{Command, CommandOutput, CommandRunner, SystemRunner};
pub use env::PathList;
pub use shell::Shell;
