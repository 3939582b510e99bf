//! Shell detection and rendering of environment assignments.

use crate::error::{Error, Result};
use query_shell::Shell as QueryShell;
use std::fmt;
use std::str::FromStr;

/// Shells whose syntax mpienv can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Sh,
    Fish,
}

impl Shell {
    pub const ALL: [Shell; 4] = [Shell::Bash, Shell::Zsh, Shell::Sh, Shell::Fish];

    /// Detect the parent shell, falling back to POSIX `sh` syntax.
    pub fn detect() -> Self {
        match query_shell::get_shell() {
            Ok(QueryShell::Bash) => Shell::Bash,
            Ok(QueryShell::Zsh) => Shell::Zsh,
            Ok(QueryShell::Fish) => Shell::Fish,
            Ok(_) => {
                tracing::debug!("unsupported shell, using sh syntax");
                Shell::Sh
            }
            Err(_) => Shell::Sh,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Shell::Bash => "bash",
            Shell::Zsh => "zsh",
            Shell::Sh => "sh",
            Shell::Fish => "fish",
        }
    }

    /// One line assigning `value` to the exported variable `key`.
    pub fn export(self, key: &str, value: &str) -> String {
        match self {
            Shell::Fish => format!("set -gx {key} {}", fish_quote(value)),
            _ => format!("export {key}={}", posix_quote(value)),
        }
    }

    pub fn unset(self, key: &str) -> String {
        match self {
            Shell::Fish => format!("set -e {key}"),
            _ => format!("unset {key}"),
        }
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Shell {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bash" => Ok(Shell::Bash),
            "zsh" => Ok(Shell::Zsh),
            "sh" | "dash" | "ash" | "ksh" => Ok(Shell::Sh),
            "fish" => Ok(Shell::Fish),
            _ => Err(Error::UnknownShell(s.to_string())),
        }
    }
}

pub fn posix_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

pub fn fish_quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', r"\\").replace('\'', r"\'"))
}
