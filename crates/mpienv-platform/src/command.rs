use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command as StdCommand, Output, Stdio};

#[derive(Debug)]
pub struct Command {
    inner: StdCommand,
    program: String,
}

impl Command {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        let program = program.as_ref();
        Self {
            inner: StdCommand::new(program),
            program: program.to_string_lossy().into_owned(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.inner.arg(arg);
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.inner.args(args);
        self
    }

    pub fn env<K, V>(mut self, key: K, val: V) -> Self
    where
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        self.inner.env(key, val);
        self
    }

    /// Send the child's stdout to our stderr so stdout stays shell-evaluable.
    pub fn stdout_to_stderr(mut self) -> Self {
        self.inner.stdout(Stdio::from(std::io::stderr()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> Vec<String> {
        self.inner
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    pub fn env_value(&self, key: &str) -> Option<String> {
        self.inner
            .get_envs()
            .find(|(k, _)| *k == OsStr::new(key))
            .and_then(|(_, v)| v.map(|v| v.to_string_lossy().into_owned()))
    }

    /// Program and arguments joined by spaces, for display only.
    pub fn to_command_line(&self) -> String {
        std::iter::once(self.program.clone())
            .chain(self.arguments())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn map_spawn_error(&self, e: std::io::Error) -> Error {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::CommandNotFound {
                cmd: self.program.clone(),
            }
        } else {
            Error::CommandFailed {
                cmd: self.program.clone(),
                source: e,
            }
        }
    }

    pub fn capture(mut self) -> Result<Output> {
        tracing::debug!(cmd = %self.to_command_line(), "capturing");
        self.inner
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.map_spawn_error(e))
    }

    /// Run with inherited stdio and return the exit code (`-1` when killed by a signal).
    pub fn status(mut self) -> Result<i32> {
        tracing::debug!(cmd = %self.to_command_line(), "running");
        let status = self.inner.status().map_err(|e| self.map_spawn_error(e))?;
        Ok(status.code().unwrap_or(-1))
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Stdout followed by stderr.
    pub fn combined(&self) -> String {
        let mut text = self.stdout.clone();
        text.push_str(&self.stderr);
        text
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// The external-process boundary. Probing and installing go through this
/// trait so they can be exercised without real binaries.
pub trait CommandRunner {
    fn capture(&self, command: Command) -> Result<CommandOutput>;

    fn status(&self, command: Command) -> Result<i32>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn capture(&self, command: Command) -> Result<CommandOutput> {
        command.capture().map(CommandOutput::from)
    }

    fn status(&self, command: Command) -> Result<i32> {
        command.status()
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn capture(&self, command: Command) -> Result<CommandOutput> {
        (**self).capture(command)
    }

    fn status(&self, command: Command) -> Result<i32> {
        (**self).status(command)
    }
}

/// Whether `path` exists and has an execute bit set.
pub fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path)
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}
