//! Running a program under the active installation through a generated
//! wrapper script.

use crate::activate::{DerivedEnv, InheritedEnv};
use crate::installation::InstallationRecord;
use crate::launch::{escape_shell_args, is_local_host, parse_hosts, split_launcher_args};
use crate::python::PythonBinding;
use crate::registry::Registry;
use crate::{Error, Result};
use chrono::{DateTime, Local};
use mpienv_fs::{atomic_write, AtomicWriteOptions};
use mpienv_platform::shell::posix_quote;
use mpienv_platform::{Command, CommandRunner, PathList};
use std::path::{Path, PathBuf};

const SCRIPT_DIR: &str = "/tmp";
const INTERPRETERS: &[&str] = &["/bin/bash", "/bin/ash", "/bin/sh"];

/// `<dir>/<host>.<pid>.<timestamp>.mpienv.sh`, with the pid zero-padded to five digits.
pub fn script_name(dir: &Path, host: &str, pid: u32, now: DateTime<Local>) -> PathBuf {
    dir.join(format!(
        "{host}.{pid:05}.{}.mpienv.sh",
        now.format("%Y%m%d%H%M%S")
    ))
}

fn hostname() -> String {
    nix::unistd::gethostname()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "localhost".to_string())
}

fn interpreter() -> &'static str {
    INTERPRETERS
        .iter()
        .copied()
        .find(|p| Path::new(p).exists())
        .unwrap_or("/bin/sh")
}

#[derive(Debug, Clone)]
pub struct ExecPlan {
    pub record: InstallationRecord,
    pub hosts: Vec<String>,
    pub launcher_args: Vec<String>,
    pub program: Vec<String>,
    pub script_path: PathBuf,
    pub script: String,
    pub python_bound: bool,
    ld_library_path: PathList,
}

impl ExecPlan {
    /// Resolve the active installation and prepare the launch of `tokens`.
    ///
    /// Nothing is written; malformed arguments fail here.
    pub fn prepare<R: CommandRunner, S: AsRef<str>>(
        registry: &Registry<R>,
        binding: &dyn PythonBinding,
        inherited: &InheritedEnv,
        tokens: &[S],
    ) -> Result<Self> {
        let name = registry.current_name()?;
        let record = registry.get(&name)?;

        let hosts = parse_hosts(tokens)?;
        let (launcher_args, program) = split_launcher_args(tokens)?;
        if program.is_empty() {
            return Err(Error::MalformedLaunchArgs {
                flag: "exec".to_string(),
            });
        }

        let python_bound = registry
            .active()
            .is_some_and(|a| a.name == name && a.python);
        let modules = if python_bound {
            binding.module_path_for(&name)
        } else {
            Vec::new()
        };
        let derived = DerivedEnv::derive(registry.env(), &record, None, inherited, &modules);

        let script_path = script_name(
            Path::new(SCRIPT_DIR),
            &hostname(),
            std::process::id(),
            Local::now(),
        );
        let script = render_script(
            registry.env().root(),
            &record,
            &derived,
            &program,
            &script_path,
        )?;

        let prefix = record.prefix();
        let ld_library_path = inherited
            .ld_library_path
            .clone()
            .append(prefix.join("lib"))
            .append(prefix.join("lib64"));

        Ok(Self {
            record,
            hosts,
            launcher_args,
            program,
            script_path,
            script,
            python_bound,
            ld_library_path,
        })
    }

    /// True when the program looks like a Python interpreter but no binding is active.
    pub fn missing_python_binding(&self) -> bool {
        let looks_like_python = self
            .program
            .first()
            .and_then(|p| Path::new(p).file_name())
            .is_some_and(|f| f.to_string_lossy().starts_with("python"));
        looks_like_python && !self.python_bound
    }

    pub fn remote_hosts(&self) -> impl Iterator<Item = &str> {
        self.hosts
            .iter()
            .map(String::as_str)
            .filter(|h| !is_local_host(h))
    }

    pub fn command(&self) -> Result<Command> {
        Ok(Command::new(&self.record.launcher)
            .args(self.record.vendor.launch_args(&self.record.prefix()))
            .args(&self.launcher_args)
            .arg(&self.script_path)
            .env("LD_LIBRARY_PATH", self.ld_library_path.build()?))
    }

    pub fn write_script(&self) -> Result<()> {
        atomic_write(
            &self.script_path,
            self.script.as_bytes(),
            AtomicWriteOptions::new().permissions(0o744),
        )?;
        Ok(())
    }

    fn copy_script(&self, runner: &impl CommandRunner) -> Result<()> {
        for host in self.remote_hosts() {
            let dest = format!("{host}:{}", self.script_path.display());
            let status = runner.status(Command::new("scp").arg(&self.script_path).arg(dest))?;
            if status != 0 {
                return Err(Error::ExternalCommand {
                    program: "scp".to_string(),
                    status,
                });
            }
            tracing::debug!(host, "wrapper script copied");
        }
        Ok(())
    }

    /// Write and distribute the wrapper, then run the launcher to completion.
    pub fn run(&self, runner: &impl CommandRunner) -> Result<i32> {
        self.write_script()?;
        self.copy_script(runner)?;
        let status = runner.status(self.command()?)?;
        tracing::debug!(status, "launcher finished");
        Ok(status)
    }
}

fn render_script(
    root: &Path,
    record: &InstallationRecord,
    env: &DerivedEnv,
    program: &[String],
    script_path: &Path,
) -> Result<String> {
    let path = env.path.to_string_lossy()?;
    let ld_library_path = env.ld_library_path.to_string_lossy()?;
    let pythonpath = env.pythonpath.to_string_lossy()?;
    let lines = [
        format!("#!{}", interpreter()),
        String::new(),
        format!("export MPIENV_HOME={}", posix_quote(&root.to_string_lossy())),
        String::new(),
        format!("export PATH={}", posix_quote(&path)),
        String::new(),
        format!("export LD_LIBRARY_PATH={}", posix_quote(&ld_library_path)),
        String::new(),
        format!("export PYTHONPATH={}", posix_quote(&pythonpath)),
        String::new(),
        format!("export MPIENV_MPI_TYPE={}", posix_quote(record.vendor.label())),
        format!("export MPIENV_MPI_VERSION={}", posix_quote(&record.version)),
        format!("export MPIENV_MPI_NAME={}", posix_quote(&record.name)),
        String::new(),
        escape_shell_args(program).join(" "),
        format!("rm -f {}", posix_quote(&script_path.to_string_lossy())),
    ];
    let mut script = lines.join("\n");
    script.push('\n');
    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_script_name() {
        let now = Local.with_ymd_and_hms(2017, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            script_name(Path::new("/tmp"), "node01", 42, now),
            Path::new("/tmp/node01.00042.20170309140507.mpienv.sh")
        );
    }

    #[test]
    fn test_interpreter_exists() {
        assert!(INTERPRETERS.contains(&interpreter()));
    }
}
