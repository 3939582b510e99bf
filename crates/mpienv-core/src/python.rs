//! Per-installation Python binding packages (mpi4py by default).

use crate::config::{MpienvEnv, Settings};
use crate::{Error, Result};
use mpienv_platform::{Command, CommandRunner, PathList, SystemRunner};
use std::path::{Path, PathBuf};

/// Search paths the binding must be built against.
#[derive(Debug, Clone, Copy)]
pub struct BuildEnv<'a> {
    pub path: &'a PathList,
    pub ld_library_path: &'a PathList,
}

/// Storage of a compiled binding package, keyed by installation name.
pub trait PythonBinding {
    fn is_installed(&self, name: &str) -> bool;

    fn install(&self, name: &str, env: BuildEnv<'_>) -> Result<()>;

    fn remove(&self, name: &str) -> Result<()>;

    fn rename(&self, name: &str, new_name: &str) -> Result<()>;

    fn module_path_for(&self, name: &str) -> Vec<PathBuf>;
}

/// Installs the binding with pip into `<pylib>/<name>`.
#[derive(Debug, Clone)]
pub struct PipBinding<R = SystemRunner> {
    runner: R,
    pip: Vec<String>,
    package: String,
    pylib: PathBuf,
    pybuild: PathBuf,
    verbose: bool,
}

impl<R: CommandRunner> PipBinding<R> {
    pub fn new(runner: R, env: &MpienvEnv, settings: &Settings) -> Self {
        Self {
            runner,
            pip: settings.pip_command(),
            package: settings.binding_package.clone(),
            pylib: env.pylib_dir(),
            pybuild: env.pybuild_dir(),
            verbose: settings.pip_verbose,
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    fn target(&self, name: &str) -> PathBuf {
        self.pylib.join(name)
    }

    fn command(&self, name: &str, env: BuildEnv<'_>) -> Result<Command> {
        let (program, leading) = self
            .pip
            .split_first()
            .ok_or_else(|| Error::ExternalCommand {
                program: "pip".to_string(),
                status: -1,
            })?;
        let build = self.pybuild.join(name);
        create_dir(&build)?;

        let mut cmd = Command::new(program)
            .args(leading)
            .args(["install", "--no-binary", ":all:", "-t"])
            .arg(self.target(name));
        if self.verbose {
            cmd = cmd.arg("-v");
        }
        Ok(cmd
            .arg(&self.package)
            .env("PATH", env.path.build()?)
            .env("LD_LIBRARY_PATH", env.ld_library_path.build()?)
            .env("TMPDIR", &build)
            .stdout_to_stderr())
    }
}

fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| {
        mpienv_fs::Error::Write {
            path: path.to_path_buf(),
            source: e,
        }
        .into()
    })
}

fn has_extension_module(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .any(|e| e.file_name().to_string_lossy().ends_with(".so"))
        })
        .unwrap_or(false)
}

impl<R: CommandRunner> PythonBinding for PipBinding<R> {
    fn is_installed(&self, name: &str) -> bool {
        has_extension_module(&self.target(name).join(&self.package))
    }

    fn install(&self, name: &str, env: BuildEnv<'_>) -> Result<()> {
        let target = self.target(name);
        create_dir(&target)?;
        eprintln!("Installing {} for {} ...", self.package, name);

        let cmd = self.command(name, env)?;
        let program = cmd.program().to_string();
        let status = self.runner.status(cmd)?;
        if status != 0 {
            return Err(Error::ExternalCommand { program, status });
        }
        tracing::info!(name, package = %self.package, "binding installed");
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        let target = self.target(name);
        if target.exists() {
            std::fs::remove_dir_all(&target)?;
            tracing::info!(name, "binding removed");
        }
        Ok(())
    }

    fn rename(&self, name: &str, new_name: &str) -> Result<()> {
        let from = self.target(name);
        if from.exists() {
            std::fs::rename(&from, self.target(new_name))?;
        }
        Ok(())
    }

    fn module_path_for(&self, name: &str) -> Vec<PathBuf> {
        vec![self.target(name)]
    }
}
