//! Switching the active installation: shim rebuild, search-path derivation
//! and the binding package.

use crate::config::MpienvEnv;
use crate::installation::InstallationRecord;
use crate::python::{BuildEnv, PythonBinding};
use crate::registry::Registry;
use crate::vendor::Vendor;
use crate::{Error, Result};
use mpienv_platform::{CommandRunner, PathList, Shell};
use mpienv_shim::{Category, ShimBuilder, ShimReport};
use std::path::PathBuf;

/// One line of shell output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    Set(String, String),
    Unset(String),
}

impl Assignment {
    pub fn set(key: &str, value: impl Into<String>) -> Self {
        Assignment::Set(key.to_string(), value.into())
    }

    pub fn key(&self) -> &str {
        match self {
            Assignment::Set(k, _) | Assignment::Unset(k) => k,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Assignment::Set(_, v) => Some(v),
            Assignment::Unset(_) => None,
        }
    }

    pub fn render(&self, shell: Shell) -> String {
        match self {
            Assignment::Set(k, v) => shell.export(k, v),
            Assignment::Unset(k) => shell.unset(k),
        }
    }
}

/// The search paths of the shell that invoked mpienv.
#[derive(Debug, Clone, Default)]
pub struct InheritedEnv {
    pub path: PathList,
    pub ld_library_path: PathList,
    pub pythonpath: PathList,
}

impl InheritedEnv {
    pub fn from_process() -> Self {
        Self {
            path: PathList::from_var("PATH"),
            ld_library_path: PathList::from_var("LD_LIBRARY_PATH"),
            pythonpath: PathList::from_var("PYTHONPATH"),
        }
    }
}

/// Search paths with one installation in front.
#[derive(Debug, Clone)]
pub struct DerivedEnv {
    pub path: PathList,
    pub ld_library_path: PathList,
    pub pythonpath: PathList,
}

impl DerivedEnv {
    /// Put `record` first, dropping any directories of `previous`.
    ///
    /// `modules` are the binding directories to expose; every other entry
    /// under mpienv's own storage is stripped from the module path.
    pub fn derive(
        env: &MpienvEnv,
        record: &InstallationRecord,
        previous: Option<&InstallationRecord>,
        inherited: &InheritedEnv,
        modules: &[PathBuf],
    ) -> Self {
        let mut path = inherited.path.clone();
        let mut ld = inherited.ld_library_path.clone();
        if let Some(prev) = previous {
            path = path.remove(&prev.bin_dir());
            for dir in prev.library_dirs() {
                ld = ld.remove(&dir);
            }
        }
        path = path.prepend(record.bin_dir());
        for dir in record.library_dirs().into_iter().rev() {
            ld = ld.prepend(dir);
        }

        let mut pythonpath = inherited.pythonpath.clone().remove_where(|p| env.manages(p));
        for dir in modules.iter().rev() {
            pythonpath = pythonpath.prepend(dir.clone());
        }

        Self {
            path,
            ld_library_path: ld,
            pythonpath,
        }
    }

    pub fn assignments(&self, record: &InstallationRecord) -> Result<Vec<Assignment>> {
        let mut out = vec![
            Assignment::set("PATH", self.path.to_string_lossy()?),
            Assignment::set("LD_LIBRARY_PATH", self.ld_library_path.to_string_lossy()?),
        ];
        out.push(if self.pythonpath.is_empty() {
            Assignment::Unset("PYTHONPATH".to_string())
        } else {
            Assignment::set("PYTHONPATH", self.pythonpath.to_string_lossy()?)
        });
        out.push(Assignment::set("MPIENV_MPI_NAME", record.name.clone()));
        out.push(Assignment::set("MPIENV_MPI_TYPE", record.vendor.label()));
        out.push(Assignment::set("MPIENV_MPI_VERSION", record.version.clone()));
        Ok(out)
    }
}

#[derive(Debug, Clone)]
pub struct Activation {
    pub name: String,
    pub assignments: Vec<Assignment>,
    pub shim: ShimReport,
}

#[derive(Debug, Clone)]
pub enum Outcome {
    AlreadyActive(String),
    Activated(Activation),
}

impl Outcome {
    /// Shell text for the parent shell to evaluate; empty when nothing changed.
    pub fn render(&self, shell: Shell) -> String {
        match self {
            Outcome::AlreadyActive(_) => String::new(),
            Outcome::Activated(a) => a
                .assignments
                .iter()
                .map(|x| x.render(shell) + "\n")
                .collect(),
        }
    }
}

/// Rebuild the shim tree for `record` at `env.shims_dir()`.
pub fn rebuild_shim(env: &MpienvEnv, record: &InstallationRecord) -> Result<ShimReport> {
    let mut builder = ShimBuilder::new(env.shims_dir());
    for category in Category::ALL {
        let patterns = record.vendor.shim_patterns(category);
        if !patterns.is_empty() {
            builder = builder.mirror(category, record.category_dir(category), patterns)?;
        }
    }
    Ok(builder.build()?)
}

pub struct Activator<'a, R> {
    registry: &'a mut Registry<R>,
    binding: &'a dyn PythonBinding,
    inherited: InheritedEnv,
}

impl<'a, R: CommandRunner> Activator<'a, R> {
    pub fn new(
        registry: &'a mut Registry<R>,
        binding: &'a dyn PythonBinding,
        inherited: InheritedEnv,
    ) -> Self {
        Self {
            registry,
            binding,
            inherited,
        }
    }

    fn unchanged(&self, name: &str, bind_python: bool) -> bool {
        self.registry
            .active()
            .is_some_and(|a| a.name == name && a.python == bind_python)
            && self.registry.env().shims_dir().is_dir()
    }

    pub fn activate(&mut self, name: &str, bind_python: bool) -> Result<Outcome> {
        let record = self.registry.get(name)?;
        match record.vendor {
            Vendor::Broken => {
                return Err(Error::BrokenInstallation {
                    name: name.to_string(),
                });
            }
            Vendor::Unknown => {
                return Err(Error::UnknownMpiType {
                    path: record.launcher.clone(),
                });
            }
            _ => {}
        }

        if self.unchanged(name, bind_python) {
            tracing::debug!(name, "already active, nothing to do");
            return Ok(Outcome::AlreadyActive(name.to_string()));
        }

        let previous = self
            .registry
            .active()
            .filter(|a| a.name != name)
            .and_then(|a| self.registry.get(&a.name).ok());

        let env = self.registry.env().clone();
        let base = DerivedEnv::derive(&env, &record, previous.as_ref(), &self.inherited, &[]);
        let modules = if bind_python {
            if !self.binding.is_installed(name) {
                self.binding.install(
                    name,
                    BuildEnv {
                        path: &base.path,
                        ld_library_path: &base.ld_library_path,
                    },
                )?;
            }
            self.binding.module_path_for(name)
        } else {
            Vec::new()
        };
        let assignments = DerivedEnv::derive(
            &env,
            &record,
            previous.as_ref(),
            &self.inherited,
            &modules,
        )
        .assignments(&record)?;

        // The shim is swapped last; the persisted pointer must never name
        // anything but what the shim mirrors.
        let shim = rebuild_shim(&env, &record)?;
        if let Err(e) = self.registry.set_active(name, bind_python) {
            self.restore_shim(&env, previous.as_ref());
            return Err(e);
        }
        tracing::info!(name, python = bind_python, "activated");

        Ok(Outcome::Activated(Activation {
            name: name.to_string(),
            assignments,
            shim,
        }))
    }

    fn restore_shim(&self, env: &MpienvEnv, previous: Option<&InstallationRecord>) {
        let restored = match previous {
            Some(record) => rebuild_shim(env, record).map(|_| ()),
            None => std::fs::remove_dir_all(env.shims_dir()).map_err(Error::from),
        };
        if let Err(e) = restored {
            tracing::warn!(error = %e, "could not restore the previous shim");
        }
    }
}
