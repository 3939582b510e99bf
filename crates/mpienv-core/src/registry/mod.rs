//! The durable name → installation mapping and the active pointer.
//!
//! Only launcher paths are persisted. Records are classified on first access
//! and cached for the life of the [`Registry`] value. Which installation is
//! "active" is decided by resolving `mpiexec` on a search path, never by a
//! stored flag; the persisted [`ActiveEntry`] only remembers what the last
//! `use` asked for.

mod store;

pub use store::{ActiveEntry, InstallationEntry, RegistryFile};

use crate::config::MpienvEnv;
use crate::detect::Detector;
use crate::installation::InstallationRecord;
use crate::python::PythonBinding;
use crate::{Error, Result};
use mpienv_platform::{CommandRunner, SystemRunner};
use mpienv_shim::SearchPathResolver;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

pub struct Registry<R = SystemRunner> {
    env: MpienvEnv,
    file: RegistryFile,
    detector: Detector<R>,
    resolver: SearchPathResolver,
    cache: RefCell<HashMap<String, InstallationRecord>>,
}

impl<R: CommandRunner> Registry<R> {
    /// Load the registry, creating directories and an empty file if needed.
    pub fn load(env: MpienvEnv, detector: Detector<R>, resolver: SearchPathResolver) -> Result<Self> {
        env.ensure_dirs()?;
        let path = env.registry_file();
        let file = RegistryFile::load(&path)?;
        if !path.exists() {
            file.save(&path)?;
        }
        tracing::debug!(path = %path.display(), entries = file.installations.len(), "registry loaded");
        Ok(Self {
            env,
            file,
            detector,
            resolver,
            cache: RefCell::new(HashMap::new()),
        })
    }

    pub fn env(&self) -> &MpienvEnv {
        &self.env
    }

    pub fn resolver(&self) -> &SearchPathResolver {
        &self.resolver
    }

    pub fn contains(&self, name: &str) -> bool {
        self.file.installations.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.file.installations.keys().map(String::as_str)
    }

    /// What the last successful `use` recorded.
    pub fn active(&self) -> Option<&ActiveEntry> {
        self.file.active.as_ref()
    }

    /// Persist `file` and only then make it the in-memory state.
    fn commit(&mut self, file: RegistryFile) -> Result<()> {
        file.save(&self.env.registry_file())?;
        self.file = file;
        Ok(())
    }

    /// Classify a registered launcher; failures degrade to `Unknown` so the
    /// entry stays listable and removable.
    fn load_record(&self, name: &str, launcher: &Path) -> InstallationRecord {
        match self.detector.classify(launcher) {
            Ok(record) => record.with_name(name),
            Err(e) => {
                tracing::warn!(name, launcher = %launcher.display(), error = %e, "could not classify registered MPI");
                InstallationRecord::unknown(launcher).with_name(name)
            }
        }
    }

    pub fn get(&self, name: &str) -> Result<InstallationRecord> {
        if let Some(record) = self.cache.borrow().get(name) {
            return Ok(record.clone());
        }
        let entry = self
            .file
            .installations
            .get(name)
            .ok_or_else(|| Error::UnknownInstallation {
                name: name.to_string(),
            })?;
        let record = self.load_record(name, &entry.launcher);
        self.cache
            .borrow_mut()
            .insert(name.to_string(), record.clone());
        Ok(record)
    }

    pub fn list(&self) -> Vec<InstallationRecord> {
        self.file
            .installations
            .keys()
            .filter_map(|name| self.get(name).ok())
            .collect()
    }

    pub fn is_active(&self, record: &InstallationRecord) -> bool {
        record.is_active(&self.resolver)
    }

    /// Name of the installation the search path currently resolves to.
    pub fn current_name(&self) -> Result<String> {
        self.list()
            .into_iter()
            .find(|r| self.is_active(r))
            .map(|r| r.name)
            .ok_or(Error::NoActiveInstallation)
    }

    fn managed_as(&self, target: &Path) -> Option<String> {
        let real = std::fs::canonicalize(target).ok()?;
        self.file
            .installations
            .iter()
            .find(|(_, entry)| std::fs::canonicalize(&entry.launcher).ok().as_ref() == Some(&real))
            .map(|(name, _)| name.clone())
    }

    /// Register a launcher, or an installation root containing `bin/mpiexec`.
    pub fn add(&mut self, target: &Path, name: Option<&str>) -> Result<String> {
        let target = if target.is_dir() {
            target.join("bin").join("mpiexec")
        } else {
            target.to_path_buf()
        };
        let target = std::path::absolute(&target)?;

        let record = self.detector.classify(&target)?;
        if record.is_broken() {
            return Err(Error::BrokenInstallation {
                name: target.display().to_string(),
            });
        }

        if let Some(existing) = self.managed_as(&target) {
            return Err(Error::AlreadyManaged {
                path: target,
                name: existing,
            });
        }

        let name = match name {
            Some(name) if self.contains(name) => {
                return Err(Error::NameCollision {
                    name: name.to_string(),
                    hint: "",
                });
            }
            Some(name) => name.to_string(),
            None if self.contains(&record.default_name) => {
                return Err(Error::NameCollision {
                    name: record.default_name,
                    hint: "; choose another name with -n",
                });
            }
            None => record.default_name.clone(),
        };
        validate_name(&name)?;

        let mut file = self.file.clone();
        file.installations.insert(
            name.clone(),
            InstallationEntry {
                launcher: target.clone(),
            },
        );
        self.commit(file)?;
        self.cache
            .borrow_mut()
            .insert(name.clone(), record.with_name(&name));
        tracing::info!(name = %name, launcher = %target.display(), "registered");
        Ok(name)
    }

    /// Forget `name`. The installation itself is left untouched.
    pub fn remove(&mut self, name: &str, binding: &dyn PythonBinding) -> Result<()> {
        let record = self.get(name)?;
        if !record.is_broken() && self.is_active(&record) {
            return Err(Error::ActiveInstallationRemoval {
                name: name.to_string(),
            });
        }

        // Storage goes first: an entry left behind by a failed removal
        // simply reinstalls its binding on the next `use`.
        binding.remove(name)?;
        let mut file = self.file.clone();
        file.installations.remove(name);
        if file.active.as_ref().is_some_and(|a| a.name == name) {
            file.active = None;
        }
        self.commit(file)?;
        self.cache.borrow_mut().remove(name);
        tracing::info!(name, "removed");
        Ok(())
    }

    pub fn rename(&mut self, from: &str, to: &str, binding: &dyn PythonBinding) -> Result<()> {
        if !self.contains(from) {
            return Err(Error::UnknownInstallation {
                name: from.to_string(),
            });
        }
        if self.contains(to) {
            return Err(Error::NameCollision {
                name: to.to_string(),
                hint: "",
            });
        }
        validate_name(to)?;

        let mut file = self.file.clone();
        if let Some(entry) = file.installations.remove(from) {
            file.installations.insert(to.to_string(), entry);
        }
        if let Some(active) = file.active.as_mut()
            && active.name == from
        {
            active.name = to.to_string();
        }

        binding.rename(from, to)?;
        if let Err(e) = self.commit(file) {
            if let Err(undo) = binding.rename(to, from) {
                tracing::warn!(from = to, to = from, error = %undo, "could not move python binding back");
            }
            return Err(e);
        }

        let cached = self.cache.borrow_mut().remove(from);
        if let Some(record) = cached {
            self.cache
                .borrow_mut()
                .insert(to.to_string(), record.with_name(to));
        }
        tracing::info!(from, to, "renamed");
        Ok(())
    }

    pub(crate) fn set_active(&mut self, name: &str, python: bool) -> Result<()> {
        let mut file = self.file.clone();
        file.active = Some(ActiveEntry {
            name: name.to_string(),
            python,
        });
        self.commit(file)
    }
}

/// Names key per-installation directories, so they must be a single plain
/// path component.
pub fn validate_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("it is empty")
    } else if name == "." || name == ".." {
        Some("it names a directory")
    } else if name.contains('/') {
        Some("it contains '/'")
    } else if name.contains('\0') {
        Some("it contains a NUL byte")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(Error::InvalidName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
