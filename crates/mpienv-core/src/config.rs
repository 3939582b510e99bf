//! Directory layout and user settings.

use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

static INTERP_UNSAFE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9.]").unwrap());

/// Storage key for an interpreter: its path without the leading `/`, with
/// everything outside `[A-Za-z0-9.]` replaced by `_`.
pub fn interpreter_key(interpreter: &Path) -> String {
    let s = interpreter.to_string_lossy();
    let s = s.strip_prefix('/').unwrap_or(&s);
    INTERP_UNSAFE.replace_all(s, "_").into_owned()
}

/// Where mpienv keeps its state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MpienvEnv {
    root: PathBuf,
    versions: PathBuf,
    cache: PathBuf,
    build: PathBuf,
    interp_key: String,
}

impl MpienvEnv {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            versions: root.join("versions"),
            cache: root.join("cache"),
            build: root.join("builds"),
            interp_key: "python3".to_string(),
            root,
        }
    }

    pub fn versions_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.versions = dir.into();
        self
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache = dir.into();
        self
    }

    pub fn build_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.build = dir.into();
        self
    }

    pub fn interpreter(mut self, interpreter: &Path) -> Self {
        self.interp_key = interpreter_key(interpreter);
        self
    }

    /// Resolve the layout from `MPIENV_*` variables through `var`.
    ///
    /// `python` is resolved on the search path and canonicalized so that
    /// each real interpreter gets its own binding storage.
    pub fn from_vars(var: impl Fn(&str) -> Option<OsString>, python: &str) -> Result<Self> {
        let non_empty = |k: &str| var(k).filter(|v| !v.is_empty()).map(PathBuf::from);

        let root = match non_empty("MPIENV_ROOT") {
            Some(root) => root,
            None => mpienv_platform::dir::user_home()?.join(".mpienv"),
        };

        let mut env = Self::new(&root);
        if let Some(v) = non_empty("MPIENV_VERSIONS_DIR") {
            env = env.versions_dir(v);
        }
        if let Some(v) = non_empty("MPIENV_CACHE_DIR") {
            env = env.cache_dir(v);
        }
        if let Some(v) = non_empty("MPIENV_BUILD_DIR") {
            env = env.build_dir(v);
        }

        let interpreter = which::which(python)
            .ok()
            .and_then(|p| std::fs::canonicalize(p).ok())
            .unwrap_or_else(|| PathBuf::from(python));
        Ok(env.interpreter(&interpreter))
    }

    pub fn from_env(python: &str) -> Result<Self> {
        Self::from_vars(|k| std::env::var_os(k), python)
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [
            &self.root,
            &self.versions,
            &self.pylib_dir(),
            &self.pybuild_dir(),
            &self.cache,
            &self.build,
        ] {
            std::fs::create_dir_all(dir).map_err(|e| mpienv_fs::Error::Write {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn versions(&self) -> &Path {
        &self.versions
    }

    pub fn cache(&self) -> &Path {
        &self.cache
    }

    pub fn build(&self) -> &Path {
        &self.build
    }

    pub fn shims_dir(&self) -> PathBuf {
        self.versions.join("shims")
    }

    pub fn pylib_dir(&self) -> PathBuf {
        self.versions.join("pylib").join(&self.interp_key)
    }

    pub fn pybuild_dir(&self) -> PathBuf {
        self.versions.join("pybuild").join(&self.interp_key)
    }

    pub fn registry_file(&self) -> PathBuf {
        self.root.join("registry.toml")
    }

    pub fn lock_file(&self) -> PathBuf {
        self.root.join("registry.lock")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    /// Whether `path` lives in storage mpienv manages.
    pub fn manages(&self, path: &Path) -> bool {
        path.starts_with(&self.root) || path.starts_with(&self.versions)
    }
}

/// Contents of `<root>/config.toml`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub python: String,
    pub pip: Option<String>,
    pub binding_package: String,
    pub bind_python_by_default: bool,
    pub pip_verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            pip: None,
            binding_package: "mpi4py".to_string(),
            bind_python_by_default: true,
            pip_verbose: false,
        }
    }
}

impl Settings {
    /// Read `path`, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(Error::Read {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };
        toml::from_str(&text).map_err(|e| Error::SettingsFormat {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Apply `MPIENV_PIP_VERBOSE`.
    pub fn with_env_overrides(mut self, var: impl Fn(&str) -> Option<OsString>) -> Self {
        if var("MPIENV_PIP_VERBOSE").is_some_and(|v| !v.is_empty()) {
            self.pip_verbose = true;
        }
        self
    }

    /// The pip invocation as program plus leading arguments.
    pub fn pip_command(&self) -> Vec<String> {
        match &self.pip {
            Some(pip) => pip.split_whitespace().map(str::to_string).collect(),
            None => vec![self.python.clone(), "-m".to_string(), "pip".to_string()],
        }
    }
}
