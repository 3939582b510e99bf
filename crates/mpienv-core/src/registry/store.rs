//! On-disk form of the registry.

use crate::{Error, Result};
use mpienv_fs::{atomic_write, AtomicWriteOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEntry {
    pub name: String,
    #[serde(default)]
    pub python: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationEntry {
    pub launcher: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<ActiveEntry>,
    #[serde(default)]
    pub installations: BTreeMap<String, InstallationEntry>,
}

impl RegistryFile {
    /// Read `path`; a missing file is an empty registry.
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
        toml::from_str(&text).map_err(|e| Error::RegistryFormat {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self)?;
        atomic_write(path, text.as_bytes(), AtomicWriteOptions::new().sync(true))?;
        tracing::debug!(path = %path.display(), entries = self.installations.len(), "registry saved");
        Ok(())
    }
}
