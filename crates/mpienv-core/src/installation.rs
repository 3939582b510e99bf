use crate::vendor::Vendor;
use mpienv_shim::{Category, TargetResolver};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One registered MPI toolchain.
///
/// Directories are derived from the launcher path rather than stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallationRecord {
    pub name: String,
    pub launcher: PathBuf,
    pub vendor: Vendor,
    pub version: String,
    pub configure_options: Vec<String>,
    /// MPI-API version for Open MPI, underlying MPICH version for MVAPICH.
    pub base_version: Option<String>,
    /// Enabled `ompi_info` options; empty for the Hydra family.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    pub default_name: String,
}

impl InstallationRecord {
    pub(crate) fn detected(launcher: &Path, vendor: Vendor, version: String) -> Self {
        let default_name = vendor.default_name(&version);
        Self {
            name: default_name.clone(),
            launcher: launcher.to_path_buf(),
            vendor,
            version,
            configure_options: Vec::new(),
            base_version: None,
            features: Vec::new(),
            default_name,
        }
    }

    pub(crate) fn unusable(launcher: &Path, vendor: Vendor) -> Self {
        let name = launcher.display().to_string();
        Self {
            name: name.clone(),
            launcher: launcher.to_path_buf(),
            vendor,
            version: String::new(),
            configure_options: Vec::new(),
            base_version: None,
            features: Vec::new(),
            default_name: name,
        }
    }

    pub fn broken(launcher: &Path) -> Self {
        Self::unusable(launcher, Vendor::Broken)
    }

    pub fn unknown(launcher: &Path) -> Self {
        Self::unusable(launcher, Vendor::Unknown)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn is_broken(&self) -> bool {
        self.vendor == Vendor::Broken
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.launcher
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    pub fn prefix(&self) -> PathBuf {
        let bin = self.bin_dir();
        bin.parent().map(Path::to_path_buf).unwrap_or(bin)
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.prefix().join("lib")
    }

    pub fn include_dir(&self) -> PathBuf {
        self.prefix().join("include")
    }

    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.prefix().join(category.dir_name())
    }

    /// `lib64` then `lib`, whichever exist.
    pub fn library_dirs(&self) -> Vec<PathBuf> {
        ["lib64", "lib"]
            .into_iter()
            .map(|d| self.prefix().join(d))
            .filter(|d| d.is_dir())
            .collect()
    }

    fn sibling_tool(&self, tool: &str) -> PathBuf {
        let file_name = self
            .launcher
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = if file_name.contains("mpiexec") {
            file_name.replace("mpiexec", tool)
        } else {
            tool.to_string()
        };
        self.bin_dir().join(name)
    }

    pub fn mpicc(&self) -> PathBuf {
        self.sibling_tool("mpicc")
    }

    pub fn mpicxx(&self) -> PathBuf {
        self.sibling_tool("mpicxx")
    }

    /// The launcher with all links followed, if it still exists.
    pub fn real_launcher(&self) -> Option<PathBuf> {
        std::fs::canonicalize(&self.launcher).ok()
    }

    /// True iff a shell would run this installation's launcher for `mpiexec`.
    pub fn is_active(&self, resolver: &impl TargetResolver) -> bool {
        if self.is_broken() {
            return false;
        }
        let Some(ours) = self.real_launcher() else {
            return false;
        };
        resolver
            .resolve("mpiexec")
            .and_then(|p| std::fs::canonicalize(p).ok())
            .is_some_and(|theirs| theirs == ours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(launcher: &str) -> InstallationRecord {
        InstallationRecord::detected(Path::new(launcher), Vendor::Mpich, "3.2".into())
    }

    #[test]
    fn test_derived_dirs() {
        let r = record("/opt/mpich-3.2/bin/mpiexec");
        assert_eq!(r.bin_dir(), Path::new("/opt/mpich-3.2/bin"));
        assert_eq!(r.prefix(), Path::new("/opt/mpich-3.2"));
        assert_eq!(r.lib_dir(), Path::new("/opt/mpich-3.2/lib"));
        assert_eq!(r.include_dir(), Path::new("/opt/mpich-3.2/include"));
        assert_eq!(r.category_dir(Category::Libexec), Path::new("/opt/mpich-3.2/libexec"));
        assert_eq!(r.name, "mpich-3.2");
    }

    #[test]
    fn test_compiler_paths() {
        let r = record("/opt/mpich/bin/mpiexec.hydra");
        assert_eq!(r.mpicc(), Path::new("/opt/mpich/bin/mpicc.hydra"));
        let r = record("/opt/ompi/bin/mpirun");
        assert_eq!(r.mpicxx(), Path::new("/opt/ompi/bin/mpicxx"));
    }

    #[test]
    fn test_broken_is_never_active() {
        struct Everything;
        impl TargetResolver for Everything {
            fn resolve(&self, _: &str) -> Option<PathBuf> {
                Some(PathBuf::from("/"))
            }
        }
        let r = InstallationRecord::broken(Path::new("/"));
        assert!(r.is_broken());
        assert!(!r.is_active(&Everything));
    }
}
