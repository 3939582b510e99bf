use mpienv_shim::Category;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// The MPI families mpienv knows, plus the two states a registered
/// launcher can fall into when it cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Vendor {
    Mpich,
    Mvapich,
    OpenMpi,
    Unknown,
    Broken,
}

impl Vendor {
    pub fn label(self) -> &'static str {
        match self {
            Vendor::Mpich => "MPICH",
            Vendor::Mvapich => "MVAPICH",
            Vendor::OpenMpi => "Open MPI",
            Vendor::Unknown => "Unknown",
            Vendor::Broken => "Broken",
        }
    }

    /// Suggested registry key for a detected version.
    pub fn default_name(self, version: &str) -> String {
        match self {
            Vendor::Mpich => format!("mpich-{version}"),
            Vendor::Mvapich => format!("mvapich2-{version}"),
            Vendor::OpenMpi => format!("openmpi-{version}"),
            Vendor::Unknown => format!("unknown-{version}"),
            Vendor::Broken => format!("broken-{version}"),
        }
    }

    pub fn is_usable(self) -> bool {
        matches!(self, Vendor::Mpich | Vendor::Mvapich | Vendor::OpenMpi)
    }

    /// File-name patterns mirrored into the shim for `category`.
    pub fn shim_patterns(self, category: Category) -> &'static [&'static str] {
        const HYDRA_BIN: &[&str] = &["hydra_*", "mpi*", "parkill"];
        const HYDRA_LIB: &[&str] = &["lib*mpi*.*", "lib*mpl*.*", "libopa.*"];
        const HYDRA_INCLUDE: &[&str] = &["mpi*.h", "mpi*.mod", "opa*.h", "primitives"];

        match (self, category) {
            (Vendor::Mpich | Vendor::Mvapich, Category::Bin) => HYDRA_BIN,
            (Vendor::Mpich | Vendor::Mvapich, Category::Lib) => HYDRA_LIB,
            (Vendor::Mpich | Vendor::Mvapich, Category::Include) => HYDRA_INCLUDE,
            (Vendor::Mvapich, Category::Libexec) => &["osu-micro-benchmarks"],
            (Vendor::OpenMpi, Category::Bin) => &["mpi*", "ompi-*", "ompi_*", "orte*", "opal_*"],
            (Vendor::OpenMpi, Category::Lib) => &[
                "libmpi*",
                "libmca*",
                "libompi*",
                "libopen-pal*",
                "libopen-rte*",
                "openmpi",
                "pkgconfig",
            ],
            (Vendor::OpenMpi, Category::Include) => &["mpi*.h", "openmpi"],
            _ => &[],
        }
    }

    /// Arguments placed right after the launcher so that the wrapper
    /// script's environment reaches every rank.
    pub fn launch_args(self, prefix: &Path) -> Vec<String> {
        match self {
            Vendor::Mpich | Vendor::Mvapich => vec![
                "-genvlist".to_string(),
                "PYTHONPATH,PATH,LD_LIBRARY_PATH".to_string(),
            ],
            Vendor::OpenMpi => {
                let mut args = vec!["-prefix".to_string(), prefix.display().to_string()];
                for var in ["PYTHONPATH", "PATH", "LD_LIBRARY_PATH"] {
                    args.push("-x".to_string());
                    args.push(var.to_string());
                }
                args
            }
            Vendor::Unknown | Vendor::Broken => Vec::new(),
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
