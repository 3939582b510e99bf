use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("'{name}' seems to be broken; its launcher no longer exists")]
    BrokenInstallation { name: String },

    #[error("unknown MPI type: '{}'", path.display())]
    UnknownMpiType { path: PathBuf },

    #[error("name '{name}' is already taken{hint}")]
    NameCollision { name: String, hint: &'static str },

    #[error("'{}' is already managed as '{name}'", path.display())]
    AlreadyManaged { path: PathBuf, name: String },

    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("cannot remove the active MPI '{name}'")]
    ActiveInstallationRemoval { name: String },

    #[error("no MPI is active")]
    NoActiveInstallation,

    #[error("{flag} needs an argument")]
    MalformedLaunchArgs { flag: String },

    #[error("unknown MPI installation: '{name}'")]
    UnknownInstallation { name: String },

    #[error("could not find '{field}' in the output of '{}'", path.display())]
    Parse { path: PathBuf, field: &'static str },

    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{program} exited with status {status}")]
    ExternalCommand { program: String, status: i32 },

    #[error("invalid registry file '{}': {source}", path.display())]
    RegistryFormat {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid settings file '{}': {source}", path.display())]
    SettingsFormat {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Fs(#[from] mpienv_fs::Error),

    #[error(transparent)]
    Platform(#[from] mpienv_platform::Error),

    #[error(transparent)]
    Shim(#[from] mpienv_shim::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this is the expected "nothing active yet" state rather than a failure.
    pub fn is_no_active(&self) -> bool {
        matches!(self, Error::NoActiveInstallation)
    }
}
