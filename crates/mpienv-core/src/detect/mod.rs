//! Classification of a launcher binary into an [`InstallationRecord`].
//!
//! Detection only reads: it runs the launcher (and for Open MPI its
//! `ompi_info`) through a [`CommandRunner`] and reads header files. It never
//! touches mpienv's own state.

pub mod hydra;
pub mod ompi;

use crate::installation::InstallationRecord;
use crate::vendor::Vendor;
use crate::{Error, Result};
use mpienv_platform::{Command, CommandRunner, SystemRunner};
use ompi::OmpiInfo;
use std::path::Path;

const OPEN_MPI_MARKERS: &[&str] = &["OpenRTE", "(Open MPI)"];
const HYDRA_MARKER: &str = "HYDRA";

#[derive(Debug, Clone, Default)]
pub struct Detector<R = SystemRunner> {
    runner: R,
}

impl<R: CommandRunner> Detector<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Probe `launcher`. A missing file or dangling link yields a broken
    /// record rather than an error.
    pub fn classify(&self, launcher: &Path) -> Result<InstallationRecord> {
        if !launcher.exists() {
            tracing::debug!(launcher = %launcher.display(), "launcher missing");
            return Ok(InstallationRecord::broken(launcher));
        }

        let output = match self
            .runner
            .capture(Command::new(launcher).arg("--version"))
        {
            Ok(output) => output,
            Err(mpienv_platform::Error::CommandNotFound { .. }) => {
                return Ok(InstallationRecord::broken(launcher));
            }
            Err(e) => return Err(e.into()),
        };
        let text = output.combined();

        if OPEN_MPI_MARKERS.iter().any(|m| text.contains(m)) {
            self.classify_open_mpi(launcher)
        } else if text.contains(HYDRA_MARKER) {
            classify_hydra(launcher, &text)
        } else {
            tracing::debug!(launcher = %launcher.display(), output = %text, "no vendor marker");
            Err(Error::UnknownMpiType {
                path: launcher.to_path_buf(),
            })
        }
    }

    fn classify_open_mpi(&self, launcher: &Path) -> Result<InstallationRecord> {
        let ompi_info = launcher
            .parent()
            .map(|dir| dir.join("ompi_info"))
            .unwrap_or_else(|| "ompi_info".into());
        let output = self
            .runner
            .capture(Command::new(&ompi_info).args(["--all", "--parsable"]))?;
        let info = OmpiInfo::parse(&output.stdout);

        let version = info
            .text("ompi:version:full")
            .ok_or_else(|| Error::Parse {
                path: ompi_info.clone(),
                field: "ompi:version:full",
            })?
            .to_string();

        let mut record = InstallationRecord::detected(launcher, Vendor::OpenMpi, version);
        record.base_version = info.text("mpi-api:version:full").map(str::to_string);
        record.features = info.enabled_options();
        tracing::debug!(launcher = %launcher.display(), version = %record.version, "detected Open MPI");
        Ok(record)
    }
}

fn classify_hydra(launcher: &Path, text: &str) -> Result<InstallationRecord> {
    let parse_err = |field| Error::Parse {
        path: launcher.to_path_buf(),
        field,
    };
    let version = hydra::version(text).ok_or_else(|| parse_err("Version"))?;
    let options = hydra::configure_options(text).ok_or_else(|| parse_err("Configure options"))?;

    let header = hydra::header_candidates(&options, launcher)
        .into_iter()
        .find(|p| p.is_file());

    let record = match header {
        Some(header) => {
            let content = std::fs::read_to_string(&header).map_err(|e| Error::Read {
                path: header.clone(),
                source: e,
            })?;
            if content.contains(hydra::MVAPICH_MARKER) {
                let version = hydra::mvapich_version(&content).ok_or_else(|| Error::Parse {
                    path: header.clone(),
                    field: "MVAPICH2_VERSION",
                })?;
                let mpich = hydra::mpich_version(&content).ok_or_else(|| Error::Parse {
                    path: header.clone(),
                    field: "MPICH_VERSION",
                })?;
                let mut record = InstallationRecord::detected(launcher, Vendor::Mvapich, version);
                record.base_version = Some(mpich);
                record
            } else {
                InstallationRecord::detected(launcher, Vendor::Mpich, version)
            }
        }
        None => {
            tracing::debug!(launcher = %launcher.display(), "no mpi.h found, assuming MPICH");
            InstallationRecord::detected(launcher, Vendor::Mpich, version)
        }
    };

    tracing::debug!(
        launcher = %launcher.display(),
        vendor = %record.vendor,
        version = %record.version,
        "detected hydra launcher"
    );
    Ok(InstallationRecord {
        configure_options: options,
        ..record
    })
}
