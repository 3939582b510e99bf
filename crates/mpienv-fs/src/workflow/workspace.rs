use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// A staging directory that becomes `destination` on [`Workspace::commit`].
///
/// Dropping an uncommitted workspace removes the staging tree, so a failed
/// rebuild never leaves a half-populated destination behind.
pub struct Workspace {
    staging_path: PathBuf,
    destination_path: PathBuf,
    committed: bool,
}

impl Workspace {
    pub fn new(staging_dir: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<Self> {
        let staging_path = staging_dir.as_ref().to_path_buf();
        let destination_path = destination.as_ref().to_path_buf();

        if staging_path.exists() {
            std::fs::remove_dir_all(&staging_path).map_err(|e| Error::Write {
                path: staging_path.clone(),
                source: e,
            })?;
        }
        std::fs::create_dir_all(&staging_path).map_err(|e| Error::Write {
            path: staging_path.clone(),
            source: e,
        })?;

        Ok(Self {
            staging_path,
            destination_path,
            committed: false,
        })
    }

    /// Stage next to `destination` as `.<name>.staging`.
    pub fn beside(destination: impl AsRef<Path>) -> Result<Self> {
        let destination = destination.as_ref();
        let parent = destination
            .parent()
            .ok_or_else(|| Error::NoParent(destination.to_path_buf()))?;
        let name = destination
            .file_name()
            .ok_or_else(|| Error::NoParent(destination.to_path_buf()))?
            .to_string_lossy();
        Self::new(parent.join(format!(".{name}.staging")), destination)
    }

    pub fn path(&self) -> &Path {
        &self.staging_path
    }

    pub fn destination(&self) -> &Path {
        &self.destination_path
    }

    pub fn create_dir(&self, rel: impl AsRef<Path>) -> Result<PathBuf> {
        let path = self.staging_path.join(rel);
        std::fs::create_dir_all(&path).map_err(|e| Error::Write {
            path: path.clone(),
            source: e,
        })?;
        Ok(path)
    }

    pub fn commit(mut self) -> Result<()> {
        crate::primitives::replace_dir(
            &self.staging_path,
            &self.destination_path,
            Default::default(),
        )?;
        self.committed = true;
        tracing::debug!(dest = %self.destination_path.display(), "workspace committed");
        Ok(())
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_dir_all(&self.staging_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_workspace() {
        let dir = tempdir().unwrap();
        let staging = dir.path().join("staging");
        let dest = dir.path().join("dest");
        let workspace = Workspace::new(&staging, &dest).unwrap();
        let bin = workspace.create_dir("bin").unwrap();
        std::fs::write(bin.join("mpiexec"), "").unwrap();
        workspace.commit().unwrap();
        assert!(dest.join("bin/mpiexec").exists());
        assert!(!staging.exists());
    }

    #[test]
    fn test_workspace_cleanup_on_drop() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("shims");
        let staging;
        {
            let workspace = Workspace::beside(&dest).unwrap();
            staging = workspace.path().to_path_buf();
            std::fs::write(staging.join("file.txt"), "data").unwrap();
            assert!(staging.exists());
        }
        assert!(!staging.exists());
        assert!(!dest.exists());
    }

    #[test]
    fn test_workspace_clears_stale_staging() {
        let dir = tempdir().unwrap();
        let staging = dir.path().join("staging");
        std::fs::create_dir_all(&staging).unwrap();
        std::fs::write(staging.join("leftover"), "").unwrap();

        let workspace = Workspace::new(&staging, dir.path().join("dest")).unwrap();
        assert!(!workspace.path().join("leftover").exists());
    }
}
