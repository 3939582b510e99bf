use crate::{Error, Result};
use fs2::FileExt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Exclusive advisory lock on a file, held until drop.
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    fn open(path: &Path) -> Result<File> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| Error::Write {
                path: path.to_path_buf(),
                source: e,
            })
    }

    /// Block until the lock is available.
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = Self::open(&path)?;
        file.lock_exclusive().map_err(|e| Error::Lock {
            path: path.clone(),
            source: e,
        })?;
        tracing::trace!(path = %path.display(), "lock acquired");
        Ok(Self { file, path })
    }

    pub fn try_acquire(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = Self::open(&path)?;
        file.try_lock_exclusive().map_err(|e| Error::Lock {
            path: path.clone(),
            source: e,
        })?;
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_lock_excludes_second_holder() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.lock");
        let held = FileLock::acquire(&path).unwrap();
        assert_eq!(held.path(), path);

        assert!(FileLock::try_acquire(&path).is_err());
        drop(held);
        assert!(FileLock::try_acquire(&path).is_ok());
    }

    #[test]
    fn test_lock_creates_parent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/root/registry.lock");
        let _lock = FileLock::acquire(&path).unwrap();
        assert!(path.exists());
    }
}
