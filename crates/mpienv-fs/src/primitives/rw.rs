use crate::{Error, Result};
use std::fs;
use std::path::Path;

#[derive(Clone, Copy, Debug, Default)]
pub struct Options {
    pub permissions: Option<u32>,
    pub sync: bool,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn permissions(mut self, mode: u32) -> Self {
        self.permissions = Some(mode);
        self
    }

    pub fn sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }
}

/// Write `content` to a sibling temp file and rename it over `path`.
///
/// Readers see either the old or the new content, never a torn file.
pub fn atomic_write(path: impl AsRef<Path>, content: &[u8], options: Options) -> Result<()> {
    let path = path.as_ref();
    let parent = path
        .parent()
        .ok_or_else(|| Error::NoParent(path.to_path_buf()))?;
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::NoParent(path.to_path_buf()))?
        .to_string_lossy();

    let tmp_path = parent.join(format!(".{}.{}.tmp", file_name, std::process::id()));

    fs::write(&tmp_path, content).map_err(|e| Error::Write {
        path: tmp_path.clone(),
        source: e,
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Some(mode) = options.permissions {
            fs::set_permissions(&tmp_path, fs::Permissions::from_mode(mode)).map_err(|e| {
                Error::Write {
                    path: tmp_path.clone(),
                    source: e,
                }
            })?;
        }
    }

    if options.sync {
        let file = fs::File::open(&tmp_path).map_err(|e| Error::Write {
            path: tmp_path.clone(),
            source: e,
        })?;
        file.sync_all().map_err(|e| Error::Write {
            path: tmp_path.clone(),
            source: e,
        })?;
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        Error::Write {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.toml");
        atomic_write(&path, b"[installations]\n", Options::new()).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"[installations]\n");
    }

    #[test]
    fn test_atomic_write_replaces_and_leaves_no_temp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.toml");
        fs::write(&path, "old").unwrap();

        atomic_write(&path, b"new", Options::new().sync(true)).unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"new");
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_atomic_write_with_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("wrapper.sh");
        atomic_write(&path, b"#!/bin/sh\n", Options::new().permissions(0o744)).unwrap();
        let metadata = fs::metadata(&path).unwrap();
        assert_eq!(metadata.permissions().mode() & 0o777, 0o744);
    }
}
