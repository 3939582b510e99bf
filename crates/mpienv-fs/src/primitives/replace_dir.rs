use crate::{Error, Result};
use std::path::{Path, PathBuf};

pub struct Options {
    pub retry_count: u32,
    pub retry_delay: std::time::Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            retry_count: 5,
            retry_delay: std::time::Duration::from_millis(100),
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    pub fn retry_delay(mut self, delay: std::time::Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

fn aside_path(dest: &Path) -> Result<PathBuf> {
    let parent = dest
        .parent()
        .ok_or_else(|| Error::NoParent(dest.to_path_buf()))?;
    let name = dest
        .file_name()
        .ok_or_else(|| Error::NoParent(dest.to_path_buf()))?
        .to_string_lossy();
    Ok(parent.join(format!(".{}.old.{}", name, std::process::id())))
}

/// Move `src` to `dest`, discarding any previous `dest` tree.
///
/// An existing `dest` is first renamed aside so the window in which `dest`
/// is missing is two renames wide; the old tree is deleted afterwards.
pub fn replace_dir(src: impl AsRef<Path>, dest: impl AsRef<Path>, options: Options) -> Result<()> {
    let src = src.as_ref();
    let dest = dest.as_ref();

    let aside = if std::fs::symlink_metadata(dest).is_ok() {
        let aside = aside_path(dest)?;
        if aside.exists() {
            let _ = std::fs::remove_dir_all(&aside);
        }
        std::fs::rename(dest, &aside).map_err(|e| Error::ReplaceDir {
            path: dest.to_path_buf(),
            source: e,
        })?;
        Some(aside)
    } else {
        None
    };

    let mut attempts = 0;
    loop {
        match std::fs::rename(src, dest) {
            Ok(()) => break,
            Err(e) => {
                attempts += 1;
                if attempts >= options.retry_count {
                    if let Some(aside) = &aside {
                        let _ = std::fs::rename(aside, dest);
                    }
                    return Err(Error::ReplaceDir {
                        path: dest.to_path_buf(),
                        source: e,
                    });
                }
                tracing::debug!(attempt = attempts, dest = %dest.display(), "retrying directory swap");
                std::thread::sleep(options.retry_delay * attempts);
            }
        }
    }

    if let Some(aside) = aside
        && let Err(e) = std::fs::remove_dir_all(&aside)
    {
        tracing::warn!(path = %aside.display(), error = %e, "failed to remove replaced directory");
    }

    Ok(())
}
