use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Create `link` pointing at `target`, replacing whatever `link` was.
///
/// The link is created under a temporary name first and renamed into place.
#[cfg(unix)]
pub fn atomic_symlink(target: impl AsRef<Path>, link: impl AsRef<Path>) -> Result<()> {
    let target = target.as_ref();
    let link = link.as_ref();

    let file_name = link
        .file_name()
        .ok_or_else(|| Error::NoParent(link.to_path_buf()))?
        .to_string_lossy();
    let parent = link
        .parent()
        .ok_or_else(|| Error::NoParent(link.to_path_buf()))?;
    let tmp_link = parent.join(format!(".{}.{}.lnk", file_name, std::process::id()));

    let _ = std::fs::remove_file(&tmp_link);
    std::os::unix::fs::symlink(target, &tmp_link).map_err(|e| Error::Symlink {
        target: target.to_path_buf(),
        link: link.to_path_buf(),
        source: e,
    })?;
    std::fs::rename(&tmp_link, link).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_link);
        Error::Symlink {
            target: target.to_path_buf(),
            link: link.to_path_buf(),
            source: e,
        }
    })
}

/// The file a link ultimately refers to; plain files and directories map to themselves.
///
/// Used so that mirrored links never point at other links.
pub fn real_target(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let meta = std::fs::symlink_metadata(path).map_err(|e| Error::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    if meta.file_type().is_symlink() {
        std::fs::canonicalize(path).map_err(|e| Error::Read {
            path: path.to_path_buf(),
            source: e,
        })
    } else {
        Ok(path.to_path_buf())
    }
}
