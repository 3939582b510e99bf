//! Editing of colon-separated search paths (`PATH`, `LD_LIBRARY_PATH`, ...).

use crate::error::{Error, Result};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

fn paths_equal(p1: &Path, p2: &Path) -> bool {
    fn normalize(p: &Path) -> &str {
        let s = p.to_str().unwrap_or_default();
        let trimmed = s.trim_end_matches('/');
        if trimmed.is_empty() { s } else { trimmed }
    }
    if p1.to_str().is_none() || p2.to_str().is_none() {
        return p1 == p2;
    }
    normalize(p1) == normalize(p2)
}

/// An ordered list of directories, edited without touching the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathList {
    paths: Vec<PathBuf>,
}

impl PathList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(value: impl AsRef<OsStr>) -> Self {
        let value = value.as_ref();
        if value.is_empty() {
            return Self::new();
        }
        Self {
            paths: std::env::split_paths(value).collect(),
        }
    }

    /// Snapshot of the named variable; empty when unset.
    pub fn from_var(name: &str) -> Self {
        std::env::var_os(name)
            .map(Self::parse)
            .unwrap_or_default()
    }

    /// Move `path` to the front, dropping any other occurrence.
    pub fn prepend(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.paths.retain(|p| !paths_equal(p, &path));
        self.paths.insert(0, path);
        self
    }

    pub fn append(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if !self.contains(&path) {
            self.paths.push(path);
        }
        self
    }

    pub fn remove(mut self, path: &Path) -> Self {
        self.paths.retain(|p| !paths_equal(p, path));
        self
    }

    pub fn remove_where(mut self, mut pred: impl FnMut(&Path) -> bool) -> Self {
        self.paths.retain(|p| !pred(p));
        self
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| paths_equal(p, path))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn build(&self) -> Result<OsString> {
        std::env::join_paths(&self.paths).map_err(|e| Error::JoinPaths(e.to_string()))
    }

    /// Lossy string form, suitable for shell export lines.
    pub fn to_string_lossy(&self) -> Result<String> {
        Ok(self.build()?.to_string_lossy().into_owned())
    }
}

impl FromIterator<PathBuf> for PathList {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        let mut list = Self::new();
        for p in iter {
            list = list.append(p);
        }
        list
    }
}
