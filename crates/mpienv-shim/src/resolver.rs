//! Command resolution against an explicit search path.

use mpienv_platform::PathList;
use std::path::{Path, PathBuf};

pub trait TargetResolver {
    fn resolve(&self, command: &str) -> Option<PathBuf>;
}

/// Resolves like a shell would, but against a captured search path rather
/// than the live process environment.
#[derive(Debug, Clone)]
pub struct SearchPathResolver {
    path: PathList,
    cwd: PathBuf,
}

impl SearchPathResolver {
    pub fn new(path: PathList) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        Self { path, cwd }
    }

    pub fn from_env() -> Self {
        Self::new(PathList::from_var("PATH"))
    }

    pub fn search_path(&self) -> &PathList {
        &self.path
    }

    /// Resolve `command` and follow links to the final file.
    pub fn resolve_real(&self, command: &str) -> Option<PathBuf> {
        self.resolve(command)
            .and_then(|p| std::fs::canonicalize(&p).ok())
    }

    fn search(&self, command: &str) -> Option<PathBuf> {
        if self.path.is_empty() {
            return None;
        }
        let paths = self.path.build().ok()?;
        which::which_in(command, Some(paths), &self.cwd).ok()
    }
}

impl TargetResolver for SearchPathResolver {
    fn resolve(&self, command: &str) -> Option<PathBuf> {
        if Path::new(command).is_absolute() {
            return Path::new(command).exists().then(|| PathBuf::from(command));
        }
        let found = self.search(command);
        tracing::trace!(command, found = ?found, "resolved on search path");
        found
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    fn executable(path: &Path) {
        std::fs::write(path, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_first_match_wins() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::fs::create_dir_all(&a).unwrap();
        std::fs::create_dir_all(&b).unwrap();
        executable(&a.join("mpiexec"));
        executable(&b.join("mpiexec"));

        let resolver = SearchPathResolver::new(PathList::new().append(&b).append(&a));
        assert_eq!(resolver.resolve("mpiexec"), Some(b.join("mpiexec")));
    }

    #[test]
    fn test_non_executable_is_skipped() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("mpiexec"), "").unwrap();
        let resolver = SearchPathResolver::new(PathList::new().append(dir.path()));
        assert_eq!(resolver.resolve("mpiexec"), None);
    }

    #[test]
    fn test_empty_path_resolves_nothing() {
        let resolver = SearchPathResolver::new(PathList::new());
        assert_eq!(resolver.resolve("sh"), None);
    }

    #[test]
    fn test_resolve_real_follows_links() {
        let dir = tempdir().unwrap();
        let real = dir.path().join("real");
        let shims = dir.path().join("shims");
        std::fs::create_dir_all(&real).unwrap();
        std::fs::create_dir_all(&shims).unwrap();
        executable(&real.join("mpiexec.hydra"));
        std::os::unix::fs::symlink(real.join("mpiexec.hydra"), shims.join("mpiexec")).unwrap();

        let resolver = SearchPathResolver::new(PathList::new().append(&shims));
        assert_eq!(
            resolver.resolve_real("mpiexec"),
            Some(std::fs::canonicalize(real.join("mpiexec.hydra")).unwrap())
        );
    }
}
