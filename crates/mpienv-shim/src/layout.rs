use crate::{Error, Result};
use mpienv_fs::{atomic_symlink, real_target, Workspace};
use regex::Regex;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Bin,
    Lib,
    Include,
    Libexec,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Bin,
        Category::Lib,
        Category::Include,
        Category::Libexec,
    ];

    pub fn dir_name(self) -> &'static str {
        match self {
            Category::Bin => "bin",
            Category::Lib => "lib",
            Category::Include => "include",
            Category::Libexec => "libexec",
        }
    }
}

/// A shell-style wildcard (`*`, `?`) matched against a whole file name.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(wildcard: &str) -> Result<Self> {
        let mut re = String::with_capacity(wildcard.len() + 8);
        re.push('^');
        for c in wildcard.chars() {
            match c {
                '*' => re.push_str(".*"),
                '?' => re.push('.'),
                c => re.push_str(&regex::escape(&c.to_string())),
            }
        }
        re.push('$');
        let regex =
            Regex::new(&re).map_err(|e| Error::Pattern(wildcard.to_string(), e.to_string()))?;
        Ok(Self {
            source: wildcard.to_string(),
            regex,
        })
    }

    /// Hidden files only match patterns that start with a dot.
    pub fn matches(&self, name: &str) -> bool {
        if name.starts_with('.') && !self.source.starts_with('.') {
            return false;
        }
        self.regex.is_match(name)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

#[derive(Debug)]
struct Mirror {
    category: Category,
    source_dir: PathBuf,
    patterns: Vec<Pattern>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShimReport {
    pub linked: usize,
    pub skipped_dirs: Vec<PathBuf>,
}

/// Builds a fresh shim tree and swaps it over `root` in one step.
#[derive(Debug)]
pub struct ShimBuilder {
    root: PathBuf,
    mirrors: Vec<Mirror>,
}

impl ShimBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            mirrors: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mirror(
        mut self,
        category: Category,
        source_dir: impl Into<PathBuf>,
        patterns: &[&str],
    ) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<Result<Vec<_>>>()?;
        self.mirrors.push(Mirror {
            category,
            source_dir: source_dir.into(),
            patterns,
        });
        Ok(self)
    }

    pub fn build(self) -> Result<ShimReport> {
        if let Some(parent) = self.root.parent() {
            std::fs::create_dir_all(parent).map_err(|e| mpienv_fs::Error::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let workspace = Workspace::beside(&self.root)?;
        for category in Category::ALL {
            workspace.create_dir(category.dir_name())?;
        }

        let mut report = ShimReport::default();
        for mirror in &self.mirrors {
            if !mirror.source_dir.is_dir() {
                tracing::debug!(dir = %mirror.source_dir.display(), "source directory missing, skipped");
                report.skipped_dirs.push(mirror.source_dir.clone());
                continue;
            }
            let dest = workspace.path().join(mirror.category.dir_name());
            report.linked += link_matching(&mirror.source_dir, &dest, &mirror.patterns)?;
        }

        workspace.commit()?;
        tracing::info!(root = %self.root.display(), linked = report.linked, "shim rebuilt");
        Ok(report)
    }
}

fn link_matching(source_dir: &Path, dest: &Path, patterns: &[Pattern]) -> Result<usize> {
    let entries = std::fs::read_dir(source_dir).map_err(|e| Error::ReadDir {
        path: source_dir.to_path_buf(),
        source: e,
    })?;

    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| patterns.iter().any(|p| p.matches(name)))
        .collect();
    names.sort();

    let mut linked = 0;
    for name in names {
        let src = source_dir.join(&name);
        let target = match real_target(&src) {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!(path = %src.display(), error = %e, "dangling link not mirrored");
                continue;
            }
        };
        atomic_symlink(&target, dest.join(&name))?;
        linked += 1;
    }
    Ok(linked)
}
