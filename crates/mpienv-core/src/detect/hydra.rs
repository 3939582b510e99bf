//! Hydra launcher (`mpiexec --version`) text and `mpi.h` macros.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*Version:\s+(\S+)").unwrap());
static CONFIGURE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*Configure options:[ \t]*(.*)$").unwrap());
static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r"'([^']+)'").unwrap());
static MVAPICH_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*#\s*define\s+MVAPICH2_VERSION\s+"([.0-9]+(a\d*|b\d*|rc\d*)?)""#).unwrap()
});
static MPICH_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^\s*#\s*define\s+MPICH_VERSION\s+"([.0-9]+)""#).unwrap());

pub const MVAPICH_MARKER: &str = "MVAPICH2_VERSION";

pub fn version(text: &str) -> Option<String> {
    VERSION.captures(text).map(|c| c[1].to_string())
}

/// Unquoted configure options, in order. `None` when the label is missing.
pub fn configure_options(text: &str) -> Option<Vec<String>> {
    let line = CONFIGURE.captures(text)?;
    Some(
        QUOTED
            .captures_iter(&line[1])
            .map(|c| c[1].to_string())
            .collect(),
    )
}

/// Headers to probe, most specific first.
pub fn header_candidates(options: &[String], launcher: &Path) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = options.iter().find_map(|o| o.strip_prefix("--includedir=")) {
        candidates.push(Path::new(dir).join("mpi.h"));
    }

    let beside = |launcher: &Path| {
        launcher
            .parent()
            .and_then(Path::parent)
            .map(|prefix| prefix.join("include").join("mpi.h"))
    };
    candidates.extend(beside(launcher));
    if let Ok(real) = std::fs::canonicalize(launcher) {
        candidates.extend(beside(&real));
    }
    candidates.dedup();
    candidates
}

pub fn mvapich_version(header: &str) -> Option<String> {
    MVAPICH_VERSION.captures(header).map(|c| c[1].to_string())
}

pub fn mpich_version(header: &str) -> Option<String> {
    MPICH_VERSION.captures(header).map(|c| c[1].to_string())
}
