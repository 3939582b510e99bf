#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const HYDRA_BANNER: &str = "\
HYDRA build details:
    Version:                                 3.2
    Configure options:                       '--prefix=PREFIX'
";

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn root(&self) -> PathBuf {
        self.dir.path().join("mpienv")
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_mpienv"))
            .args(args)
            .env("MPIENV_ROOT", self.root())
            .env("HOME", self.dir.path())
            .env_remove("MPIENV_VERSIONS_DIR")
            .env_remove("MPIENV_CACHE_DIR")
            .env_remove("MPIENV_BUILD_DIR")
            .env_remove("MPIENV_LOG")
            .env_remove("PYTHONPATH")
            .output()
            .unwrap()
    }

    /// A launcher script that answers `--version` like MPICH's Hydra.
    fn fake_mpich(&self) -> PathBuf {
        let prefix = self.dir.path().join("mpich");
        let bin = prefix.join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let banner = HYDRA_BANNER.replace("PREFIX", &prefix.display().to_string());
        let launcher = bin.join("mpiexec");
        std::fs::write(&launcher, format!("#!/bin/sh\ncat <<'END'\n{banner}END\n")).unwrap();
        std::fs::set_permissions(&launcher, std::fs::Permissions::from_mode(0o755)).unwrap();
        prefix
    }
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn test_empty_registry() {
    let sb = Sandbox::new();
    let out = sb.run(&["list", "--simple"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stdout(&out).is_empty());
    assert!(sb.root().join("registry.toml").is_file());
}

#[test]
fn test_errors_are_prefixed() {
    let sb = Sandbox::new();
    let out = sb.run(&["add", "/nonexistent/bin/mpiexec"]);
    assert!(!out.status.success());
    assert!(stderr(&out).starts_with("mpienv: error:"));

    let out = sb.run(&["info"]);
    assert!(!out.status.success());
    assert!(stdout(&out).is_empty());
}

#[test]
fn test_add_use_remove() {
    let sb = Sandbox::new();
    let prefix = sb.fake_mpich();

    let out = sb.run(&["add", prefix.to_str().unwrap()]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stdout(&out).starts_with("mpich-3.2:"));

    let out = sb.run(&["list", "--simple"]);
    assert_eq!(stdout(&out), "mpich-3.2\n");

    let out = sb.run(&["prefix", "mpich-3.2"]);
    assert_eq!(stdout(&out).trim_end(), prefix.display().to_string());

    let out = sb.run(&["use", "mpich-3.2", "--no-python", "--shell", "bash"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let exports = stdout(&out);
    assert!(exports.contains("export MPIENV_MPI_NAME='mpich-3.2'\n"));
    assert!(exports.contains("export MPIENV_MPI_TYPE='MPICH'\n"));
    assert!(exports.contains("unset PYTHONPATH\n"));
    let shim = sb.root().join("versions/shims/bin/mpiexec");
    assert!(shim.is_symlink());

    let out = sb.run(&["use", "mpich-3.2", "--no-python", "--shell", "bash"]);
    assert!(out.status.success());
    assert!(stdout(&out).is_empty());
    assert!(stderr(&out).contains("already using mpich-3.2"));

    let out = sb.run(&["rename", "mpich-3.2", "default"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let registry = std::fs::read_to_string(sb.root().join("registry.toml")).unwrap();
    assert!(registry.contains("name = \"default\""));

    let out = sb.run(&["rm", "default"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(Path::new(&prefix.join("bin/mpiexec")).exists());
    let out = sb.run(&["list", "--simple"]);
    assert!(stdout(&out).is_empty());
}

#[test]
fn test_init_snippet() {
    let sb = Sandbox::new();
    let out = sb.run(&["init", "--shell", "zsh"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let bin = sb.root().join("versions/shims/bin");
    assert!(stdout(&out).contains(&format!("export PATH='{}'", bin.display())));
    assert!(stdout(&out).contains("mpienv() {"));
}
