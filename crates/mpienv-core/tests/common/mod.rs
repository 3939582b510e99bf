#![allow(dead_code)]

use mpienv_core::python::{BuildEnv, PythonBinding};
use mpienv_core::{Detector, MpienvEnv, Registry};
use mpienv_platform::{Command, CommandOutput, CommandRunner, PathList};
use mpienv_shim::SearchPathResolver;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub const MPICH_VERSION: &str = "\
HYDRA build details:
    Version:                                 3.2
    Release Date:                            Wed Nov 11 22:06:48 CST 2015
    CC:                              gcc
    Configure options:                       '--disable-option-checking' '--prefix=PREFIX' 'CFLAGS= -O2'
    Process Manager:                         pmi
";

pub const OMPI_VERSION: &str = "mpiexec (OpenRTE) 2.1.1\n\nReport bugs to http://www.open-mpi.org/community/help/\n";

pub const OMPI_INFO: &str = "\
package:Open MPI builder@host Distribution
ompi:version:full:2.1.1
mpi-api:version:full:3.1.0
option:cuda-support:no
option:mpi-io:yes
";

/// Canned command output keyed by program path.
#[derive(Default)]
pub struct FakeRunner {
    outputs: RefCell<HashMap<PathBuf, CommandOutput>>,
    pub runs: RefCell<Vec<Vec<String>>>,
    pub status: i32,
}

impl FakeRunner {
    pub fn respond(&self, program: &Path, stdout: &str, stderr: &str) {
        self.outputs.borrow_mut().insert(
            program.to_path_buf(),
            CommandOutput {
                status: Some(0),
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            },
        );
    }
}

impl CommandRunner for FakeRunner {
    fn capture(&self, command: Command) -> mpienv_platform::Result<CommandOutput> {
        self.outputs
            .borrow()
            .get(Path::new(command.program()))
            .cloned()
            .ok_or_else(|| mpienv_platform::Error::CommandNotFound {
                cmd: command.program().to_string(),
            })
    }

    fn status(&self, command: Command) -> mpienv_platform::Result<i32> {
        let mut line = vec![command.program().to_string()];
        line.extend(command.arguments());
        self.runs.borrow_mut().push(line);
        Ok(self.status)
    }
}

/// Binding manager that only records what it was asked to do.
#[derive(Default)]
pub struct FakeBinding {
    pub root: PathBuf,
    pub installed: RefCell<HashSet<String>>,
    pub calls: RefCell<Vec<String>>,
    pub fail_install: bool,
    pub fail_rename: bool,
}

impl FakeBinding {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            ..Default::default()
        }
    }
}

impl PythonBinding for FakeBinding {
    fn is_installed(&self, name: &str) -> bool {
        self.installed.borrow().contains(name)
    }

    fn install(&self, name: &str, env: BuildEnv<'_>) -> mpienv_core::Result<()> {
        let first = env.path.iter().next().map(|p| p.display().to_string());
        self.calls
            .borrow_mut()
            .push(format!("install {name} {}", first.unwrap_or_default()));
        if self.fail_install {
            return Err(mpienv_core::Error::ExternalCommand {
                program: "pip".into(),
                status: 1,
            });
        }
        self.installed.borrow_mut().insert(name.to_string());
        Ok(())
    }

    fn remove(&self, name: &str) -> mpienv_core::Result<()> {
        self.calls.borrow_mut().push(format!("remove {name}"));
        Ok(())
    }

    fn rename(&self, name: &str, new_name: &str) -> mpienv_core::Result<()> {
        self.calls.borrow_mut().push(format!("rename {name} {new_name}"));
        if self.fail_rename {
            return Err(mpienv_core::Error::Io(std::io::Error::other("target exists")));
        }
        Ok(())
    }

    fn module_path_for(&self, name: &str) -> Vec<PathBuf> {
        vec![self.root.join("versions/pylib/py").join(name)]
    }
}

pub fn touch(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, "").unwrap();
}

pub fn executable(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, "#!/bin/sh\n").unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// An MPICH-looking prefix whose launcher answers through `runner`.
pub fn fake_mpich(runner: &FakeRunner, prefix: &Path) -> PathBuf {
    let launcher = prefix.join("bin/mpiexec");
    executable(&launcher);
    executable(&prefix.join("bin/mpicc"));
    executable(&prefix.join("bin/hydra_pmi_proxy"));
    touch(&prefix.join("lib/libmpich.so.12"));
    touch(&prefix.join("include/mpi.h"));
    std::fs::write(prefix.join("include/mpi.h"), "#define MPICH_VERSION \"3.2\"\n").unwrap();
    let text = MPICH_VERSION.replace("PREFIX", &prefix.display().to_string());
    runner.respond(&launcher, &text, "");
    launcher
}

pub fn fake_mvapich(runner: &FakeRunner, prefix: &Path) -> PathBuf {
    let launcher = fake_mpich(runner, prefix);
    std::fs::write(
        prefix.join("include/mpi.h"),
        "#define MPICH_VERSION \"3.2.1\"\n#define MVAPICH2_VERSION \"2.3rc1\"\n",
    )
    .unwrap();
    std::fs::create_dir_all(prefix.join("libexec/osu-micro-benchmarks")).unwrap();
    launcher
}

pub fn fake_openmpi(runner: &FakeRunner, prefix: &Path) -> PathBuf {
    let launcher = prefix.join("bin/mpiexec");
    executable(&launcher);
    executable(&prefix.join("bin/ompi_info"));
    executable(&prefix.join("bin/orterun"));
    touch(&prefix.join("lib/libmpi.so.40"));
    std::fs::create_dir_all(prefix.join("lib/openmpi")).unwrap();
    runner.respond(&launcher, "", OMPI_VERSION);
    runner.respond(&prefix.join("bin/ompi_info"), OMPI_INFO, "");
    launcher
}

pub fn env(root: &Path) -> MpienvEnv {
    MpienvEnv::new(root.join("mpienv")).interpreter(Path::new("/usr/bin/python3"))
}

pub fn registry<'a>(
    root: &Path,
    runner: &'a FakeRunner,
    search: &[&Path],
) -> Registry<&'a FakeRunner> {
    let path = search
        .iter()
        .fold(PathList::new(), |list, dir| list.append(*dir));
    Registry::load(
        env(root),
        Detector::new(runner),
        SearchPathResolver::new(path),
    )
    .unwrap()
}
