#![cfg(unix)]

use mpienv_shim::{Category, ShimBuilder};
use std::path::Path;
use tempfile::tempdir;

fn touch(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, "").unwrap();
}

#[test]
fn mirrors_selected_files_into_fixed_layout() {
    let dir = tempdir().unwrap();
    let prefix = dir.path().join("mpich");
    touch(&prefix.join("bin/mpiexec.hydra"));
    touch(&prefix.join("bin/hydra_pmi_proxy"));
    touch(&prefix.join("bin/unrelated"));
    touch(&prefix.join("lib/libmpich.so.12"));
    std::os::unix::fs::symlink(
        prefix.join("bin/mpiexec.hydra"),
        prefix.join("bin/mpiexec"),
    )
    .unwrap();

    let shims = dir.path().join("versions/shims");
    let report = ShimBuilder::new(&shims)
        .mirror(Category::Bin, prefix.join("bin"), &["hydra_*", "mpi*"])
        .unwrap()
        .mirror(Category::Lib, prefix.join("lib"), &["lib*mpi*.*"])
        .unwrap()
        .mirror(Category::Libexec, prefix.join("libexec/osu-micro-benchmarks"), &["*"])
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(report.linked, 4);
    assert_eq!(report.skipped_dirs.len(), 1);
    for sub in ["bin", "lib", "include", "libexec"] {
        assert!(shims.join(sub).is_dir());
    }
    assert!(!shims.join("bin/unrelated").exists());

    // Links point at the final file, never at another link.
    let target = std::fs::read_link(shims.join("bin/mpiexec")).unwrap();
    assert_eq!(
        target,
        std::fs::canonicalize(prefix.join("bin/mpiexec.hydra")).unwrap()
    );
}

#[test]
fn rebuild_discards_previous_links() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a/bin");
    let b = dir.path().join("b/bin");
    touch(&a.join("mpirun"));
    touch(&b.join("ompi_info"));

    let shims = dir.path().join("shims");
    ShimBuilder::new(&shims)
        .mirror(Category::Bin, &a, &["mpi*"])
        .unwrap()
        .build()
        .unwrap();
    assert!(shims.join("bin/mpirun").exists());

    ShimBuilder::new(&shims)
        .mirror(Category::Bin, &b, &["ompi_*"])
        .unwrap()
        .build()
        .unwrap();
    assert!(!shims.join("bin/mpirun").exists());
    assert!(shims.join("bin/ompi_info").exists());
}
