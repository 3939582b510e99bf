//! `init` and `completions`.

use crate::cli::app::{App, CompletionsArgs, InitArgs};
use crate::context::Context;
use anyhow::Result;
use clap::CommandFactory;
use clap_complete::generate;
use mpienv_core::PythonBinding;
use mpienv_platform::Shell;
use mpienv_platform::shell::{fish_quote, posix_quote};
use std::path::{Path, PathBuf};

const POSIX_WRAPPER: &str = r#"mpienv() {
    case "$1" in
        use)
            shift
            eval "$(command mpienv use --shell SHELL "$@")"
            ;;
        *)
            command mpienv "$@"
            ;;
    esac
}
"#;

const FISH_WRAPPER: &str = r#"function mpienv
    if test (count $argv) -gt 0; and test "$argv[1]" = use
        command mpienv use --shell fish $argv[2..-1] | source
    else
        command mpienv $argv
    end
end
"#;

/// Prepend `dir` to the colon-separated variable `key` without leaving an
/// empty entry behind.
fn prepend(shell: Shell, key: &str, dir: &Path) -> String {
    let dir = dir.to_string_lossy();
    match shell {
        Shell::Fish => format!("set -gx {key} {} ${key}\n", fish_quote(&dir)),
        _ => format!(
            "export {key}={}\"${{{key}:+:${key}}}\"\n",
            posix_quote(&dir)
        ),
    }
}

/// The snippet `eval`-ed from the shell rc file.
pub fn render_init(shell: Shell, shims: &Path, modules: &[PathBuf]) -> String {
    let mut s = String::new();
    s.push_str(&prepend(shell, "PATH", &shims.join("bin")));
    s.push_str(&prepend(shell, "LD_LIBRARY_PATH", &shims.join("lib")));
    for dir in modules.iter().rev() {
        s.push_str(&prepend(shell, "PYTHONPATH", dir));
    }
    s.push('\n');
    match shell {
        Shell::Fish => s.push_str(FISH_WRAPPER),
        other => s.push_str(&POSIX_WRAPPER.replace("SHELL", other.name())),
    }
    s
}

pub fn init(args: InitArgs) -> Result<()> {
    let ctx = Context::load()?;
    let shell = args.shell.unwrap_or_else(Shell::detect);
    let modules = match ctx.registry.active() {
        Some(active) if active.python => ctx.binding.module_path_for(&active.name),
        _ => Vec::new(),
    };
    print!("{}", render_init(shell, &ctx.env.shims_dir(), &modules));
    Ok(())
}

pub fn completions(args: CompletionsArgs) -> Result<()> {
    let mut cmd = App::command();
    generate(args.shell, &mut cmd, "mpienv", &mut std::io::stdout());
    Ok(())
}
