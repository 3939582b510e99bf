use clap::{Args, Parser, Subcommand};
use mpienv_platform::Shell;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "mpienv",
    version = env!("CARGO_PKG_VERSION"),
    about = "Switch between MPI installations",
    propagate_version = true
)]
pub struct App {
    /// Log at debug level (and show the wrapper script with `exec --dry-run`)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Register an MPI launcher or installation prefix
    Add(AddArgs),
    /// Forget a registered installation
    #[command(name = "rm", alias = "remove")]
    Remove(NameArgs),
    /// Give an installation a new name
    Rename(RenameArgs),
    /// List registered installations
    #[command(alias = "ls")]
    List(ListArgs),
    /// Show details of an installation (the active one by default)
    Info(InfoArgs),
    /// Print the installation prefix (the active one by default)
    Prefix(OptionalNameArgs),
    /// Make an installation active; prints shell code to evaluate
    Use(UseArgs),
    /// Run a program with the active installation's launcher
    Exec(ExecArgs),
    /// Print the shell setup snippet
    Init(InitArgs),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Path to `mpiexec`, or a prefix containing `bin/mpiexec`
    pub target: PathBuf,
    /// Name to register under instead of the detected default
    #[arg(short, long)]
    pub name: Option<String>,
}

#[derive(Debug, Args)]
pub struct NameArgs {
    pub name: String,
}

#[derive(Debug, Args)]
pub struct OptionalNameArgs {
    pub name: Option<String>,
}

#[derive(Debug, Args)]
pub struct RenameArgs {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, conflicts_with = "simple")]
    pub json: bool,
    /// Names only, one per line
    #[arg(short, long)]
    pub simple: bool,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    pub name: Option<String>,
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct UseArgs {
    pub name: String,
    /// Do not install or expose the Python binding
    #[arg(long, conflicts_with = "python")]
    pub no_python: bool,
    /// Install and expose the Python binding even if disabled in config.toml
    #[arg(long)]
    pub python: bool,
    /// Shell syntax to emit (detected when omitted)
    #[arg(long)]
    pub shell: Option<Shell>,
}

impl UseArgs {
    pub fn bind_python(&self, default: bool) -> bool {
        if self.no_python {
            false
        } else {
            self.python || default
        }
    }
}

#[derive(Debug, Args)]
pub struct ExecArgs {
    /// Print the launcher command instead of running it
    #[arg(long)]
    pub dry_run: bool,
    /// Launcher options, then the program and its arguments.
    /// Put `--` first when the leading option clashes with mpienv's own flags
    /// (e.g. `-hostfile`, `-genv`).
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "ARGS"
    )]
    pub args: Vec<String>,
}

#[derive(Debug, Args)]
pub struct InitArgs {
    #[arg(long)]
    pub shell: Option<Shell>,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        App::command().debug_assert();
    }

    #[test]
    fn test_remove_alias() {
        let app = App::try_parse_from(["mpienv", "remove", "mpich-3.2"]).unwrap();
        assert!(matches!(app.cmd, Commands::Remove(NameArgs { ref name }) if name == "mpich-3.2"));
    }

    #[test]
    fn test_exec_keeps_launcher_flags() {
        let app =
            App::try_parse_from(["mpienv", "exec", "--dry-run", "-n", "2", "./a.out", "-x"]).unwrap();
        let Commands::Exec(exec) = app.cmd else {
            panic!("expected exec");
        };
        assert!(exec.dry_run);
        assert_eq!(exec.args, ["-n", "2", "./a.out", "-x"]);
    }

    #[test]
    fn test_exec_double_dash() {
        let app = App::try_parse_from(["mpienv", "exec", "--", "-hostfile", "hosts", "./a.out"])
            .unwrap();
        let Commands::Exec(exec) = app.cmd else {
            panic!("expected exec");
        };
        assert!(!exec.dry_run);
        assert_eq!(exec.args, ["-hostfile", "hosts", "./a.out"]);
    }

    #[test]
    fn test_use_python_flags() {
        let app = App::try_parse_from(["mpienv", "use", "ompi", "--no-python", "--shell", "fish"])
            .unwrap();
        let Commands::Use(args) = app.cmd else {
            panic!("expected use");
        };
        assert!(!args.bind_python(true));
        assert_eq!(args.shell, Some(Shell::Fish));

        assert!(App::try_parse_from(["mpienv", "use", "x", "--python", "--no-python"]).is_err());
        assert!(App::try_parse_from(["mpienv", "use", "x", "--shell", "tcsh"]).is_err());
    }

    #[test]
    fn test_bind_python_default() {
        let args = UseArgs {
            name: "x".into(),
            no_python: false,
            python: false,
            shell: None,
        };
        assert!(args.bind_python(true));
        assert!(!args.bind_python(false));
        let forced = UseArgs { python: true, ..args };
        assert!(forced.bind_python(false));
    }
}
