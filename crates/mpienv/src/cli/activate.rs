use crate::cli::app::UseArgs;
use crate::context::Context;
use anyhow::Result;
use mpienv_core::{Activator, Outcome};
use mpienv_platform::Shell;

/// Print the assignments for the parent shell to evaluate.
pub fn use_installation(args: UseArgs) -> Result<()> {
    let mut ctx = Context::load()?;
    let _lock = ctx.lock()?;
    let shell = args.shell.unwrap_or_else(Shell::detect);
    let bind_python = args.bind_python(ctx.settings.bind_python_by_default);

    let inherited = ctx.inherited.clone();
    let outcome =
        Activator::new(&mut ctx.registry, &ctx.binding, inherited).activate(&args.name, bind_python)?;

    match &outcome {
        Outcome::AlreadyActive(name) => eprintln!("mpienv: already using {name}"),
        Outcome::Activated(a) => {
            tracing::debug!(name = %a.name, linked = a.shim.linked, "shim rebuilt");
            for dir in &a.shim.skipped_dirs {
                tracing::debug!(dir = %dir.display(), "shim source missing");
            }
        }
    }
    print!("{}", outcome.render(shell));
    Ok(())
}
