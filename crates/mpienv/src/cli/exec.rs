use crate::cli::app::ExecArgs;
use crate::context::Context;
use anyhow::Result;
use mpienv_core::ExecPlan;
use mpienv_platform::SystemRunner;
use std::process::ExitCode;

/// Launcher status as a process exit code; anything out of range is 1.
fn exit_status(status: i32) -> u8 {
    u8::try_from(status).unwrap_or(1)
}

pub fn exec(args: ExecArgs, verbose: bool) -> Result<ExitCode> {
    let ctx = Context::load()?;
    let plan = ExecPlan::prepare(&ctx.registry, &ctx.binding, &ctx.inherited, &args.args)?;

    if plan.missing_python_binding() {
        tracing::warn!(
            "{} is running without the Python binding; run `mpienv use {} --python` to enable it",
            plan.record.name,
            plan.record.name
        );
    }

    if args.dry_run {
        println!("{}", plan.command()?.to_command_line());
        if verbose {
            println!("# {}", plan.script_path.display());
            print!("{}", plan.script);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let status = plan.run(&SystemRunner)?;
    Ok(ExitCode::from(exit_status(status)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status() {
        assert_eq!(exit_status(0), 0);
        assert_eq!(exit_status(3), 3);
        assert_eq!(exit_status(-1), 1);
        assert_eq!(exit_status(300), 1);
    }
}
