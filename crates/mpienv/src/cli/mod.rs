use anyhow::Result;
use app::{App, Commands};
use std::process::ExitCode;

mod activate;
pub mod app;
mod exec;
mod ls;
mod manage;
mod setup;

pub fn run(app: App) -> Result<ExitCode> {
    match app.cmd {
        Commands::Add(args) => manage::add(args)?,
        Commands::Remove(args) => manage::remove(args)?,
        Commands::Rename(args) => manage::rename(args)?,
        Commands::List(args) => ls::list(args)?,
        Commands::Info(args) => ls::info(args)?,
        Commands::Prefix(args) => ls::prefix(args)?,
        Commands::Use(args) => activate::use_installation(args)?,
        Commands::Exec(args) => return exec::exec(args, app.verbose),
        Commands::Init(args) => setup::init(args)?,
        Commands::Completions(args) => setup::completions(args)?,
    }
    Ok(ExitCode::SUCCESS)
}
