use clap::Parser;
use cli::app::App;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod cli;
mod context;
mod utils;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("MPIENV_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // stdout carries shell code for `eval`; logs must never land there.
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() -> ExitCode {
    let app = App::parse();
    init_tracing(app.verbose);

    match cli::run(app) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("mpienv: error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
