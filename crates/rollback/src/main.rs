use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod output;
mod rollback;

use rollback::RollbackArgs;

#[derive(Parser)]
#[command(
    name = "rollback",
    version,
    about = "Roll a Cloud Run service back to its most recently retired revision"
)]
struct Cli {
    #[command(flatten)]
    args: RollbackArgs,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();
    match rollback::run(cli.args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", error::format_error(&err));
            ExitCode::from(error::exit_code(&err))
        }
    }
}
