//! isvcli - group access automation for IBM Security Verify tenants
//!
//! This CLI enables operators to:
//! - Check whether a user has access to a directory group
//! - Onboard a user, creating the account if it does not exist
//! - Offboard a user from a group while keeping the account

use clap::Parser;
use tracing::{debug, error};

mod cli;
mod commands;
mod error;
mod logging;

use cli::Cli;
use error::CliResult;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let log_file = logging::init(&cli.log_dir, &cli.action)?;
    debug!(path = %log_file.display(), "Logging to file");

    let result = commands::execute(&cli).await;
    if let Err(e) = &result {
        error!(exit_code = e.exit_code(), "{}", e);
    }
    result
}
