use std::process::ExitCode;

use clap::Parser;
use print_bridge_host::{App, Cli, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // 1. Environment (dotenv, logging)
    let config = setup_environment()?;

    tracing::info!(command = ?cli.command, "Print bridge host starting");

    // 2. Wire adapters and run
    let mut app = App::from_cli(config, &cli)?;
    let outcome = app.run(cli.command.clone()).await?;

    // stdout carries native channel payloads only
    for line in &outcome.report {
        eprintln!("{}", line);
    }
    for notification in &outcome.notifications {
        eprintln!("{}", notification);
    }

    if outcome.is_failure() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
