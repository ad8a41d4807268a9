//! Main entry point for tabregress CLI

use clap::Parser;
use tabregress::cli::Cli;
use tabregress::commands::{execute_command, CommandOutcome};

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    match execute_command(cli.command) {
        Ok(CommandOutcome::Completed) => {}
        Ok(CommandOutcome::RegressionDetected) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
