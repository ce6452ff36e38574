//! Canopy CLI Binary
//!
//! Command-line interface for the hierarchical record store.

use canopy::tooling::cli::{Cli, CliContext};
use clap::Parser;
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let context = match CliContext::new(cli.config.as_deref(), cli.latency_ms) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error loading configuration: {:#}", e);
            process::exit(1);
        }
    };

    if let Err(e) = context.init_logging(cli.log_level.as_deref()) {
        eprintln!("Error initializing logging: {:#}", e);
        process::exit(1);
    }

    match context.execute(&cli.command).await {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
