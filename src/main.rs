//! Binary entry point for the retrieval-augmented reasoning pipeline CLI.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use clap::Parser;
use rarp::cli::{execute, Cli};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    execute(&cli).await
}
