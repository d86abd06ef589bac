//! Appshell CLI - build orchestrator for front-end applications
//!
//! Entry point for the appshell command-line application.

use anyhow::Result;
use clap::Parser;

use appshell::cli::commands::build::Interrupted;
use appshell::cli::output::display_error;
use appshell::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output_config = cli.output_config();

    // Initialize tracing subscriber; RUST_LOG overrides the flag-derived level
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(output_config.log_directive())),
        )
        .init();

    // Run the command and handle errors
    match cli.run().await {
        Ok(()) => Ok(()),
        Err(e) => {
            display_error(&e);
            let code = if e.downcast_ref::<Interrupted>().is_some() {
                130
            } else {
                1
            };
            std::process::exit(code);
        }
    }
}
