//! Graduation CLI - serve the prediction form or predict from the command line.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use graduation_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize tracing subscriber with environment filter
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("graduation=info".parse()?))
        .init();

    let cli = Cli::parse();

    info!("Graduation CLI starting...");

    let code = match cli.command {
        Commands::Serve(cmd) => {
            cmd.run().await?;
            ExitCode::SUCCESS
        }
        Commands::Predict(cmd) => cmd.run()?,
    };

    Ok(code)
}
