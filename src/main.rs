//! Buildbatch CLI - sequential multi-platform build orchestrator
//!
//! Entry point for the buildbatch command-line application.

use anyhow::Result;
use clap::Parser;

use buildbatch::cli::output::display_error;
use buildbatch::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output_config = cli.output_config();

    // Initialize tracing subscriber; RUST_LOG directives still apply
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(output_config.log_level().into()),
        )
        .init();

    tracing::debug!(
        "buildbatch {} ({})",
        env!("CARGO_PKG_VERSION"),
        option_env!("VERGEN_GIT_SHA").unwrap_or("unknown")
    );

    // Run the command and handle errors
    match cli.run().await {
        Ok(()) => Ok(()),
        Err(e) => {
            display_error(&e);
            std::process::exit(1);
        }
    }
}
