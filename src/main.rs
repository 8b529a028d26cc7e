use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zonewise::cli::{Cli, Commands};
use zonewise::commands::{classify, inspect};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match &cli.command {
        Commands::Classify(args) => classify::run(&cli, args),
        Commands::Inspect(args) => inspect::run(&cli, args),
    }
}

/// RUST_LOG overrides; otherwise `-v` raises the default level.
fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "zonewise=info",
        1 => "zonewise=debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
