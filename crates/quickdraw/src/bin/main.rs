//! Quickdraw CLI binary entry point.
//!
//! This binary requires the `cli` feature to be enabled.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "quickdraw", version, about = "Quickdraw race protocol node")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Run(quickdraw::cli::run::Args),
    Config(quickdraw::cli::config::Args),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => quickdraw::cli::run::execute(args).await,
        Commands::Config(args) => quickdraw::cli::config::execute(args),
    }
}
