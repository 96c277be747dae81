use airq_explorer::cli::{run, Cli};
use airq_explorer::error::Result;
use clap::Parser;
use tracing::Level;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    run(cli)
}
