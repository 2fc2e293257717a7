//! Factcheck CLI - Extract and verify claims in campaign text.

use clap::Parser;
use factcheck_cli::commands;
use factcheck_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> factcheck_cli::Result<()> {
    let cli = Cli::parse();

    // Log to stderr so stdout stays machine-readable
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = Config::load(cli.config.as_deref())?;

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Extract(args) => commands::execute_extract(args, &config, &formatter)?,
        Command::Detect(args) => commands::execute_detect(args, &formatter)?,
        Command::Query(args) => commands::execute_query(args, &formatter)?,
        Command::Verify(args) => commands::execute_verify(args, &config, &formatter).await?,
        Command::Deniability(args) => {
            commands::execute_deniability(args, &config, &formatter)?
        }
        Command::Aggregate(args) => commands::execute_aggregate(args, &formatter)?,
    }

    Ok(())
}
