use anyhow::Result;
use clap::Parser;
use tracing::error;

use funcsize::app;
use funcsize::cli::CliArgs;
use funcsize::config::Config;

fn main() -> Result<()> {
    // Initialize tracing with env filter
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();
    let config = Config::from_cli_and_file(&args, args.config.clone())?;
    let locators = app::collect_locators(&args.repositories, args.input_file.as_deref())?;

    if let Err(err) = app::run(&locators, &config.output, args.format, &config) {
        error!("Run failed: {err:#}");
        return Err(err);
    }

    Ok(())
}
