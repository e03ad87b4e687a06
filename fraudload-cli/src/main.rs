mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use fraudload_config::ConfigLoader;
use fraudload_core::report::print_final_report;
use fraudload_core::LoadRunner;
use fraudload_logging::init_logging;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::new()
        .read(cli.config.as_ref())
        .context("Failed to load configuration")?;
    cli.apply(&mut config);

    if cli.print_config {
        print!("{}", config.to_redacted_yaml()?);
        return Ok(());
    }

    init_logging(&config.logging)?;
    config.validate_all().context("Invalid configuration")?;

    let runner = LoadRunner::new(config)?;
    let summary = match runner.run().await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Load test aborted: {}", e);
            return Err(e.into());
        }
    };

    print_final_report(&summary);
    info!(
        "{} requests, {} failures",
        summary.total.requests, summary.total.failures
    );

    Ok(())
}
