use olympians_backend::cli::{Cli, Command};
use olympians_backend::config;
use olympians_backend::logging;
use olympians_backend::module::resolve::{run_all_seasons, run_seasons, run_winter_only};
use olympians_backend::module::state::run_roster_split;

use anyhow::Result;
use clap::Parser;
use olympians_common::Season;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let command = Cli::parse().step();

    // Load configuration
    let config = config::read_config()?;

    // Initialize logging
    let _logging_guard = logging::init_logging(&config.log_dir, "olympians-backend", &config.log_level)?;

    match &config.source {
        Some(path) => tracing::info!("Configuration loaded from {:?}", path),
        None => tracing::warn!("No configuration file found, using defaults"),
    }

    tracing::info!("Olympians pipeline starting: {:?}", command);

    let summaries = match command {
        Command::Roster => {
            run_roster_split(config).await?;
            tracing::info!("✓ Roster split complete");
            return Ok(());
        }
        Command::All => run_all_seasons(config).await?,
        Command::Winter => run_winter_only(config).await?,
        Command::Summer => run_seasons(config, &[Season::Summer]).await?,
    };

    for summary in &summaries {
        tracing::info!(
            "✓ {}: {} state-born, {} born elsewhere, {} no-match ({} known, {} cached, {} looked up)",
            summary.season,
            summary.state_born,
            summary.born_elsewhere,
            summary.no_match,
            summary.stats.known,
            summary.stats.cached,
            summary.stats.scraped
        );
    }

    Ok(())
}
