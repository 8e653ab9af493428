use clap::{Parser, Subcommand};
use tracing::info;

mod config;
mod medals;
mod per_capita;

use config::Config;

const CONFIG_PATH: &str = "stats.toml";

/// Per-capita and medal tables built from the pipeline's output.
#[derive(Debug, Parser)]
#[command(name = "olympians-stats")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Table to build; both when omitted.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Olympians per 100k residents by state and season.
    PerCapita,
    /// Medal tally for one state's athletes.
    Medals {
        /// State to tally; defaults to `medal_state` from the config.
        state: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    // Load configuration
    let config = Config::load(CONFIG_PATH)?;
    info!("Loaded configuration: {:?}", config);

    match cli.command {
        Some(Command::PerCapita) => {
            per_capita::run(&config)?;
        }
        Some(Command::Medals { state }) => {
            let state = state.unwrap_or_else(|| config.medal_state.clone());
            medals::run(&config, &state)?;
        }
        None => {
            per_capita::run(&config)?;
            medals::run(&config, &config.medal_state)?;
        }
    }

    Ok(())
}
