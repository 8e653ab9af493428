//! Command line for the olympians pipeline

use clap::{Parser, Subcommand};

/// Resolve which Olympic editions each US athlete attended, grouped by birth state.
#[derive(Debug, Parser)]
#[command(name = "olympians-backend")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Step to run; all seasons when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn step(&self) -> Command {
        self.command.unwrap_or(Command::All)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Split the bios table into state-born and born-elsewhere rosters.
    Roster,
    /// Resolve Winter editions only.
    Winter,
    /// Resolve Summer editions only.
    Summer,
    /// Resolve every configured season.
    All,
}
