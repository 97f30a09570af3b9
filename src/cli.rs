use clap::{Parser, Subcommand};

use crate::chart::ChartArgs;
use crate::check::CheckArgs;
use crate::serve::ServeArgs;

#[derive(Debug, Parser)]
#[command(author, version, about = "Market dashboard snapshot server and tools")]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn command(self) -> Command {
        self.command.unwrap_or_default()
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the dashboard and its snapshot directory over HTTP
    Serve(ServeArgs),
    /// Parse every snapshot file and report what the dashboard would see
    Check(CheckArgs),
    /// Render a symbol's 30-day closes as an ASCII chart
    Chart(ChartArgs),
}

impl Default for Command {
    fn default() -> Self {
        Command::Serve(ServeArgs::default())
    }
}
