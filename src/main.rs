use anyhow::Result;
use clap::Parser;
use market_dashboard::cli::{self, Cli};
use market_dashboard::{chart, check, serve};

#[tokio::main]
async fn main() -> Result<()> {
    match Cli::parse().command() {
        cli::Command::Serve(args) => serve::run(args).await,
        cli::Command::Check(args) => check::run(args).await,
        cli::Command::Chart(args) => chart::run(args).await,
    }
}
