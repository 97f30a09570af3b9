use std::fmt;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use dashboard_frontend::market::source::{fetch_snapshot, fetch_stock, Endpoint, FetchError};
use dashboard_frontend::market::types::{
    ChartData, ExtendedRankings, HistoricalData, MajorIndices, PeriodRankings, RankingSet,
    Rankings, RealtimeSnapshot, Snapshot, StockIndex, SummarySnapshot, Universe,
};
use serde_json::json;

use crate::constants::DEFAULT_SNAPSHOT_ROOT;
use crate::logging;
use crate::snapshot_dir::SnapshotDir;

#[derive(Debug, Args, Clone)]
pub struct CheckArgs {
    /// Snapshot directory holding `api/` and `data/`
    #[arg(long, default_value = DEFAULT_SNAPSHOT_ROOT)]
    pub root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Parsed(String),
    Missing,
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointReport {
    pub path: String,
    pub outcome: Outcome,
}

impl fmt::Display for EndpointReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Parsed(summary) => write!(f, "ok       {:<34} {summary}", self.path),
            Outcome::Missing => write!(f, "missing  {}", self.path),
            Outcome::Invalid(err) => write!(f, "invalid  {:<34} {err}", self.path),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub entries: Vec<EndpointReport>,
}

impl CheckReport {
    pub fn parsed(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Parsed(_)))
    }

    pub fn missing(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Missing))
    }

    pub fn invalid(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Invalid(_)))
    }

    pub fn entry(&self, path: &str) -> Option<&EndpointReport> {
        self.entries.iter().find(|entry| entry.path == path)
    }

    fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.entries
            .iter()
            .filter(|entry| predicate(&entry.outcome))
            .count()
    }
}

fn outcome_of<T>(result: Result<T, FetchError>, describe: impl FnOnce(&T) -> String) -> Outcome {
    match result {
        Ok(value) => Outcome::Parsed(describe(&value)),
        Err(FetchError::Http(404)) => Outcome::Missing,
        Err(err) => Outcome::Invalid(err.to_string()),
    }
}

async fn probe<T: Snapshot>(dir: &SnapshotDir, describe: fn(&T) -> String) -> EndpointReport {
    EndpointReport {
        path: T::endpoint().path(),
        outcome: outcome_of(fetch_snapshot::<T, _>(dir).await, describe),
    }
}

fn records(count: usize) -> String {
    format!("{count} records")
}

fn ranking_summary(set: &RankingSet) -> String {
    let total: usize = set.categories.values().map(Vec::len).sum();
    format!("{} categories, {}", set.categories.len(), records(total))
}

/// Parses every snapshot file the dashboard reads, plus each per-symbol
/// quote under `api/stocks/`.
pub async fn inspect(dir: &SnapshotDir) -> Result<CheckReport> {
    let mut entries = vec![
        probe::<RealtimeSnapshot>(dir, |snapshot| {
            records(snapshot.indices.len() + snapshot.foreign.len() + snapshot.stocks.len())
        })
        .await,
        probe::<SummarySnapshot>(dir, |snapshot| records(snapshot.indices.len())).await,
        probe::<MajorIndices>(dir, |indices| {
            format!("{} regions, {}", indices.regions.len(), records(indices.records().count()))
        })
        .await,
        probe::<Rankings>(dir, |rankings| ranking_summary(&rankings.0)).await,
        probe::<ExtendedRankings>(dir, |rankings| ranking_summary(&rankings.0)).await,
        probe::<PeriodRankings>(dir, |rankings| {
            let keys: Vec<&str> = rankings.periods.keys().map(String::as_str).collect();
            format!("periods [{}]", keys.join(", "))
        })
        .await,
        probe::<StockIndex>(dir, |index| records(index.stocks.len())).await,
        probe::<Universe>(dir, |universe| format!("{} tiered symbols", universe.len())).await,
        probe::<ChartData>(dir, |charts| format!("{} series", charts.charts.len())).await,
        probe::<HistoricalData>(dir, |history| format!("{} symbols", history.symbols.len())).await,
    ];

    let symbols = dir
        .stock_symbols()
        .await
        .with_context(|| format!("failed to list {}", dir.root().join("api/stocks").display()))?;
    for symbol in symbols {
        let path = Endpoint::Stock(symbol.clone()).path();
        let outcome = outcome_of(fetch_stock(dir, &symbol).await, |record| {
            match record.price {
                Some(price) => format!("price {price}"),
                None => "no price".to_string(),
            }
        });
        entries.push(EndpointReport { path, outcome });
    }

    Ok(CheckReport { entries })
}

pub async fn run(args: CheckArgs) -> Result<()> {
    if !args.root.is_dir() {
        bail!("snapshot root {} is not a directory", args.root.display());
    }

    let report = inspect(&SnapshotDir::new(&args.root)).await?;
    for entry in &report.entries {
        println!("{entry}");
    }

    logging::info(
        "check.complete",
        "Snapshot check finished",
        logging::metadata_from_pairs(&[
            ("root", json!(args.root.display().to_string())),
            ("parsed", json!(report.parsed())),
            ("missing", json!(report.missing())),
            ("invalid", json!(report.invalid())),
        ]),
    );

    if report.invalid() > 0 {
        bail!("{} snapshot file(s) failed to parse", report.invalid());
    }
    Ok(())
}
