use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use dashboard_frontend::market::source::{fetch_snapshot, FetchError};
use dashboard_frontend::market::sparkline::Trend;
use dashboard_frontend::market::types::{ChartData, ChartSeries, Snapshot};
use textplots::{Chart, Plot, Shape};

use crate::constants::{
    DEFAULT_CHART_HEIGHT, DEFAULT_CHART_WIDTH, DEFAULT_SNAPSHOT_ROOT, MIN_CHART_HEIGHT,
    MIN_CHART_WIDTH,
};
use crate::snapshot_dir::SnapshotDir;

#[derive(Debug, Args, Clone)]
pub struct ChartArgs {
    /// Snapshot directory holding `data/chart_data.json`
    #[arg(long, default_value = DEFAULT_SNAPSHOT_ROOT)]
    pub root: PathBuf,

    /// Plot only the provided symbol (defaults to the longest series)
    #[arg(short, long)]
    pub symbol: Option<String>,

    /// Chart width in characters
    #[arg(long, default_value_t = DEFAULT_CHART_WIDTH)]
    pub width: u32,

    /// Chart height in characters
    #[arg(long, default_value_t = DEFAULT_CHART_HEIGHT)]
    pub height: u32,
}

pub async fn run(args: ChartArgs) -> Result<()> {
    let dir = SnapshotDir::new(&args.root);
    let charts = match fetch_snapshot::<ChartData, _>(&dir).await {
        Ok(charts) => charts,
        Err(FetchError::Http(_)) => bail!(
            "{} not found; run `check --root {}` to inspect the snapshot directory",
            dir.file_for(&ChartData::endpoint()).display(),
            args.root.display()
        ),
        Err(err) => {
            return Err(err).with_context(|| {
                format!("failed to read {}", dir.file_for(&ChartData::endpoint()).display())
            })
        }
    };

    let (symbol, series) = pick_series(&charts, args.symbol.as_deref())?;
    if series.values.len() < 2 {
        bail!("not enough data points to render a chart for {symbol}");
    }

    render_chart(symbol, series, args.width, args.height);
    Ok(())
}

/// The requested series, or the longest one when no symbol is given.
pub fn pick_series<'a>(
    charts: &'a ChartData,
    symbol: Option<&str>,
) -> Result<(&'a str, &'a ChartSeries)> {
    match symbol {
        Some(symbol) => charts
            .charts
            .get_key_value(symbol)
            .map(|(key, series)| (key.as_str(), series))
            .with_context(|| format!("no chart series for symbol {symbol}")),
        None => charts
            .charts
            .iter()
            .max_by_key(|(_, series)| series.values.len())
            .map(|(key, series)| (key.as_str(), series))
            .context("chart data holds no series"),
    }
}

/// Direction of the series from its first to its last close.
pub fn series_trend(values: &[f64]) -> Trend {
    match (values.first(), values.last()) {
        (Some(first), Some(last)) => Trend::between(*first, *last),
        _ => Trend::Neutral,
    }
}

fn render_chart(symbol: &str, series: &ChartSeries, width: u32, height: u32) {
    let title = series.name.as_deref().unwrap_or(symbol);
    println!(
        "Rendering 30-day closes for {title} ({symbol}, {} samples)",
        series.values.len()
    );

    let min_price = series.values.iter().copied().fold(f64::INFINITY, f64::min);
    let max_price = series
        .values
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    println!("Price range: {:.2} → {:.2}", min_price, max_price);

    if let (Some(first), Some(last)) = (series.labels.first(), series.labels.last()) {
        println!("Period: {first} → {last}");
    }

    let samples: Vec<(f32, f32)> = series
        .values
        .iter()
        .enumerate()
        .map(|(index, price)| (index as f32, *price as f32))
        .collect();
    let max_x = (series.values.len() - 1) as f32;

    Chart::new(width.max(MIN_CHART_WIDTH), height.max(MIN_CHART_HEIGHT), 0.0, max_x)
        .lineplot(&Shape::Lines(&samples))
        .display();
    println!();
    println!("Trend: {}", series_trend(&series.values).as_str());
}
