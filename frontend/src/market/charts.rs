//! Dashboard grid of 30-day closing-price charts from `/data/chart_data.json`.

use chrono::{Datelike, NaiveDate};

use super::classify::{ChangeClass, Market};
use super::format::{format_price, format_signed_percent};
use super::source::FetchError;
use super::sparkline::SparklineInput;
use super::types::{ChartData, ChartSeries};

pub const CHART_LOAD_ERROR_TEXT: &str = "⚠️ チャートデータの読み込みに失敗しました";

/// `2024-05-01` as `5/1`. Labels that are not ISO dates pass through.
pub fn short_date(label: &str) -> String {
    match NaiveDate::parse_from_str(label.trim(), "%Y-%m-%d") {
        Ok(date) => format!("{}/{}", date.month(), date.day()),
        Err(_) => label.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartCard {
    pub ticker: String,
    pub title: String,
    /// First and last label, e.g. `5/1 〜 5/30`.
    pub range: Option<String>,
    pub last_close: String,
    /// Change over the whole window.
    pub window_change: String,
    pub class: ChangeClass,
    pub values: Vec<f64>,
}

impl ChartCard {
    pub fn from_series(ticker: &str, series: &ChartSeries) -> ChartCard {
        let name = series.name.as_deref().unwrap_or(ticker);
        let range = match (series.labels.first(), series.labels.last()) {
            (Some(first), Some(last)) => {
                Some(format!("{} 〜 {}", short_date(first), short_date(last)))
            }
            _ => None,
        };
        let window = match (series.values.first(), series.values.last()) {
            (Some(first), Some(last)) if *first != 0.0 && series.values.len() > 1 => {
                Some((last - first) / first * 100.0)
            }
            _ => None,
        };

        ChartCard {
            ticker: ticker.to_string(),
            title: format!("{name} - 過去30日"),
            range,
            last_close: format_price(series.values.last().copied(), Market::detect(ticker)),
            window_change: format_signed_percent(window),
            class: ChangeClass::of(window),
            values: series.values.clone(),
        }
    }

    pub fn sparkline_input(&self) -> SparklineInput {
        SparklineInput::Series(self.values.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartGrid {
    Loading,
    Ready(Vec<ChartCard>),
    Failed,
}

/// Cards in document order. A failed load replaces the whole grid with one
/// error block.
pub fn chart_grid(loaded: Option<&Result<ChartData, FetchError>>) -> ChartGrid {
    match loaded {
        None => ChartGrid::Loading,
        Some(Err(_)) => ChartGrid::Failed,
        Some(Ok(data)) => ChartGrid::Ready(
            data.charts
                .iter()
                .map(|(ticker, series)| ChartCard::from_series(ticker, series))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::types::Snapshot;

    fn data() -> ChartData {
        ChartData::from_body(
            r#"{"charts": {
                "7203.T": {"name": "トヨタ自動車", "labels": ["2024-05-01", "2024-05-30"],
                           "datasets": [{"data": [2800, 2940]}]},
                "AAPL": {"labels": [], "datasets": []}
            }}"#,
        )
        .expect("chart data")
    }

    #[test]
    fn short_date_drops_year_and_padding() {
        assert_eq!(short_date("2024-05-01"), "5/1");
        assert_eq!(short_date("2024-12-25"), "12/25");
        assert_eq!(short_date("05/01"), "05/01");
    }

    #[test]
    fn cards_follow_document_order() {
        let ChartGrid::Ready(cards) = chart_grid(Some(&Ok(data()))) else {
            panic!("expected ready grid");
        };
        assert_eq!(cards.len(), 2);

        let toyota = &cards[0];
        assert_eq!(toyota.title, "トヨタ自動車 - 過去30日");
        assert_eq!(toyota.range.as_deref(), Some("5/1 〜 5/30"));
        assert_eq!(toyota.last_close, "¥2,940");
        assert_eq!(toyota.window_change, "+5.00%");
        assert_eq!(toyota.class, ChangeClass::Positive);

        let apple = &cards[1];
        assert_eq!(apple.title, "AAPL - 過去30日");
        assert_eq!(apple.range, None);
        assert_eq!(apple.last_close, "---");
        assert_eq!(apple.class, ChangeClass::Neutral);
        assert_eq!(apple.sparkline_input(), SparklineInput::Series(Vec::new()));
    }

    #[test]
    fn failed_load_is_a_single_error_state() {
        assert_eq!(chart_grid(None), ChartGrid::Loading);
        assert_eq!(
            chart_grid(Some(&Err(FetchError::Http(404)))),
            ChartGrid::Failed
        );
    }
}
