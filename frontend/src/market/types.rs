use std::collections::HashMap;

use indexmap::IndexMap;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};

use super::classify::{Market, Tier};
use super::source::Endpoint;

/// Accepts a JSON number, a numeric string or null. Non-finite values read as missing.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Other(IgnoredAny),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(value)) => Some(value),
        Some(Raw::Text(text)) => text.trim().parse::<f64>().ok(),
        Some(Raw::Other(_)) | None => None,
    }
    .filter(|value| value.is_finite()))
}

/// Unix seconds written as an integer, a float or a numeric string. The
/// fractional part is dropped.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(deserializer)?.map(|seconds| seconds.trunc() as i64))
}

/// Timestamps arrive either as strings or as unix seconds/milliseconds.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
        Float(f64),
        Other(IgnoredAny),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(text)) if !text.trim().is_empty() => Some(text),
        Some(Raw::Integer(value)) => Some(value.to_string()),
        Some(Raw::Float(value)) if value.is_finite() => Some((value as i64).to_string()),
        _ => None,
    })
}

/// One element of a price history as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum HistorySample {
    Scalar(f64),
    Record { value: f64 },
    Candle { close: f64 },
    Pair(f64, f64),
    Unrecognized(IgnoredAny),
}

impl HistorySample {
    fn value(&self) -> Option<f64> {
        match self {
            HistorySample::Scalar(value)
            | HistorySample::Record { value }
            | HistorySample::Candle { close: value }
            | HistorySample::Pair(_, value) => Some(*value).filter(|v| v.is_finite()),
            HistorySample::Unrecognized(_) => None,
        }
    }
}

fn normalize_history(samples: Option<Vec<HistorySample>>) -> Vec<f64> {
    samples
        .unwrap_or_default()
        .iter()
        .filter_map(HistorySample::value)
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Predictions {
    #[serde(default)]
    pub ensemble: Option<Prediction>,
    #[serde(default)]
    pub moving_avg: Option<Prediction>,
    #[serde(default)]
    pub linear_reg: Option<Prediction>,
    #[serde(default)]
    pub momentum: Option<Prediction>,
    #[serde(default)]
    pub bbands: Option<Prediction>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Indicators {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rsi: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ma20: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub bb_position: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub volatility: Option<f64>,
}

/// Wire shape shared by every quote-like payload. Field spellings differ per
/// endpoint, so each variant is captured separately and resolved in `normalize`.
#[derive(Debug, Clone, Default, Deserialize)]
struct RawQuote {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    ticker: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    current_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    change: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    change_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    change_pct: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pct: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    volume: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    market_cap: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    trading_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    dividend_yield: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pe_ratio: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    per: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pbr: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    roa: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    roe: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    employees: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    deviation: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    deviation_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    fifty_two_week_high: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    fifty_two_week_low: Option<f64>,
    #[serde(default)]
    cross_signal: Option<String>,
    #[serde(default)]
    cross_type: Option<String>,
    #[serde(default)]
    stop_status: Option<String>,
    #[serde(default)]
    stop_type: Option<String>,
    #[serde(default)]
    year_status: Option<String>,
    #[serde(default)]
    tier: Option<String>,
    #[serde(default)]
    market: Option<String>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    trend: Option<String>,
    #[serde(default)]
    price_formatted: Option<String>,
    #[serde(default)]
    change_formatted: Option<String>,
    #[serde(default)]
    history: Option<Vec<HistorySample>>,
    #[serde(default)]
    spark: Option<Vec<HistorySample>>,
    #[serde(default)]
    indicators: Option<Indicators>,
    #[serde(default)]
    predictions: Option<Predictions>,
    #[serde(default, rename = "updatedAt", deserialize_with = "lenient_string")]
    updated_at_camel: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    updated_at: Option<String>,
}

/// Normalized stock/quote record consumed by every renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StockRecord {
    pub symbol: String,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub volume: Option<f64>,
    pub market_cap: Option<f64>,
    pub trading_value: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub pbr: Option<f64>,
    pub roa: Option<f64>,
    pub roe: Option<f64>,
    pub employees: Option<f64>,
    pub deviation: Option<f64>,
    pub confidence: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub cross_signal: Option<String>,
    pub stop_status: Option<String>,
    pub year_status: Option<String>,
    pub tier: Option<Tier>,
    pub market_hint: Option<Market>,
    pub currency: Option<String>,
    pub trend: Option<String>,
    pub price_formatted: Option<String>,
    pub change_formatted: Option<String>,
    pub history: Vec<f64>,
    pub indicators: Option<Indicators>,
    pub predictions: Option<Predictions>,
    pub updated_at: Option<String>,
}

impl StockRecord {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.symbol)
    }

    /// Market category, preferring an explicit hint from the payload.
    pub fn market(&self) -> Market {
        self.market_hint
            .unwrap_or_else(|| Market::detect(&self.symbol))
    }

    /// Confidence used for list sorting, falling back to the ensemble prediction.
    pub fn sort_confidence(&self) -> Option<f64> {
        self.confidence.or_else(|| {
            self.predictions
                .as_ref()
                .and_then(|predictions| predictions.ensemble)
                .and_then(|ensemble| ensemble.confidence)
        })
    }

    fn normalize(raw: RawQuote, fallback_symbol: Option<&str>) -> Self {
        let symbol = raw
            .symbol
            .or(raw.ticker)
            .filter(|symbol| !symbol.is_empty())
            .or_else(|| fallback_symbol.map(str::to_string))
            .unwrap_or_default();
        StockRecord {
            symbol,
            name: raw.name,
            price: raw.price.or(raw.current_price),
            change: raw.change,
            change_percent: raw.change_percent.or(raw.change_pct).or(raw.pct),
            volume: raw.volume,
            market_cap: raw.market_cap,
            trading_value: raw.trading_value,
            dividend_yield: raw.dividend_yield,
            pe_ratio: raw.pe_ratio.or(raw.per),
            pbr: raw.pbr,
            roa: raw.roa,
            roe: raw.roe,
            employees: raw.employees,
            deviation: raw.deviation.or(raw.deviation_rate),
            confidence: raw.confidence,
            fifty_two_week_high: raw.fifty_two_week_high,
            fifty_two_week_low: raw.fifty_two_week_low,
            cross_signal: raw.cross_signal.or(raw.cross_type),
            stop_status: raw.stop_status.or(raw.stop_type),
            year_status: raw.year_status,
            tier: raw.tier.as_deref().and_then(Tier::parse),
            market_hint: raw.market.as_deref().and_then(Market::parse),
            currency: raw.currency,
            trend: raw.trend,
            price_formatted: raw.price_formatted,
            change_formatted: raw.change_formatted,
            history: normalize_history(raw.history.or(raw.spark)),
            indicators: raw.indicators,
            predictions: raw.predictions,
            updated_at: raw.updated_at.or(raw.updated_at_camel),
        }
    }
}

impl<'de> Deserialize<'de> for StockRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawQuote::deserialize(deserializer).map(|raw| StockRecord::normalize(raw, None))
    }
}

/// Parses a snapshot body into its normalized shape.
pub trait Snapshot: Sized {
    fn endpoint() -> Endpoint;

    fn from_body(body: &str) -> Result<Self, serde_json::Error>;
}

fn parse_as<T: DeserializeOwned>(body: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(body)
}

/// `/data/realtime_prices.json`: domestic indices plus a `foreign` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RealtimeSnapshot {
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub indices: Vec<StockRecord>,
    #[serde(default)]
    pub foreign: Vec<StockRecord>,
    #[serde(default)]
    pub stocks: Vec<StockRecord>,
}

impl RealtimeSnapshot {
    pub fn find(&self, symbol: &str) -> Option<&StockRecord> {
        self.indices
            .iter()
            .chain(&self.foreign)
            .chain(&self.stocks)
            .find(|record| record.symbol == symbol)
    }
}

impl Snapshot for RealtimeSnapshot {
    fn endpoint() -> Endpoint {
        Endpoint::RealtimePrices
    }

    fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        parse_as(body)
    }
}

/// `/api/summary.json`: the older hero payload carrying `spark` series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummarySnapshot {
    #[serde(default, rename = "updatedAt", alias = "updated_at", deserialize_with = "lenient_string")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub indices: Vec<StockRecord>,
}

impl Snapshot for SummarySnapshot {
    fn endpoint() -> Endpoint {
        Endpoint::Summary
    }

    fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        parse_as(body)
    }
}

/// `/api/major_indices.json`: region → symbol → quote.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MajorIndices {
    pub updated_at: Option<String>,
    pub regions: IndexMap<String, Vec<StockRecord>>,
}

impl MajorIndices {
    pub fn records(&self) -> impl Iterator<Item = &StockRecord> {
        self.regions.values().flatten()
    }

    pub fn find(&self, symbol: &str) -> Option<&StockRecord> {
        self.records().find(|record| record.symbol == symbol)
    }
}

impl Snapshot for MajorIndices {
    fn endpoint() -> Endpoint {
        Endpoint::MajorIndices
    }

    fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        struct Document {
            #[serde(default)]
            indices: IndexMap<String, IndexMap<String, RawQuote>>,
            #[serde(default, alias = "updatedAt", alias = "timestamp", deserialize_with = "lenient_string")]
            updated_at: Option<String>,
        }

        let document: Document = parse_as(body)?;
        let regions = document
            .indices
            .into_iter()
            .map(|(region, quotes)| {
                let records = quotes
                    .into_iter()
                    .map(|(symbol, raw)| StockRecord::normalize(raw, Some(&symbol)))
                    .collect();
                (region, records)
            })
            .collect();

        Ok(MajorIndices {
            updated_at: document.updated_at,
            regions,
        })
    }
}

/// A ranking category body: either a bare list or a wrapper object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CategoryPayload {
    Records(Vec<StockRecord>),
    Wrapped {
        #[serde(alias = "data", alias = "items")]
        stocks: Vec<StockRecord>,
    },
    Other(IgnoredAny),
}

impl CategoryPayload {
    fn into_records(self) -> Option<Vec<StockRecord>> {
        match self {
            CategoryPayload::Records(records) | CategoryPayload::Wrapped { stocks: records } => {
                Some(records)
            }
            CategoryPayload::Other(_) => None,
        }
    }
}

fn collect_categories(
    entries: impl IntoIterator<Item = (String, CategoryPayload)>,
) -> IndexMap<String, Vec<StockRecord>> {
    entries
        .into_iter()
        .filter_map(|(key, payload)| payload.into_records().map(|records| (key, records)))
        .collect()
}

/// Named arrays of records under category keys. Rebuilt wholesale per poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankingSet {
    pub updated_at: Option<String>,
    pub categories: IndexMap<String, Vec<StockRecord>>,
}

impl RankingSet {
    pub fn category(&self, key: &str) -> Option<&[StockRecord]> {
        self.categories.get(key).map(Vec::as_slice)
    }

    pub fn find(&self, symbol: &str) -> Option<&StockRecord> {
        self.categories
            .values()
            .flatten()
            .find(|record| record.symbol == symbol)
    }

    fn parse(body: &str) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        struct Document {
            #[serde(default)]
            rankings: Option<IndexMap<String, CategoryPayload>>,
            #[serde(default, alias = "updatedAt", alias = "timestamp", deserialize_with = "lenient_string")]
            updated_at: Option<String>,
            #[serde(flatten)]
            rest: IndexMap<String, CategoryPayload>,
        }

        let document: Document = parse_as(body)?;
        let categories = match document.rankings {
            Some(rankings) => collect_categories(rankings),
            None => collect_categories(document.rest),
        };
        Ok(RankingSet {
            updated_at: document.updated_at,
            categories,
        })
    }
}

/// `/api/rankings.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rankings(pub RankingSet);

impl Snapshot for Rankings {
    fn endpoint() -> Endpoint {
        Endpoint::Rankings
    }

    fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        RankingSet::parse(body).map(Rankings)
    }
}

/// `/api/extended_rankings.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtendedRankings(pub RankingSet);

impl Snapshot for ExtendedRankings {
    fn endpoint() -> Endpoint {
        Endpoint::ExtendedRankings
    }

    fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        RankingSet::parse(body).map(ExtendedRankings)
    }
}

/// `/api/period_rankings.json`: period key → ranking set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeriodRankings {
    pub updated_at: Option<String>,
    pub periods: IndexMap<String, RankingSet>,
}

impl PeriodRankings {
    pub fn period(&self, key: &str) -> Option<&RankingSet> {
        self.periods.get(key)
    }
}

impl Snapshot for PeriodRankings {
    fn endpoint() -> Endpoint {
        Endpoint::PeriodRankings
    }

    fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum PeriodPayload {
            Categories(IndexMap<String, CategoryPayload>),
            Other(IgnoredAny),
        }

        #[derive(Deserialize)]
        struct Document {
            #[serde(default)]
            periods: Option<IndexMap<String, IndexMap<String, CategoryPayload>>>,
            #[serde(default, alias = "updatedAt", alias = "timestamp", deserialize_with = "lenient_string")]
            updated_at: Option<String>,
            #[serde(flatten)]
            rest: IndexMap<String, PeriodPayload>,
        }

        let document: Document = parse_as(body)?;
        let periods: Vec<(String, IndexMap<String, CategoryPayload>)> = match document.periods {
            Some(periods) => periods.into_iter().collect(),
            None => document
                .rest
                .into_iter()
                .filter_map(|(key, payload)| match payload {
                    PeriodPayload::Categories(categories) => Some((key, categories)),
                    PeriodPayload::Other(_) => None,
                })
                .collect(),
        };

        Ok(PeriodRankings {
            updated_at: document.updated_at.clone(),
            periods: periods
                .into_iter()
                .map(|(key, categories)| {
                    (
                        key,
                        RankingSet {
                            updated_at: document.updated_at.clone(),
                            categories: collect_categories(categories),
                        },
                    )
                })
                .collect(),
        })
    }
}

/// `/api/stocks/index.json`: either a bare array or `{ "stocks": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StockIndex {
    pub stocks: Vec<StockRecord>,
}

impl Snapshot for StockIndex {
    fn endpoint() -> Endpoint {
        Endpoint::StockIndex
    }

    fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Document {
            List(Vec<StockRecord>),
            Wrapped {
                #[serde(default)]
                stocks: Vec<StockRecord>,
            },
        }

        Ok(match parse_as::<Document>(body)? {
            Document::List(stocks) | Document::Wrapped { stocks } => StockIndex { stocks },
        })
    }
}

/// Tier lookup built from `/api/universe.json`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Universe {
    tiers: HashMap<String, Tier>,
}

impl Universe {
    pub fn tier_of(&self, symbol: &str) -> Tier {
        self.tiers.get(symbol).copied().unwrap_or(Tier::Other)
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

impl Snapshot for Universe {
    fn endpoint() -> Endpoint {
        Endpoint::Universe
    }

    fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Member {
            Listed {
                #[serde(default, alias = "symbol")]
                ticker: Option<String>,
            },
            Other(IgnoredAny),
        }

        impl Member {
            fn into_ticker(self) -> Option<String> {
                match self {
                    Member::Listed { ticker } => ticker.filter(|ticker| !ticker.is_empty()),
                    Member::Other(_) => None,
                }
            }
        }

        #[derive(Deserialize)]
        struct Document {
            #[serde(default)]
            core_universe: Vec<Member>,
            #[serde(default)]
            active_universe: Vec<Member>,
        }

        let document: Document = parse_as(body)?;
        let mut tiers = HashMap::new();
        // Active membership overrides core when a ticker appears in both.
        // Members without a ticker are skipped.
        for ticker in document.core_universe.into_iter().filter_map(Member::into_ticker) {
            tiers.insert(ticker, Tier::Core);
        }
        for ticker in document.active_universe.into_iter().filter_map(Member::into_ticker) {
            tiers.insert(ticker, Tier::Active);
        }
        Ok(Universe { tiers })
    }
}

/// One 30-day series from `/data/chart_data.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: Option<String>,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub charts: IndexMap<String, ChartSeries>,
}

impl ChartData {
    pub fn series(&self, ticker: &str) -> Option<&ChartSeries> {
        self.charts.get(ticker)
    }
}

impl Snapshot for ChartData {
    fn endpoint() -> Endpoint {
        Endpoint::ChartData
    }

    fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        struct Dataset {
            #[serde(default)]
            data: Option<Vec<HistorySample>>,
        }

        #[derive(Deserialize)]
        struct RawChart {
            #[serde(default)]
            name: Option<String>,
            #[serde(default)]
            labels: Vec<String>,
            #[serde(default)]
            datasets: Vec<Dataset>,
        }

        #[derive(Deserialize)]
        struct Document {
            #[serde(default)]
            charts: IndexMap<String, RawChart>,
        }

        let document: Document = parse_as(body)?;
        let charts = document
            .charts
            .into_iter()
            .map(|(ticker, chart)| {
                let values = chart
                    .datasets
                    .into_iter()
                    .next()
                    .map(|dataset| normalize_history(dataset.data))
                    .unwrap_or_default();
                (
                    ticker,
                    ChartSeries {
                        name: chart.name,
                        labels: chart.labels,
                        values,
                    },
                )
            })
            .collect();
        Ok(ChartData { charts })
    }
}

/// A point of `/data/historical_data.json`. Intraday points carry unix seconds,
/// daily points carry a date string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub close: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolHistory {
    #[serde(default)]
    pub periods: IndexMap<String, Vec<HistoricalPoint>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoricalData {
    pub symbols: IndexMap<String, SymbolHistory>,
}

impl HistoricalData {
    pub fn period(&self, symbol: &str, period: &str) -> Option<&[HistoricalPoint]> {
        self.symbols
            .get(symbol)
            .and_then(|history| history.periods.get(period))
            .map(Vec::as_slice)
    }
}

impl Snapshot for HistoricalData {
    fn endpoint() -> Endpoint {
        Endpoint::HistoricalData
    }

    fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Entry {
            History(SymbolHistory),
            Other(IgnoredAny),
        }

        let entries: IndexMap<String, Entry> = parse_as(body)?;
        let symbols = entries
            .into_iter()
            .filter_map(|(symbol, entry)| match entry {
                Entry::History(history) => Some((symbol, history)),
                Entry::Other(_) => None,
            })
            .collect();
        Ok(HistoricalData { symbols })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_record_normalizes_field_spellings() {
        let json = r#"{
            "ticker": "^N225",
            "current_price": "38123.5",
            "change": -120.25,
            "pct": -0.31,
            "volume": null,
            "tier": "core",
            "updatedAt": 1716400005
        }"#;

        let record: StockRecord = serde_json::from_str(json).expect("valid record");
        assert_eq!(record.symbol, "^N225");
        assert_eq!(record.price, Some(38123.5));
        assert_eq!(record.change_percent, Some(-0.31));
        assert_eq!(record.volume, None);
        assert_eq!(record.tier, Some(Tier::Core));
        assert_eq!(record.updated_at.as_deref(), Some("1716400005"));
        assert_eq!(record.market(), Market::Index);
    }

    #[test]
    fn history_accepts_values_records_and_pairs() {
        let json = r#"{
            "symbol": "7203.T",
            "history": [100, {"value": 101.5}, [1716400000, 103], {"close": 99}, null, {"value": "x"}]
        }"#;

        let record: StockRecord = serde_json::from_str(json).expect("valid record");
        assert_eq!(record.history, vec![100.0, 101.5, 103.0, 99.0]);
    }

    #[test]
    fn major_indices_fill_symbol_from_key() {
        let json = r#"{
            "indices": {
                "us": { "^IXIC": { "price": 16000.1, "change": 12.0, "change_percent": 0.08 } },
                "asia": { "^HSI": { "symbol": "^HSI", "name": "Hang Seng", "price": 17000 } }
            }
        }"#;

        let indices = MajorIndices::from_body(json).expect("valid indices");
        assert_eq!(indices.records().count(), 2);
        assert_eq!(indices.find("^IXIC").and_then(|r| r.price), Some(16000.1));
        assert_eq!(indices.find("^HSI").map(StockRecord::display_name), Some("Hang Seng"));
    }

    #[test]
    fn rankings_accept_wrapped_and_flat_documents() {
        let wrapped = r#"{
            "updated_at": "2024-05-22T15:00:00+09:00",
            "rankings": {
                "gainers": [{"symbol": "AAA", "change_percent": 5.0}],
                "volume": {"stocks": [{"symbol": "BBB", "volume": 1000}]}
            }
        }"#;
        let flat = r#"{
            "gainers": [{"symbol": "AAA", "change_percent": 5.0}],
            "losers": [],
            "generated_by": "pipeline"
        }"#;

        let wrapped = Rankings::from_body(wrapped).expect("wrapped").0;
        assert_eq!(wrapped.categories.len(), 2);
        assert_eq!(wrapped.category("volume").map(<[_]>::len), Some(1));
        assert!(wrapped.updated_at.is_some());

        let flat = Rankings::from_body(flat).expect("flat").0;
        let keys: Vec<_> = flat.categories.keys().cloned().collect();
        assert_eq!(keys, vec!["gainers", "losers"]);
    }

    #[test]
    fn period_rankings_group_categories_by_period() {
        let json = r#"{
            "periods": {
                "1w": { "gainers": [{"symbol": "AAA"}], "losers": [{"symbol": "BBB"}] },
                "1m": { "gainers": [] }
            }
        }"#;

        let periods = PeriodRankings::from_body(json).expect("valid periods");
        assert_eq!(periods.periods.len(), 2);
        let week = periods.period("1w").expect("1w");
        assert_eq!(week.category("losers").map(<[_]>::len), Some(1));
    }

    #[test]
    fn stock_index_accepts_both_shapes() {
        let list = StockIndex::from_body(r#"[{"symbol": "AAPL"}]"#).expect("list");
        let wrapped = StockIndex::from_body(r#"{"stocks": [{"symbol": "AAPL"}, {"symbol": "MSFT"}]}"#)
            .expect("wrapped");
        assert_eq!(list.stocks.len(), 1);
        assert_eq!(wrapped.stocks.len(), 2);
    }

    #[test]
    fn universe_prefers_active_membership() {
        let json = r#"{
            "core_universe": [{"ticker": "7203.T"}, {"ticker": "AAPL"}],
            "active_universe": [{"ticker": "AAPL"}]
        }"#;

        let universe = Universe::from_body(json).expect("valid universe");
        assert_eq!(universe.tier_of("7203.T"), Tier::Core);
        assert_eq!(universe.tier_of("AAPL"), Tier::Active);
        assert_eq!(universe.tier_of("MSFT"), Tier::Other);
    }

    #[test]
    fn chart_and_historical_data_parse() {
        let charts = ChartData::from_body(
            r#"{"charts": {"7203.T": {"name": "Toyota", "labels": ["2024-05-01", "2024-05-02"], "datasets": [{"data": [2800, 2850]}]}}}"#,
        )
        .expect("chart data");
        assert_eq!(charts.series("7203.T").map(|s| s.values.clone()), Some(vec![2800.0, 2850.0]));

        let history = HistoricalData::from_body(
            r#"{"AAPL": {"periods": {"1d": [{"timestamp": 1716400000, "close": 190.1}]}}, "meta": "v2"}"#,
        )
        .expect("historical data");
        assert_eq!(history.period("AAPL", "1d").map(<[_]>::len), Some(1));
        assert!(history.period("AAPL", "1w").is_none());
    }

    #[test]
    fn universe_skips_members_without_ticker() {
        let json = r#"{
            "core_universe": [{"ticker": "7203.T"}, {"name": "no ticker"}, "6758.T"],
            "active_universe": [{"ticker": "AAPL"}]
        }"#;

        let universe = Universe::from_body(json).expect("mixed universe");
        assert_eq!(universe.len(), 2);
        assert_eq!(universe.tier_of("7203.T"), Tier::Core);
        assert_eq!(universe.tier_of("AAPL"), Tier::Active);
    }

    #[test]
    fn historical_points_accept_float_and_string_timestamps() {
        let history = HistoricalData::from_body(
            r#"{"AAPL": {"periods": {"1d": [
                {"timestamp": 1716359400.0, "close": 190.1},
                {"timestamp": "1716359700", "close": 190.4},
                {"timestamp": 1716360000, "close": 190.2}
            ]}}}"#,
        )
        .expect("historical data");

        let points = history.period("AAPL", "1d").expect("AAPL intraday history");
        let stamps: Vec<Option<i64>> = points.iter().map(|point| point.timestamp).collect();
        assert_eq!(
            stamps,
            vec![Some(1716359400), Some(1716359700), Some(1716360000)]
        );
        assert_eq!(points[0].close, Some(190.1));
    }
}
