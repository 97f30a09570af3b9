//! Display model for the single-stock page.

use super::classify::{
    BandPosition, ChangeClass, MaSignal, Market, RsiZone, Tier, VolatilityLevel,
};
use super::constants::{MISSING_VALUE, RELATED_STOCKS_LIMIT};
use super::format::{
    format_change, format_confidence, format_full_datetime, format_percent, format_price,
    format_time_of_day, format_volume,
};
use super::source::FetchError;
use super::types::{ChartData, HistoricalData, MajorIndices, Prediction, StockRecord};

pub const MISSING_SYMBOL_TEXT: &str = "銘柄コードが指定されていません";

/// Symbol from `?s=` or, failing that, the last path segment.
pub fn symbol_from_location(query: Option<&str>, path: &str) -> Option<String> {
    if let Some(symbol) = query.map(str::trim).filter(|s| !s.is_empty()) {
        return Some(symbol.to_string());
    }
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && *segment != "stocks" && *segment != "detail")
        .map(str::to_string)
}

pub fn not_found_message(symbol: &str) -> String {
    format!("銘柄 \"{symbol}\" が見つかりません")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartPeriod {
    #[default]
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl ChartPeriod {
    pub const ALL: [ChartPeriod; 5] = [
        ChartPeriod::Day,
        ChartPeriod::Week,
        ChartPeriod::Month,
        ChartPeriod::Quarter,
        ChartPeriod::Year,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ChartPeriod::Day => "1d",
            ChartPeriod::Week => "1w",
            ChartPeriod::Month => "1m",
            ChartPeriod::Quarter => "3m",
            ChartPeriod::Year => "1y",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChartPeriod::Day => "1日間",
            ChartPeriod::Week => "1週間",
            ChartPeriod::Month => "1ヶ月",
            ChartPeriod::Quarter => "3ヶ月",
            ChartPeriod::Year => "1年間",
        }
    }

    pub fn axis_title(self) -> &'static str {
        match self {
            ChartPeriod::Day => "時刻",
            _ => "日付",
        }
    }
}

pub fn chart_title(name: &str, period: ChartPeriod) -> String {
    format!("{name} - {}の価格推移", period.label())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesOrigin {
    Historical,
    /// 30-day closes from `chart_data.json`, shown for any period.
    ThirtyDay,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub origin: SeriesOrigin,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// Chart points for `period`: historical data first, then the 30-day series.
/// `None` means the chart is still being prepared.
pub fn series_for_period(
    symbol: &str,
    period: ChartPeriod,
    historical: Option<&HistoricalData>,
    charts: Option<&ChartData>,
) -> Option<PriceSeries> {
    let from_history = historical
        .and_then(|data| data.period(symbol, period.key()))
        .map(|points| {
            let (labels, values) = points
                .iter()
                .filter_map(|point| {
                    let close = point.close?;
                    let label = match period {
                        ChartPeriod::Day => point.timestamp.and_then(format_time_of_day),
                        _ => point.date.clone(),
                    };
                    Some((label.unwrap_or_default(), close))
                })
                .unzip();
            PriceSeries {
                origin: SeriesOrigin::Historical,
                labels,
                values,
            }
        })
        .filter(|series| !series.values.is_empty());

    from_history.or_else(|| {
        charts
            .and_then(|charts| charts.series(symbol))
            .filter(|series| !series.values.is_empty())
            .map(|series| PriceSeries {
                origin: SeriesOrigin::ThirtyDay,
                labels: (0..series.values.len())
                    .map(|idx| series.labels.get(idx).cloned().unwrap_or_default())
                    .collect(),
                values: series.values.clone(),
            })
    })
}

/// Up to four other records of the same market.
pub fn related_stocks<'a>(indices: &'a MajorIndices, record: &StockRecord) -> Vec<&'a StockRecord> {
    let market = record.market();
    indices
        .records()
        .filter(|other| other.symbol != record.symbol && other.market() == market)
        .take(RELATED_STOCKS_LIMIT)
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceSection {
    pub price: String,
    pub change: String,
    pub percent: String,
    pub class: ChangeClass,
    pub previous_close: String,
    pub volume: String,
    pub week52_high: String,
    pub week52_low: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRow {
    pub label: &'static str,
    pub value: String,
    pub confidence: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionPanel {
    pub ensemble: Option<PredictionRow>,
    pub methods: Vec<PredictionRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RsiReading {
    pub value: String,
    pub width: String,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPanel {
    pub rsi: Option<RsiReading>,
    pub ma20: Option<(String, &'static str)>,
    pub band: Option<(String, &'static str)>,
    pub volatility: Option<(String, &'static str)>,
}

/// A resolved stock with its classification.
#[derive(Debug, Clone, PartialEq)]
pub struct StockDetail {
    pub record: StockRecord,
    pub market: Market,
    pub tier: Tier,
}

impl StockDetail {
    pub fn find(indices: &MajorIndices, symbol: &str) -> Option<StockDetail> {
        indices.find(symbol).cloned().map(StockDetail::new)
    }

    pub fn new(record: StockRecord) -> StockDetail {
        StockDetail {
            market: record.market(),
            tier: record.tier.unwrap_or_default(),
            record,
        }
    }

    pub fn name(&self) -> &str {
        self.record.display_name()
    }

    pub fn updated(&self) -> Option<String> {
        self.record
            .updated_at
            .as_deref()
            .and_then(format_full_datetime)
            .map(|formatted| format!("更新時刻: {formatted} JST"))
    }

    fn price(&self, value: Option<f64>) -> String {
        format_price(value, self.market)
    }

    pub fn price_section(&self) -> PriceSection {
        let record = &self.record;
        let optional_price = |value: Option<f64>| match value.filter(|v| *v != 0.0) {
            Some(value) => self.price(Some(value)),
            None => MISSING_VALUE.to_string(),
        };
        PriceSection {
            price: self.price(record.price),
            change: format_change(record.change),
            percent: format!("({})", format_percent(record.change_percent)),
            class: ChangeClass::of(record.change),
            previous_close: self.price(record.price.map(|p| p - record.change.unwrap_or(0.0))),
            volume: format_volume(record.volume),
            week52_high: optional_price(record.fifty_two_week_high),
            week52_low: optional_price(record.fifty_two_week_low),
        }
    }

    fn prediction_row(&self, label: &'static str, prediction: &Prediction) -> PredictionRow {
        PredictionRow {
            label,
            value: self.price(prediction.value),
            confidence: format_confidence(prediction.confidence),
        }
    }

    /// `None` hides the section.
    pub fn predictions(&self) -> Option<PredictionPanel> {
        let predictions = self.record.predictions.as_ref()?;
        let methods = [
            ("移動平均", predictions.moving_avg.as_ref()),
            ("線形回帰", predictions.linear_reg.as_ref()),
            ("モメンタム", predictions.momentum.as_ref()),
            ("ボリンジャー", predictions.bbands.as_ref()),
        ];
        Some(PredictionPanel {
            ensemble: predictions.ensemble.as_ref().map(|ensemble| {
                let mut row = self.prediction_row("アンサンブル", ensemble);
                row.confidence = format!("信頼度: {}", row.confidence);
                row
            }),
            methods: methods
                .into_iter()
                .filter_map(|(label, prediction)| {
                    prediction.map(|prediction| self.prediction_row(label, prediction))
                })
                .collect(),
        })
    }

    pub fn indicators(&self) -> Option<IndicatorPanel> {
        let indicators = self.record.indicators.as_ref()?;
        Some(IndicatorPanel {
            rsi: indicators.rsi.map(|rsi| RsiReading {
                value: format!("{rsi:.1}"),
                width: format!("{}%", rsi.clamp(0.0, 100.0)),
                color: RsiZone::of(rsi).bar_color(),
            }),
            ma20: indicators.ma20.map(|ma20| {
                let price = self.record.price.unwrap_or(f64::NAN);
                (self.price(Some(ma20)), MaSignal::of(price, ma20).label())
            }),
            band: indicators.bb_position.map(|position| {
                (format!("{:.1}%", position * 100.0), BandPosition::of(position).label())
            }),
            volatility: indicators.volatility.map(|volatility| {
                (
                    format!("{:.2}%", volatility * 100.0),
                    VolatilityLevel::of(volatility).label(),
                )
            }),
        })
    }
}

/// What the detail page shows for the current symbol and index payload.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Loading,
    Ready(StockDetail),
    /// Message for the error overlay.
    Error(String),
}

pub fn resolve_detail(
    symbol: Option<&str>,
    indices: Option<&Result<MajorIndices, FetchError>>,
) -> DetailState {
    let Some(symbol) = symbol else {
        return DetailState::Error(MISSING_SYMBOL_TEXT.to_string());
    };
    match indices {
        None => DetailState::Loading,
        Some(Err(FetchError::Http(status))) => {
            DetailState::Error(format!("データ取得エラー: {status}"))
        }
        Some(Err(err)) => DetailState::Error(err.to_string()),
        Some(Ok(indices)) => StockDetail::find(indices, symbol)
            .map(DetailState::Ready)
            .unwrap_or_else(|| DetailState::Error(not_found_message(symbol))),
    }
}

pub fn watch_button_label(watched: bool) -> &'static str {
    if watched { "ウォッチ中" } else { "ウォッチリスト" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::types::Snapshot;

    const INDICES: &str = r#"{"indices": {
        "japan": {
            "7203.T": {"name": "トヨタ自動車", "price": 2850, "change": -15, "change_percent": -0.52,
                       "volume": 15000000, "tier": "core", "fifty_two_week_high": 3891,
                       "updated_at": "2024-05-22T06:30:00Z",
                       "indicators": {"rsi": 72.4, "ma20": 2700, "bb_position": 0.15, "volatility": 0.031},
                       "predictions": {"ensemble": {"value": 2900, "confidence": 0.82}, "momentum": {"value": 2880, "confidence": 0.6}}},
            "6758.T": {"price": 13000},
            "^N225": {"price": 38000}
        },
        "us": {"AAPL": {"price": 190.5}, "9984.T": {"price": 8000}}
    }}"#;

    fn indices() -> MajorIndices {
        MajorIndices::from_body(INDICES).expect("indices")
    }

    #[test]
    fn symbol_comes_from_query_or_path() {
        assert_eq!(symbol_from_location(Some("AAPL"), "/stocks/detail"), Some("AAPL".into()));
        assert_eq!(symbol_from_location(None, "/stocks/7203.T"), Some("7203.T".into()));
        assert_eq!(symbol_from_location(Some(" "), "/stocks/"), None);
        assert_eq!(symbol_from_location(None, "/stocks/detail"), None);
    }

    #[test]
    fn detail_state_reports_missing_symbols() {
        let indices = Ok(indices());
        assert_eq!(
            resolve_detail(None, Some(&indices)),
            DetailState::Error(MISSING_SYMBOL_TEXT.to_string())
        );
        assert_eq!(resolve_detail(Some("AAPL"), None), DetailState::Loading);
        assert_eq!(
            resolve_detail(Some("MSFT"), Some(&indices)),
            DetailState::Error("銘柄 \"MSFT\" が見つかりません".to_string())
        );
        assert_eq!(
            resolve_detail(Some("AAPL"), Some(&Err(FetchError::Http(503)))),
            DetailState::Error("データ取得エラー: 503".to_string())
        );
        assert!(matches!(
            resolve_detail(Some("AAPL"), Some(&indices)),
            DetailState::Ready(detail) if detail.market == Market::Us
        ));
    }

    #[test]
    fn price_section_formats_values() {
        let detail = StockDetail::find(&indices(), "7203.T").expect("toyota");
        assert_eq!(detail.market, Market::Jp);
        assert_eq!(detail.tier, Tier::Core);
        assert_eq!(detail.updated().as_deref(), Some("更新時刻: 2024/05/22 15:30:00 JST"));

        let section = detail.price_section();
        assert_eq!(section.price, "¥2,850");
        assert_eq!(section.change, "-15");
        assert_eq!(section.percent, "(-0.52%)");
        assert_eq!(section.class, ChangeClass::Negative);
        assert_eq!(section.previous_close, "¥2,865");
        assert_eq!(section.volume, "15.0M");
        assert_eq!(section.week52_high, "¥3,891");
        assert_eq!(section.week52_low, MISSING_VALUE);
    }

    #[test]
    fn predictions_and_indicators() {
        let detail = StockDetail::find(&indices(), "7203.T").expect("toyota");
        let predictions = detail.predictions().expect("predictions");
        let ensemble = predictions.ensemble.expect("ensemble");
        assert_eq!(ensemble.value, "¥2,900");
        assert_eq!(ensemble.confidence, "信頼度: 82.0%");
        assert_eq!(predictions.methods.len(), 1);
        assert_eq!(predictions.methods[0].label, "モメンタム");

        let indicators = detail.indicators().expect("indicators");
        let rsi = indicators.rsi.expect("rsi");
        assert_eq!(rsi.value, "72.4");
        assert_eq!(rsi.color, "#f59e0b");
        assert_eq!(indicators.ma20, Some(("¥2,700".to_string(), "🔼 強気")));
        assert_eq!(indicators.band.map(|b| b.1), Some("⚠️ 下限近く"));
        assert_eq!(indicators.volatility, Some(("3.10%".to_string(), "📈 通常")));

        let bare = StockDetail::find(&indices(), "6758.T").expect("sony");
        assert!(bare.predictions().is_none());
        assert!(bare.indicators().is_none());
    }

    #[test]
    fn related_stocks_share_market() {
        let indices = indices();
        let toyota = indices.find("7203.T").expect("toyota");
        let related: Vec<_> = related_stocks(&indices, toyota)
            .into_iter()
            .map(|r| r.symbol.as_str())
            .collect();
        assert_eq!(related, vec!["6758.T", "9984.T"]);
    }

    #[test]
    fn chart_series_falls_back_to_thirty_day_data() {
        let historical = HistoricalData::from_body(
            r#"{"AAPL": {"periods": {
                "1d": [{"timestamp": 1716359400, "close": 190.1}, {"timestamp": 1716361200, "close": null}, {"timestamp": 1716363000, "close": 191.0}],
                "1m": [{"date": "2024-05-01", "close": 180}]
            }}}"#,
        )
        .expect("historical");
        let charts = ChartData::from_body(
            r#"{"charts": {"AAPL": {"labels": ["05-01", "05-02"], "datasets": [{"data": [180, 182]}]}}}"#,
        )
        .expect("charts");

        let day = series_for_period("AAPL", ChartPeriod::Day, Some(&historical), Some(&charts))
            .expect("day");
        assert_eq!(day.origin, SeriesOrigin::Historical);
        assert_eq!(day.labels, vec!["15:30", "16:30"]);
        assert_eq!(day.values, vec![190.1, 191.0]);

        let month = series_for_period("AAPL", ChartPeriod::Month, Some(&historical), None)
            .expect("month");
        assert_eq!(month.labels, vec!["2024-05-01"]);

        let year = series_for_period("AAPL", ChartPeriod::Year, Some(&historical), Some(&charts))
            .expect("year");
        assert_eq!(year.origin, SeriesOrigin::ThirtyDay);
        assert_eq!(year.values, vec![180.0, 182.0]);

        assert!(series_for_period("MSFT", ChartPeriod::Day, Some(&historical), Some(&charts)).is_none());
        assert_eq!(chart_title("Apple", ChartPeriod::Quarter), "Apple - 3ヶ月の価格推移");
    }
}
