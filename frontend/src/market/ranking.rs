use super::classify::ChangeClass;
use super::constants::{FETCH_ERROR_TEXT, LOADING_TEXT, MISSING_VALUE, NO_DATA_TEXT};
use super::format::{
    format_count, format_market_cap, format_percent, format_price, format_ratio,
    format_signed_percent, format_volume,
};
use super::refresh::SourceStatus;
use super::types::{RankingSet, StockRecord};

/// Value-formatting strategy of a ranking category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingKind {
    Percentage,
    Volume,
    MarketCap,
    TradingValue,
    Dividend,
    Pe,
    Pbr,
    Roa,
    Roe,
    Employees,
    Deviation,
    CrossSignal,
    StopStatus,
    YearStatus,
}

impl RankingKind {
    fn primary(self, record: &StockRecord) -> String {
        let market = record.market();
        match self {
            RankingKind::Percentage => format_signed_percent(record.change_percent),
            RankingKind::Volume => format_volume(record.volume),
            RankingKind::MarketCap => format_market_cap(record.market_cap, market),
            RankingKind::TradingValue => format_market_cap(record.trading_value, market),
            RankingKind::Dividend => format_percent(record.dividend_yield),
            RankingKind::Pe => format_ratio(record.pe_ratio),
            RankingKind::Pbr => format_ratio(record.pbr),
            RankingKind::Roa => format_percent(record.roa),
            RankingKind::Roe => format_percent(record.roe),
            RankingKind::Employees => format_count(record.employees, "人"),
            RankingKind::Deviation => format_signed_percent(record.deviation),
            RankingKind::CrossSignal => label_or_missing(record.cross_signal.as_deref()),
            RankingKind::StopStatus => label_or_missing(record.stop_status.as_deref()),
            RankingKind::YearStatus => label_or_missing(record.year_status.as_deref()),
        }
    }

    fn secondary(self, record: &StockRecord) -> String {
        let price = format_price(record.price, record.market());
        match self {
            RankingKind::Percentage => price,
            RankingKind::CrossSignal => format_signed_percent(record.deviation),
            RankingKind::StopStatus | RankingKind::YearStatus => {
                format_signed_percent(record.change_percent)
            }
            _ => format!("{price} ({})", format_signed_percent(record.change_percent)),
        }
    }
}

fn label_or_missing(label: Option<&str>) -> String {
    label
        .filter(|text| !text.trim().is_empty())
        .unwrap_or(MISSING_VALUE)
        .to_string()
}

/// A known category key with its heading and strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub key: &'static str,
    pub title: &'static str,
    pub kind: RankingKind,
}

const fn category(key: &'static str, title: &'static str, kind: RankingKind) -> Category {
    Category { key, title, kind }
}

pub const BASIC_CATEGORIES: [Category; 4] = [
    category("gainers", "値上がり率", RankingKind::Percentage),
    category("losers", "値下がり率", RankingKind::Percentage),
    category("volume", "出来高", RankingKind::Volume),
    category("market_cap", "時価総額", RankingKind::MarketCap),
];

pub const EXTENDED_CATEGORIES: [Category; 19] = [
    category("stop_high", "ストップ高", RankingKind::StopStatus),
    category("stop_low", "ストップ安", RankingKind::StopStatus),
    category("year_high", "年初来高値", RankingKind::YearStatus),
    category("year_low", "年初来安値", RankingKind::YearStatus),
    category("dividend_yield", "配当利回り", RankingKind::Dividend),
    category("pe_low", "PER（低い順）", RankingKind::Pe),
    category("pe_high", "PER（高い順）", RankingKind::Pe),
    category("pbr_low", "PBR（低い順）", RankingKind::Pbr),
    category("pbr_high", "PBR（高い順）", RankingKind::Pbr),
    category("roa_high", "ROA", RankingKind::Roa),
    category("roe_high", "ROE", RankingKind::Roe),
    category("trading_value", "売買代金", RankingKind::TradingValue),
    category("employees", "従業員数", RankingKind::Employees),
    category("deviation_25_plus", "25日乖離率（上方）", RankingKind::Deviation),
    category("deviation_25_minus", "25日乖離率（下方）", RankingKind::Deviation),
    category("deviation_75_plus", "75日乖離率（上方）", RankingKind::Deviation),
    category("deviation_75_minus", "75日乖離率（下方）", RankingKind::Deviation),
    category("golden_cross", "ゴールデンクロス", RankingKind::CrossSignal),
    category("dead_cross", "デッドクロス", RankingKind::CrossSignal),
];

pub const PERIOD_CATEGORIES: [Category; 2] = [
    category("gainers", "値上がり率", RankingKind::Percentage),
    category("losers", "値下がり率", RankingKind::Percentage),
];

pub const PERIODS: [(&str, &str); 4] = [
    ("1w", "1週間"),
    ("1m", "1ヶ月"),
    ("3m", "3ヶ月"),
    ("1y", "1年"),
];

pub fn period_label(key: &str) -> &str {
    PERIODS
        .iter()
        .find(|(period, _)| *period == key)
        .map(|(_, label)| *label)
        .unwrap_or(key)
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankingRow {
    pub rank: usize,
    pub symbol: String,
    pub name: String,
    pub primary: String,
    pub secondary: String,
    pub class: ChangeClass,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RankingView {
    Rows(Vec<RankingRow>),
    Loading,
    Empty,
    Failed,
}

impl RankingView {
    /// Text of the single placeholder row, if this view has no entries.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            RankingView::Rows(_) => None,
            RankingView::Loading => Some(LOADING_TEXT),
            RankingView::Empty => Some(NO_DATA_TEXT),
            RankingView::Failed => Some(FETCH_ERROR_TEXT),
        }
    }
}

/// Ranks follow source order; nothing is re-sorted here.
pub fn render_ranking(records: Option<&[StockRecord]>, kind: RankingKind) -> RankingView {
    match records {
        Some(records) if !records.is_empty() => RankingView::Rows(
            records
                .iter()
                .enumerate()
                .map(|(idx, record)| RankingRow {
                    rank: idx + 1,
                    symbol: record.symbol.clone(),
                    name: record.display_name().to_string(),
                    primary: kind.primary(record),
                    secondary: kind.secondary(record),
                    class: ChangeClass::of(record.change_percent),
                })
                .collect(),
        ),
        _ => RankingView::Empty,
    }
}

/// One rendered category block.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingSection {
    pub key: String,
    pub title: String,
    pub view: RankingView,
}

/// Known categories first, in table order, then any extra keys the payload
/// carried, rendered as percentages.
pub fn ranking_sections(
    status: &SourceStatus,
    set: Option<&RankingSet>,
    known: &[Category],
) -> Vec<RankingSection> {
    let view_for = |key: &str, kind: RankingKind| -> RankingView {
        match (status, set) {
            (SourceStatus::Failed(_), _) => RankingView::Failed,
            (SourceStatus::Pending, None) => RankingView::Loading,
            (_, set) => render_ranking(set.and_then(|set| set.category(key)), kind),
        }
    };

    let mut sections: Vec<RankingSection> = known
        .iter()
        .map(|category| RankingSection {
            key: category.key.to_string(),
            title: category.title.to_string(),
            view: view_for(category.key, category.kind),
        })
        .collect();

    if let Some(set) = set {
        for key in set.categories.keys() {
            if known.iter().any(|category| category.key == key.as_str()) {
                continue;
            }
            sections.push(RankingSection {
                key: key.clone(),
                title: key.clone(),
                view: view_for(key.as_str(), RankingKind::Percentage),
            });
        }
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::source::FetchError;
    use crate::market::types::{Rankings, Snapshot};

    fn record(json: &str) -> StockRecord {
        serde_json::from_str(json).expect("record")
    }

    #[test]
    fn ranks_follow_source_order() {
        let records = vec![
            record(r#"{"symbol": "LOW", "change_percent": 1.0, "price": 10}"#),
            record(r#"{"symbol": "HIGH", "change_percent": 9.0, "price": 20}"#),
        ];
        let RankingView::Rows(rows) = render_ranking(Some(records.as_slice()), RankingKind::Percentage) else {
            panic!("expected rows");
        };
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].symbol, "LOW");
        assert_eq!(rows[1].rank, 2);
        assert_eq!(rows[1].primary, "+9.00%");
        assert_eq!(rows[1].secondary, "$20.00");
    }

    #[test]
    fn strategies_format_their_metric() {
        let toyota = record(
            r#"{"symbol": "7203.T", "name": "トヨタ", "price": 2850, "change_percent": -1.2,
                "volume": 12345678, "market_cap": 4.6e13, "per": 9.8, "employees": 375235,
                "deviation": 4.25, "cross_type": "GC", "stop_status": "", "dividend_yield": 2.5}"#,
        );
        let primary = |kind: RankingKind| kind.primary(&toyota);

        assert_eq!(primary(RankingKind::Volume), "12.3M");
        assert_eq!(primary(RankingKind::MarketCap), "46.00兆円");
        assert_eq!(primary(RankingKind::Pe), "9.80倍");
        assert_eq!(primary(RankingKind::Dividend), "2.50%");
        assert_eq!(primary(RankingKind::Employees), "375,235人");
        assert_eq!(primary(RankingKind::Deviation), "+4.25%");
        assert_eq!(primary(RankingKind::CrossSignal), "GC");
        assert_eq!(primary(RankingKind::StopStatus), "---");
        assert_eq!(primary(RankingKind::Pbr), "---");
        assert_eq!(RankingKind::Volume.secondary(&toyota), "¥2,850 (-1.20%)");
        assert_eq!(RankingKind::CrossSignal.secondary(&toyota), "+4.25%");
    }

    #[test]
    fn color_class_uses_change_percent() {
        let records = vec![
            record(r#"{"symbol": "A", "change_percent": 0}"#),
            record(r#"{"symbol": "B", "change_percent": -0.1}"#),
            record(r#"{"symbol": "C"}"#),
        ];
        let RankingView::Rows(rows) = render_ranking(Some(records.as_slice()), RankingKind::Volume) else {
            panic!("expected rows");
        };
        let classes: Vec<_> = rows.iter().map(|row| row.class).collect();
        assert_eq!(
            classes,
            vec![ChangeClass::Neutral, ChangeClass::Negative, ChangeClass::Neutral]
        );
    }

    #[test]
    fn empty_and_failed_sources_render_one_placeholder() {
        assert_eq!(render_ranking(None, RankingKind::Volume), RankingView::Empty);
        assert_eq!(render_ranking(Some(&[]), RankingKind::Volume).placeholder(), Some(NO_DATA_TEXT));

        let failed = ranking_sections(
            &SourceStatus::Failed(FetchError::Http(500)),
            None,
            &BASIC_CATEGORIES,
        );
        assert_eq!(failed.len(), BASIC_CATEGORIES.len());
        assert!(failed.iter().all(|s| s.view.placeholder() == Some(FETCH_ERROR_TEXT)));
    }

    #[test]
    fn unknown_categories_are_kept() {
        let rankings = Rankings::from_body(
            r#"{"rankings": {"gainers": [{"symbol": "A", "change_percent": 2}], "ipo": [{"symbol": "NEW", "change_percent": 15}]}}"#,
        )
        .expect("rankings");
        let sections = ranking_sections(&SourceStatus::Ready, Some(&rankings.0), &BASIC_CATEGORIES);

        assert_eq!(sections.len(), 5);
        assert_eq!(sections[2].view, RankingView::Empty);
        let extra = sections.last().expect("extra section");
        assert_eq!(extra.key, "ipo");
        let RankingView::Rows(rows) = &extra.view else {
            panic!("expected rows");
        };
        assert_eq!(rows[0].primary, "+15.00%");
    }

    #[test]
    fn period_labels() {
        assert_eq!(period_label("3m"), "3ヶ月");
        assert_eq!(period_label("5y"), "5y");
    }
}
