//! Display models for the dashboard's index cards.

use super::classify::ChangeClass;
use super::constants::{ERROR_TEXT, FETCH_ERROR_TEXT, MISSING_VALUE};
use super::format::{
    Currency, format_change, format_index_price, format_percent, format_updated_at,
};
use super::sparkline::SparklineInput;
use super::types::{MajorIndices, RealtimeSnapshot, StockRecord, SummarySnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeroKey {
    Nikkei,
    Dow,
}

impl HeroKey {
    pub const ALL: [HeroKey; 2] = [HeroKey::Nikkei, HeroKey::Dow];

    pub fn title(self) -> &'static str {
        match self {
            HeroKey::Nikkei => "日経平均",
            HeroKey::Dow => "NYダウ",
        }
    }

    pub fn detail_symbol(self) -> &'static str {
        match self {
            HeroKey::Nikkei => "^N225",
            HeroKey::Dow => "^DJI",
        }
    }

    fn currency(self) -> Currency {
        match self {
            HeroKey::Nikkei => Currency::Yen,
            HeroKey::Dow => Currency::Dollar,
        }
    }
}

/// Which snapshot fed the cards on the last successful tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeroOrigin {
    Realtime,
    Summary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeroCard {
    pub key: HeroKey,
    pub price: String,
    pub change: String,
    pub percent: String,
    pub class: ChangeClass,
    /// `None` leaves the chart area empty.
    pub sparkline: Option<SparklineInput>,
}

impl HeroCard {
    fn placeholder(key: HeroKey, price: &str) -> HeroCard {
        HeroCard {
            key,
            price: price.to_string(),
            change: MISSING_VALUE.to_string(),
            percent: String::new(),
            class: ChangeClass::Neutral,
            sparkline: None,
        }
    }

    fn from_record(key: HeroKey, record: &StockRecord, sparkline: Option<SparklineInput>) -> Self {
        HeroCard {
            key,
            price: format_index_price(record.price, &key.currency()),
            change: format_change(record.change),
            percent: format!("({})", format_percent(record.change_percent)),
            class: ChangeClass::of(record.change),
            sparkline,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeroBoard {
    pub cards: Vec<HeroCard>,
    pub updated: String,
}

impl HeroBoard {
    pub fn loading() -> HeroBoard {
        HeroBoard {
            cards: HeroKey::ALL
                .iter()
                .map(|key| HeroCard::placeholder(*key, MISSING_VALUE))
                .collect(),
            updated: String::new(),
        }
    }

    /// Every price reads `エラー` once both hero sources have failed.
    pub fn failed() -> HeroBoard {
        HeroBoard {
            cards: HeroKey::ALL
                .iter()
                .map(|key| HeroCard::placeholder(*key, ERROR_TEXT))
                .collect(),
            updated: FETCH_ERROR_TEXT.to_string(),
        }
    }

    /// Realtime payloads carry no series, so the cards draw the change glyph.
    pub fn from_realtime(snapshot: &RealtimeSnapshot) -> HeroBoard {
        let pick = |key: HeroKey| -> Option<&StockRecord> {
            match key {
                HeroKey::Nikkei => snapshot.indices.iter().find(|r| r.symbol == "^N225"),
                // The realtime feed has no Dow quote; S&P 500 stands in.
                HeroKey::Dow => snapshot.foreign.iter().find(|r| r.symbol == "^GSPC"),
            }
        };

        HeroBoard {
            cards: HeroKey::ALL
                .iter()
                .map(|key| match pick(*key) {
                    Some(record) => HeroCard::from_record(
                        *key,
                        record,
                        Some(SparklineInput::Change(record.change)),
                    ),
                    None => HeroCard::placeholder(*key, MISSING_VALUE),
                })
                .collect(),
            updated: updated_label(snapshot.timestamp.as_deref()),
        }
    }

    pub fn from_summary(snapshot: &SummarySnapshot) -> HeroBoard {
        let pick = |key: HeroKey| -> Option<&StockRecord> {
            let accepted: &[&str] = match key {
                HeroKey::Nikkei => &["NIKKEI225", "^N225"],
                HeroKey::Dow => &["DJI", "^DJI"],
            };
            snapshot
                .indices
                .iter()
                .find(|r| accepted.contains(&r.symbol.as_str()))
        };

        HeroBoard {
            cards: HeroKey::ALL
                .iter()
                .map(|key| match pick(*key) {
                    Some(record) => {
                        let sparkline = (!record.history.is_empty())
                            .then(|| SparklineInput::Series(record.history.clone()));
                        HeroCard::from_record(*key, record, sparkline)
                    }
                    None => HeroCard::placeholder(*key, MISSING_VALUE),
                })
                .collect(),
            updated: updated_label(snapshot.updated_at.as_deref()),
        }
    }

    pub fn card(&self, key: HeroKey) -> Option<&HeroCard> {
        self.cards.iter().find(|card| card.key == key)
    }
}

fn updated_label(timestamp: Option<&str>) -> String {
    match timestamp.and_then(format_updated_at) {
        Some(formatted) => format!("最終更新: {formatted} JST"),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Us,
    Europe,
    Asia,
    Commodity,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Us, Region::Europe, Region::Asia, Region::Commodity];

    pub fn title(self) -> &'static str {
        match self {
            Region::Us => "米国",
            Region::Europe => "欧州",
            Region::Asia => "アジア",
            Region::Commodity => "商品・暗号資産",
        }
    }
}

/// Fixed tile layout for `/api/major_indices.json`.
pub const INTERNATIONAL_SLOTS: [(&str, &str, &str, Region); 12] = [
    ("^IXIC", "nasdaq", "NASDAQ", Region::Us),
    ("^GSPC", "sp500", "S&P 500", Region::Us),
    ("^RUT", "russell", "Russell 2000", Region::Us),
    ("^GDAXI", "dax", "DAX", Region::Europe),
    ("^FTSE", "ftse", "FTSE 100", Region::Europe),
    ("^FCHI", "cac", "CAC 40", Region::Europe),
    ("000001.SS", "shanghai", "上海総合", Region::Asia),
    ("^HSI", "hangseng", "ハンセン", Region::Asia),
    ("^KS11", "kospi", "KOSPI", Region::Asia),
    ("CL=F", "oil", "原油", Region::Commodity),
    ("GC=F", "gold", "金", Region::Commodity),
    ("BTC-USD", "bitcoin", "ビットコイン", Region::Commodity),
];

#[derive(Debug, Clone, PartialEq)]
pub struct IndexTile {
    pub slot: &'static str,
    pub symbol: &'static str,
    pub title: &'static str,
    pub region: Region,
    pub price: String,
    pub change: String,
    pub class: ChangeClass,
}

impl IndexTile {
    fn new(slot: (&'static str, &'static str, &'static str, Region), record: Option<&StockRecord>) -> Self {
        let (symbol, slot, title, region) = slot;
        let Some(record) = record else {
            return IndexTile {
                slot,
                symbol,
                title,
                region,
                price: MISSING_VALUE.to_string(),
                change: MISSING_VALUE.to_string(),
                class: ChangeClass::Neutral,
            };
        };

        let price = record.price_formatted.clone().unwrap_or_else(|| {
            format_index_price(record.price, &Currency::from_code(record.currency.as_deref()))
        });
        let change = record
            .change_formatted
            .clone()
            .unwrap_or_else(|| format_change(record.change));
        let change = match record.change_percent.filter(|pct| *pct != 0.0) {
            Some(pct) => format!("{change} ({})", format_percent(Some(pct))),
            None => change,
        };

        IndexTile {
            slot,
            symbol,
            title,
            region,
            price,
            change,
            class: ChangeClass::with_trend(record.trend.as_deref(), record.change),
        }
    }
}

/// One tile per known slot; symbols absent from the payload keep placeholders.
pub fn international_tiles(indices: Option<&MajorIndices>) -> Vec<IndexTile> {
    INTERNATIONAL_SLOTS
        .iter()
        .map(|slot| IndexTile::new(*slot, indices.and_then(|data| data.find(slot.0))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::types::Snapshot;

    const REALTIME: &str = r#"{
        "timestamp": "2024-05-22T06:30:00Z",
        "indices": [{"ticker": "^N225", "current_price": 38123.4, "change": -120.5, "change_percent": -0.31}],
        "foreign": [{"ticker": "^GSPC", "current_price": 5300.25, "change": 12.0, "change_percent": 0.23}]
    }"#;

    #[test]
    fn realtime_board_uses_change_glyph() {
        let snapshot = RealtimeSnapshot::from_body(REALTIME).expect("realtime");
        let board = HeroBoard::from_realtime(&snapshot);

        let nikkei = board.card(HeroKey::Nikkei).expect("nikkei");
        assert_eq!(nikkei.price, "¥38,123.4");
        assert_eq!(nikkei.change, "-120.5");
        assert_eq!(nikkei.percent, "(-0.31%)");
        assert_eq!(nikkei.class, ChangeClass::Negative);
        assert_eq!(nikkei.sparkline, Some(SparklineInput::Change(Some(-120.5))));

        let dow = board.card(HeroKey::Dow).expect("dow");
        assert_eq!(dow.price, "$5,300.25");
        assert_eq!(board.updated, "最終更新: 05/22 15:30 JST");
    }

    #[test]
    fn summary_board_plots_series() {
        let snapshot = SummarySnapshot::from_body(
            r#"{"updatedAt": "2024-05-22T15:30:00+09:00", "indices": [
                {"symbol": "NIKKEI225", "price": 38000, "change": 10, "pct": 0.03, "spark": [1, 2, 3]},
                {"symbol": "^DJI", "price": 39000.5, "change": 0, "pct": 0, "spark": []}
            ]}"#,
        )
        .expect("summary");
        let board = HeroBoard::from_summary(&snapshot);

        let nikkei = board.card(HeroKey::Nikkei).expect("nikkei");
        assert_eq!(nikkei.sparkline, Some(SparklineInput::Series(vec![1.0, 2.0, 3.0])));
        let dow = board.card(HeroKey::Dow).expect("dow");
        assert_eq!(dow.sparkline, None);
        assert_eq!(dow.class, ChangeClass::Neutral);
        assert_eq!(dow.percent, "(0.00%)");
    }

    #[test]
    fn failed_board_shows_error_text() {
        let board = HeroBoard::failed();
        assert!(board.cards.iter().all(|card| card.price == ERROR_TEXT));
        assert_eq!(board.updated, FETCH_ERROR_TEXT);
    }

    #[test]
    fn international_tiles_prefer_preformatted_text() {
        let indices = MajorIndices::from_body(
            r#"{"indices": {
                "us": {"^IXIC": {"price": 16000.5, "change": 25.1, "change_percent": 0.16, "currency": "USD"}},
                "asia": {"^HSI": {"price_formatted": "17,000.00", "change_formatted": "-50.00", "change_percent": 0, "trend": "down"}}
            }}"#,
        )
        .expect("indices");
        let tiles = international_tiles(Some(&indices));
        assert_eq!(tiles.len(), INTERNATIONAL_SLOTS.len());

        let nasdaq = tiles.iter().find(|t| t.slot == "nasdaq").expect("nasdaq");
        assert_eq!(nasdaq.price, "$16,000.50");
        assert_eq!(nasdaq.change, "25.1 (0.16%)");
        assert_eq!(nasdaq.class, ChangeClass::Positive);

        let hangseng = tiles.iter().find(|t| t.slot == "hangseng").expect("hangseng");
        assert_eq!(hangseng.price, "17,000.00");
        assert_eq!(hangseng.change, "-50.00");
        assert_eq!(hangseng.class, ChangeClass::Negative);

        let gold = tiles.iter().find(|t| t.slot == "gold").expect("gold");
        assert_eq!(gold.price, MISSING_VALUE);
    }
}
