use std::fmt;

use serde::Serialize;

/// Market category derived from the ticker symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Market {
    Jp,
    Us,
    Etf,
    Index,
    Other,
}

impl Market {
    pub const ALL: [Market; 5] = [
        Market::Jp,
        Market::Us,
        Market::Etf,
        Market::Index,
        Market::Other,
    ];

    /// Pattern rules applied in priority order; the first match wins.
    pub fn detect(symbol: &str) -> Market {
        if symbol.ends_with(".T") {
            Market::Jp
        } else if symbol.starts_with('^') || symbol.contains("=X") {
            Market::Index
        } else if (3..=4).contains(&symbol.len())
            && symbol.bytes().all(|byte| byte.is_ascii_uppercase())
        {
            Market::Us
        } else if ["ETF", "SPY", "QQQ"]
            .iter()
            .any(|marker| symbol.contains(marker))
        {
            Market::Etf
        } else {
            Market::Other
        }
    }

    /// Parses a category code, case-insensitively.
    pub fn parse(code: &str) -> Option<Market> {
        match code.trim().to_ascii_uppercase().as_str() {
            "JP" => Some(Market::Jp),
            "US" => Some(Market::Us),
            "ETF" => Some(Market::Etf),
            "INDEX" => Some(Market::Index),
            "OTHER" => Some(Market::Other),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Market::Jp => "JP",
            Market::Us => "US",
            Market::Etf => "ETF",
            Market::Index => "INDEX",
            Market::Other => "OTHER",
        }
    }

    /// Compact badge text used in list rows.
    pub fn label(self) -> &'static str {
        match self {
            Market::Jp => "🇯🇵 JP",
            Market::Us => "🇺🇸 US",
            Market::Etf => "📈 ETF",
            Market::Index => "📊 指数",
            Market::Other => "その他",
        }
    }

    /// Badge text on the detail page.
    pub fn long_label(self) -> &'static str {
        match self {
            Market::Jp => "🇯🇵 日本",
            Market::Us => "🇺🇸 米国",
            Market::Etf => "📈 ETF",
            Market::Index => "📊 指数",
            Market::Other => "その他",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Coverage priority supplied by the universe dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Core,
    Active,
    #[default]
    Other,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Core, Tier::Active, Tier::Other];

    pub fn parse(value: &str) -> Option<Tier> {
        match value.trim().to_ascii_lowercase().as_str() {
            "core" => Some(Tier::Core),
            "active" => Some(Tier::Active),
            "other" => Some(Tier::Other),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Core => "core",
            Tier::Active => "active",
            Tier::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Core => "Core",
            Tier::Active => "Active",
            Tier::Other => "-",
        }
    }
}

/// Color class for a signed value. Missing values and exact zero are neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeClass {
    Positive,
    Negative,
    Neutral,
}

impl ChangeClass {
    pub fn of(value: Option<f64>) -> ChangeClass {
        match value {
            Some(v) if v > 0.0 => ChangeClass::Positive,
            Some(v) if v < 0.0 => ChangeClass::Negative,
            _ => ChangeClass::Neutral,
        }
    }

    /// International cards honour an explicit `trend` hint before the sign.
    pub fn with_trend(trend: Option<&str>, value: Option<f64>) -> ChangeClass {
        match trend {
            Some("up") => ChangeClass::Positive,
            Some("down") => ChangeClass::Negative,
            _ => ChangeClass::of(value),
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            ChangeClass::Positive => "positive",
            ChangeClass::Negative => "negative",
            ChangeClass::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsiZone {
    Overbought,
    Oversold,
    Normal,
}

impl RsiZone {
    pub fn of(rsi: f64) -> RsiZone {
        if rsi > 70.0 {
            RsiZone::Overbought
        } else if rsi < 30.0 {
            RsiZone::Oversold
        } else {
            RsiZone::Normal
        }
    }

    pub fn bar_color(self) -> &'static str {
        match self {
            RsiZone::Overbought => "#f59e0b",
            RsiZone::Oversold => "#10b981",
            RsiZone::Normal => "var(--accent-color)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaSignal {
    Bullish,
    Bearish,
    Neutral,
}

impl MaSignal {
    /// Compares price against a ±2% band around the 20-day average.
    pub fn of(price: f64, ma20: f64) -> MaSignal {
        if price > ma20 * 1.02 {
            MaSignal::Bullish
        } else if price < ma20 * 0.98 {
            MaSignal::Bearish
        } else {
            MaSignal::Neutral
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MaSignal::Bullish => "🔼 強気",
            MaSignal::Bearish => "🔽 弱気",
            MaSignal::Neutral => "➡️ 中立",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandPosition {
    NearUpper,
    NearLower,
    Inside,
}

impl BandPosition {
    pub fn of(position: f64) -> BandPosition {
        if position > 0.8 {
            BandPosition::NearUpper
        } else if position < 0.2 {
            BandPosition::NearLower
        } else {
            BandPosition::Inside
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BandPosition::NearUpper => "⚠️ 上限近く",
            BandPosition::NearLower => "⚠️ 下限近く",
            BandPosition::Inside => "📊 正常範囲",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolatilityLevel {
    High,
    Low,
    Normal,
}

impl VolatilityLevel {
    pub fn of(volatility: f64) -> VolatilityLevel {
        if volatility > 0.05 {
            VolatilityLevel::High
        } else if volatility < 0.02 {
            VolatilityLevel::Low
        } else {
            VolatilityLevel::Normal
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VolatilityLevel::High => "⚡ 高ボラ",
            VolatilityLevel::Low => "😴 低ボラ",
            VolatilityLevel::Normal => "📈 通常",
        }
    }
}
