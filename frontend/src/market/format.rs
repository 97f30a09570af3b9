use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

use super::classify::Market;
use super::constants::{MISSING_PERCENT, MISSING_VALUE};

const JST_OFFSET_SECS: i32 = 9 * 60 * 60;

/// Display currency of a price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Currency {
    Yen,
    Dollar,
    Euro,
    Pound,
    Code(String),
}

impl Currency {
    /// Maps a payload currency code. Absent codes display as yen.
    pub fn from_code(code: Option<&str>) -> Currency {
        match code.map(str::trim) {
            None | Some("") | Some("JPY") | Some("¥") => Currency::Yen,
            Some("USD") | Some("$") => Currency::Dollar,
            Some("EUR") => Currency::Euro,
            Some("GBP") => Currency::Pound,
            Some(other) => Currency::Code(other.to_string()),
        }
    }

    pub fn for_market(market: Market) -> Currency {
        match market {
            Market::Jp => Currency::Yen,
            _ => Currency::Dollar,
        }
    }

    fn prefix(&self) -> String {
        match self {
            Currency::Yen => "¥".to_string(),
            Currency::Dollar => "$".to_string(),
            Currency::Euro => "€".to_string(),
            Currency::Pound => "£".to_string(),
            Currency::Code(code) => format!("{code} "),
        }
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn group_thousands(integer: &str) -> String {
    let digits: Vec<char> = integer.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, digit) in digits.iter().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit);
    }
    grouped
}

/// `ja-JP` number rendering: comma thousands, between `min_fraction` and
/// `max_fraction` decimals with trailing zeros trimmed.
pub fn localize(value: f64, min_fraction: usize, max_fraction: usize) -> String {
    let fixed = format!("{:.*}", max_fraction, value.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let mut fraction = fraction.trim_end_matches('0').to_string();
    while fraction.len() < min_fraction {
        fraction.push('0');
    }

    let is_zero = integer.chars().all(|c| c == '0') && fraction.chars().all(|c| c == '0');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };
    let grouped = group_thousands(integer);
    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}

/// Hero card price: yen keeps up to two decimals, other currencies exactly two.
pub fn format_index_price(value: Option<f64>, currency: &Currency) -> String {
    let Some(value) = finite(value) else {
        return MISSING_VALUE.to_string();
    };
    let body = match currency {
        Currency::Yen => localize(value, 0, 2),
        _ => localize(value, 2, 2),
    };
    format!("{}{body}", currency.prefix())
}

/// List and detail price: yen without decimals, dollars with two.
pub fn format_price(value: Option<f64>, market: Market) -> String {
    let Some(value) = finite(value) else {
        return MISSING_VALUE.to_string();
    };
    let digits = if market == Market::Jp { 0 } else { 2 };
    format!(
        "{}{}",
        Currency::for_market(market).prefix(),
        localize(value, digits, digits)
    )
}

pub fn format_change(value: Option<f64>) -> String {
    match finite(value) {
        Some(value) => localize(value, 0, 2),
        None => MISSING_VALUE.to_string(),
    }
}

pub fn format_signed_change(value: Option<f64>) -> String {
    match finite(value) {
        Some(value) => {
            let sign = if value >= 0.0 { '+' } else { '-' };
            format!("{sign}{}", localize(value.abs(), 0, 2))
        }
        None => MISSING_VALUE.to_string(),
    }
}

pub fn format_percent(value: Option<f64>) -> String {
    match finite(value) {
        Some(value) => format!("{value:.2}%"),
        None => MISSING_PERCENT.to_string(),
    }
}

pub fn format_signed_percent(value: Option<f64>) -> String {
    match finite(value) {
        Some(value) => {
            let sign = if value >= 0.0 { "+" } else { "" };
            format!("{sign}{value:.2}%")
        }
        None => MISSING_PERCENT.to_string(),
    }
}

/// Volume abbreviated with B/M/K, truncated to an integer first.
pub fn format_volume(value: Option<f64>) -> String {
    let Some(volume) = finite(value).map(f64::trunc).filter(|v| *v != 0.0) else {
        return MISSING_VALUE.to_string();
    };
    if volume >= 1e9 {
        format!("{:.1}B", volume / 1e9)
    } else if volume >= 1e6 {
        format!("{:.1}M", volume / 1e6)
    } else if volume >= 1e3 {
        format!("{:.1}K", volume / 1e3)
    } else {
        localize(volume, 0, 0)
    }
}

pub fn format_market_cap(value: Option<f64>, market: Market) -> String {
    let Some(value) = finite(value) else {
        return MISSING_VALUE.to_string();
    };
    if market == Market::Jp {
        if value >= 1e12 {
            format!("{:.2}兆円", value / 1e12)
        } else if value >= 1e8 {
            format!("{}億円", localize(value / 1e8, 0, 0))
        } else {
            format!("{}円", localize(value, 0, 0))
        }
    } else if value >= 1e12 {
        format!("${:.2}T", value / 1e12)
    } else if value >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else if value >= 1e6 {
        format!("${:.2}M", value / 1e6)
    } else {
        format!("${}", localize(value, 0, 0))
    }
}

/// Valuation multiple such as PER or PBR.
pub fn format_ratio(value: Option<f64>) -> String {
    match finite(value) {
        Some(value) => format!("{value:.2}倍"),
        None => MISSING_VALUE.to_string(),
    }
}

pub fn format_count(value: Option<f64>, unit: &str) -> String {
    match finite(value) {
        Some(value) => format!("{}{unit}", localize(value.trunc(), 0, 0)),
        None => MISSING_VALUE.to_string(),
    }
}

/// Confidence ratio in `0..=1` shown as a percentage.
pub fn format_confidence(value: Option<f64>) -> String {
    match finite(value) {
        Some(value) => format!("{:.1}%", value * 100.0),
        None => MISSING_PERCENT.to_string(),
    }
}

fn jst() -> Option<FixedOffset> {
    FixedOffset::east_opt(JST_OFFSET_SECS)
}

/// Parses RFC 3339, naive ISO (assumed UTC) or unix seconds/milliseconds.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc().fixed_offset());
    }
    let number = trimmed.parse::<i64>().ok()?;
    // Values beyond 1e11 cannot be plausible seconds and are read as milliseconds.
    let millis = if number.abs() >= 100_000_000_000 {
        number
    } else {
        number.checked_mul(1_000)?
    };
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|utc| utc.fixed_offset())
}

fn format_jst(raw: &str, pattern: &str) -> Option<String> {
    let offset = jst()?;
    parse_timestamp(raw).map(|parsed| parsed.with_timezone(&offset).format(pattern).to_string())
}

/// `MM/DD HH:MM` in Japan time.
pub fn format_updated_at(raw: &str) -> Option<String> {
    format_jst(raw, "%m/%d %H:%M")
}

/// Full date and time in Japan time for the detail header.
pub fn format_full_datetime(raw: &str) -> Option<String> {
    format_jst(raw, "%Y/%m/%d %H:%M:%S")
}

/// `HH:MM` in Japan time for intraday chart labels.
pub fn format_time_of_day(unix_secs: i64) -> Option<String> {
    let offset = jst()?;
    Utc.timestamp_opt(unix_secs, 0)
        .single()
        .map(|utc| utc.with_timezone(&offset).format("%H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn localize_groups_and_trims() {
        assert_eq!(localize(38123.456, 0, 2), "38,123.46");
        assert_eq!(localize(38123.4, 0, 2), "38,123.4");
        assert_eq!(localize(1234567.0, 2, 2), "1,234,567.00");
        assert_eq!(localize(-1234.6, 0, 0), "-1,235");
        assert_eq!(localize(-0.001, 0, 2), "0");
        assert_eq!(localize(999.0, 0, 2), "999");
    }

    #[test]
    fn prices_follow_currency_rules() {
        assert_eq!(format_index_price(Some(38123.4), &Currency::Yen), "¥38,123.4");
        assert_eq!(format_index_price(Some(39000.0), &Currency::Dollar), "$39,000.00");
        assert_eq!(format_index_price(Some(f64::NAN), &Currency::Yen), "---");
        assert_eq!(format_price(Some(2850.6), Market::Jp), "¥2,851");
        assert_eq!(format_price(Some(190.1), Market::Us), "$190.10");
        assert_eq!(format_price(None, Market::Us), "---");
        assert_eq!(
            format_index_price(Some(1.5), &Currency::from_code(Some("CHF"))),
            "CHF 1.50"
        );
    }

    #[test]
    fn changes_and_percentages() {
        assert_eq!(format_change(Some(-120.256)), "-120.26");
        assert_eq!(format_signed_change(Some(12.5)), "+12.5");
        assert_eq!(format_signed_change(Some(-1234.0)), "-1,234");
        assert_eq!(format_signed_change(Some(0.0)), "+0");
        assert_eq!(format_percent(Some(1.234)), "1.23%");
        assert_eq!(format_percent(None), "-%");
        assert_eq!(format_signed_percent(Some(0.0)), "+0.00%");
        assert_eq!(format_signed_percent(Some(-2.5)), "-2.50%");
    }

    #[test]
    fn volume_abbreviations() {
        assert_eq!(format_volume(Some(2_500_000_000.0)), "2.5B");
        assert_eq!(format_volume(Some(1_234_567.0)), "1.2M");
        assert_eq!(format_volume(Some(1_500.9)), "1.5K");
        assert_eq!(format_volume(Some(999.9)), "999");
        assert_eq!(format_volume(Some(0.4)), "---");
        assert_eq!(format_volume(None), "---");
    }

    #[test]
    fn market_cap_units() {
        assert_eq!(format_market_cap(Some(3.2e13), Market::Jp), "32.00兆円");
        assert_eq!(format_market_cap(Some(5.5e10), Market::Jp), "550億円");
        assert_eq!(format_market_cap(Some(2.9e12), Market::Us), "$2.90T");
        assert_eq!(format_market_cap(Some(4.2e8), Market::Us), "$420.00M");
    }

    #[test]
    fn misc_metric_formats() {
        assert_eq!(format_ratio(Some(12.3)), "12.30倍");
        assert_eq!(format_count(Some(375235.0), "人"), "375,235人");
        assert_eq!(format_confidence(Some(0.875)), "87.5%");
    }

    #[test]
    fn timestamps_render_in_japan_time() {
        assert_eq!(
            format_updated_at("2024-05-22T06:30:00Z").as_deref(),
            Some("05/22 15:30")
        );
        assert_eq!(
            format_updated_at("2024-05-22T15:30:00+09:00").as_deref(),
            Some("05/22 15:30")
        );
        // 2024-05-22T06:30:00Z as seconds and milliseconds.
        assert_eq!(format_updated_at("1716359400").as_deref(), Some("05/22 15:30"));
        assert_eq!(format_updated_at("1716359400000").as_deref(), Some("05/22 15:30"));
        assert_eq!(format_time_of_day(1_716_359_400).as_deref(), Some("15:30"));
        assert!(format_updated_at("yesterday").is_none());
    }
}
