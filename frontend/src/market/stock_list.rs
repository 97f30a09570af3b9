use std::cmp::Ordering;
use std::ops::RangeInclusive;

use super::classify::{ChangeClass, Market, Tier};
use super::constants::{PAGE_SIZE, PAGINATION_WINDOW};
use super::format::{format_price, format_signed_change, format_signed_percent, format_volume};
use super::types::{StockIndex, StockRecord, Universe};

/// A stock with its derived classification and search key.
#[derive(Debug, Clone, PartialEq)]
pub struct ListedStock {
    pub record: StockRecord,
    pub market: Market,
    pub tier: Tier,
    search_key: String,
}

impl ListedStock {
    pub fn new(record: StockRecord, universe: &Universe) -> Self {
        let search_key = format!(
            "{} {}",
            record.symbol,
            record.name.as_deref().unwrap_or_default()
        )
        .to_lowercase();
        ListedStock {
            market: Market::detect(&record.symbol),
            tier: universe.tier_of(&record.symbol),
            record,
            search_key,
        }
    }

    pub fn search_key(&self) -> &str {
        &self.search_key
    }

    pub fn price_text(&self) -> String {
        format_price(self.record.price, self.market)
    }

    pub fn change_text(&self) -> String {
        format_signed_change(self.record.change)
    }

    pub fn percent_text(&self) -> String {
        format_signed_percent(self.record.change_percent)
    }

    pub fn volume_text(&self) -> String {
        format_volume(self.record.volume)
    }

    pub fn class(&self) -> ChangeClass {
        ChangeClass::of(self.record.change_percent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Symbol,
    Name,
    Market,
    Price,
    Change,
    Pct,
    Volume,
    Confidence,
}

enum SortValue<'a> {
    Text(&'a str),
    Number(f64),
}

impl SortKey {
    pub const ALL: [SortKey; 8] = [
        SortKey::Symbol,
        SortKey::Name,
        SortKey::Market,
        SortKey::Price,
        SortKey::Change,
        SortKey::Pct,
        SortKey::Volume,
        SortKey::Confidence,
    ];

    pub fn parse(value: &str) -> Option<SortKey> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == value.trim())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Symbol => "symbol",
            SortKey::Name => "name",
            SortKey::Market => "market",
            SortKey::Price => "price",
            SortKey::Change => "change",
            SortKey::Pct => "pct",
            SortKey::Volume => "volume",
            SortKey::Confidence => "confidence",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Symbol => "銘柄コード",
            SortKey::Name => "銘柄名",
            SortKey::Market => "市場",
            SortKey::Price => "株価",
            SortKey::Change => "前日比",
            SortKey::Pct => "騰落率",
            SortKey::Volume => "出来高",
            SortKey::Confidence => "信頼度",
        }
    }

    fn value(self, stock: &ListedStock) -> SortValue<'_> {
        let record = &stock.record;
        match self {
            SortKey::Symbol => SortValue::Text(&record.symbol),
            SortKey::Name => SortValue::Text(record.name.as_deref().unwrap_or_default()),
            SortKey::Market => SortValue::Text(stock.market.code()),
            SortKey::Price => SortValue::Number(or_zero(record.price)),
            SortKey::Change => SortValue::Number(or_zero(record.change)),
            SortKey::Pct => SortValue::Number(or_zero(record.change_percent)),
            SortKey::Volume => SortValue::Number(or_zero(record.volume).trunc()),
            SortKey::Confidence => SortValue::Number(or_zero(record.sort_confidence())),
        }
    }

    /// Ascending comparison for this key.
    pub fn compare(self, a: &ListedStock, b: &ListedStock) -> Ordering {
        match (self.value(a), self.value(b)) {
            (SortValue::Text(a), SortValue::Text(b)) => locale_cmp(a, b),
            (SortValue::Number(a), SortValue::Number(b)) => {
                a.partial_cmp(&b).unwrap_or(Ordering::Equal)
            }
            _ => Ordering::Equal,
        }
    }
}

fn or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Stand-in for a browser `localeCompare`: lowercase comparison first, then
/// code point order as a tiebreak so the order is total. No collation table
/// is applied, so kana and kanji sort by code point.
fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> SortDirection {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortDirection::Asc => "↑ 昇順",
            SortDirection::Desc => "↓ 降順",
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarketFilter {
    #[default]
    All,
    Only(Market),
}

impl MarketFilter {
    /// Unknown values select every market.
    pub fn parse(value: &str) -> MarketFilter {
        Market::parse(value).map_or(MarketFilter::All, MarketFilter::Only)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MarketFilter::All => "all",
            MarketFilter::Only(market) => market.code(),
        }
    }

    fn matches(self, market: Market) -> bool {
        match self {
            MarketFilter::All => true,
            MarketFilter::Only(wanted) => wanted == market,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TierFilter {
    #[default]
    All,
    Only(Tier),
}

impl TierFilter {
    pub fn parse(value: &str) -> TierFilter {
        Tier::parse(value).map_or(TierFilter::All, TierFilter::Only)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TierFilter::All => "all",
            TierFilter::Only(tier) => tier.as_str(),
        }
    }

    fn matches(self, tier: Tier) -> bool {
        match self {
            TierFilter::All => true,
            TierFilter::Only(wanted) => wanted == tier,
        }
    }
}

/// Full stock set plus the derived filtered and sorted view.
#[derive(Debug, Clone, Default)]
pub struct StockList {
    stocks: Vec<ListedStock>,
    universe: Universe,
    search: String,
    market: MarketFilter,
    tier: TierFilter,
    sort_key: SortKey,
    direction: SortDirection,
    /// Positions into `stocks`, filtered and sorted.
    view: Vec<usize>,
    page: usize,
}

impl StockList {
    pub fn new() -> Self {
        StockList {
            page: 1,
            ..StockList::default()
        }
    }

    /// Replaces the stock set, keeping filters, sort and page. A missing
    /// universe keeps the tiers learned from the last one.
    pub fn load(&mut self, index: StockIndex, universe: Option<Universe>) {
        if let Some(universe) = universe {
            self.universe = universe;
        }
        self.stocks = index
            .stocks
            .into_iter()
            .map(|record| ListedStock::new(record, &self.universe))
            .collect();
        self.rebuild();
        self.page = self.page.clamp(1, self.total_pages().max(1));
    }

    /// Seeds state from the `filter`, `sort` and `q` URL parameters.
    pub fn apply_query(&mut self, filter: Option<&str>, sort: Option<&str>, query: Option<&str>) {
        if let Some(filter) = filter {
            self.market = MarketFilter::parse(filter);
        }
        if let Some(key) = sort.and_then(SortKey::parse) {
            self.sort_key = key;
        }
        if let Some(query) = query {
            self.search = query.to_lowercase();
        }
        self.reset_view();
    }

    /// Surrounding whitespace is ignored, so a stray space from pasting a
    /// ticker still matches.
    pub fn set_search(&mut self, text: &str) {
        self.search = text.trim().to_lowercase();
        self.reset_view();
    }

    pub fn set_market(&mut self, market: MarketFilter) {
        self.market = market;
        self.reset_view();
    }

    pub fn set_tier(&mut self, tier: TierFilter) {
        self.tier = tier;
        self.reset_view();
    }

    pub fn set_sort(&mut self, key: SortKey, direction: SortDirection) {
        self.sort_key = key;
        self.direction = direction;
        self.reset_view();
    }

    pub fn toggle_direction(&mut self) {
        self.set_sort(self.sort_key, self.direction.toggled());
    }

    /// Header click: the active key flips direction, a new key starts ascending.
    pub fn sort_by_header(&mut self, key: SortKey) {
        if key == self.sort_key {
            self.toggle_direction();
        } else {
            self.set_sort(key, SortDirection::Asc);
        }
    }

    /// Moves to `page` without touching the derived view. Out-of-range
    /// requests are ignored.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages() {
            return false;
        }
        self.page = page;
        true
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn market(&self) -> MarketFilter {
        self.market
    }

    pub fn tier(&self) -> TierFilter {
        self.tier
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_len(&self) -> usize {
        self.stocks.len()
    }

    pub fn filtered_len(&self) -> usize {
        self.view.len()
    }

    pub fn filtered(&self) -> impl Iterator<Item = &ListedStock> {
        self.view.iter().map(|idx| &self.stocks[*idx])
    }

    pub fn total_pages(&self) -> usize {
        self.view.len().div_ceil(PAGE_SIZE)
    }

    pub fn page_items(&self) -> impl Iterator<Item = &ListedStock> {
        let start = (self.page.saturating_sub(1)) * PAGE_SIZE;
        self.view
            .iter()
            .skip(start)
            .take(PAGE_SIZE)
            .map(|idx| &self.stocks[*idx])
    }

    /// Up to five page buttons starting two before the current page.
    pub fn page_window(&self) -> RangeInclusive<usize> {
        let total = self.total_pages().max(1);
        let start = self.page.saturating_sub(2).max(1);
        let end = total.min(start + PAGINATION_WINDOW - 1);
        start..=end
    }

    /// `start-end / total 件`, or `None` when pagination is hidden.
    pub fn page_info(&self) -> Option<String> {
        if self.total_pages() <= 1 {
            return None;
        }
        let total = self.view.len();
        let start = (self.page - 1) * PAGE_SIZE + 1;
        let end = (self.page * PAGE_SIZE).min(total);
        Some(format!("{start}-{end} / {total} 件"))
    }

    fn reset_view(&mut self) {
        self.rebuild();
        self.page = 1;
    }

    fn rebuild(&mut self) {
        let search = self.search.as_str();
        let mut view: Vec<usize> = self
            .stocks
            .iter()
            .enumerate()
            .filter(|(_, stock)| {
                (search.is_empty() || stock.search_key.contains(search))
                    && self.market.matches(stock.market)
                    && self.tier.matches(stock.tier)
            })
            .map(|(idx, _)| idx)
            .collect();

        let (key, direction) = (self.sort_key, self.direction);
        view.sort_by(|a, b| direction.apply(key.compare(&self.stocks[*a], &self.stocks[*b])));
        self.view = view;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::types::Snapshot;

    fn list_with(count: usize) -> StockList {
        let stocks: Vec<String> = (0..count)
            .map(|i| format!(r#"{{"symbol": "{}.T", "name": "Stock {i}", "price": {}}}"#, 1000 + i, 10 + i))
            .collect();
        let index = StockIndex::from_body(&format!("[{}]", stocks.join(","))).expect("index");
        let mut list = StockList::new();
        list.load(index, None);
        list
    }

    fn mixed_list() -> StockList {
        let index = StockIndex::from_body(
            r#"{"stocks": [
                {"symbol": "7203.T", "name": "Toyota", "price": 2850},
                {"symbol": "6758.T", "name": "Sony", "price": 13000},
                {"symbol": "9984.T", "name": "SoftBank", "price": 8000},
                {"symbol": "AAPL", "name": "Apple", "price": 190.5},
                {"symbol": "MSFT", "name": "Microsoft", "price": 420.1}
            ]}"#,
        )
        .expect("index");
        let universe = Universe::from_body(
            r#"{"core_universe": [{"ticker": "7203.T"}, {"ticker": "AAPL"}, {"ticker": "6758.T"}]}"#,
        )
        .expect("universe");
        let mut list = StockList::new();
        list.load(index, Some(universe));
        list
    }

    fn symbols(list: &StockList) -> Vec<String> {
        list.filtered().map(|s| s.record.symbol.clone()).collect()
    }

    #[test]
    fn filters_intersect() {
        let mut list = mixed_list();
        list.set_market(MarketFilter::Only(Market::Jp));
        list.set_tier(TierFilter::Only(Tier::Core));
        assert_eq!(symbols(&list), vec!["6758.T", "7203.T"]);

        list.set_search("toyo");
        assert_eq!(symbols(&list), vec!["7203.T"]);

        list.set_search("");
        list.set_market(MarketFilter::Only(Market::Us));
        assert_eq!(symbols(&list), vec!["AAPL"]);
    }

    #[test]
    fn search_matches_symbol_and_name() {
        let mut list = mixed_list();
        list.set_search("SOFT");
        assert_eq!(symbols(&list), vec!["9984.T", "MSFT"]);
        list.set_search("aap");
        assert_eq!(symbols(&list), vec!["AAPL"]);
        list.set_search("  aapl ");
        assert_eq!(list.search(), "aapl");
        assert_eq!(symbols(&list), vec!["AAPL"]);
    }

    #[test]
    fn page_change_keeps_view() {
        let mut list = list_with(120);
        assert_eq!(list.total_pages(), 3);
        let before: Vec<String> = symbols(&list);

        assert!(list.go_to_page(3));
        assert_eq!(list.filtered_len(), 120);
        assert_eq!(symbols(&list), before);
        assert_eq!(list.page_items().count(), 20);
        assert_eq!(list.page_info().as_deref(), Some("101-120 / 120 件"));

        assert!(!list.go_to_page(4));
        assert!(!list.go_to_page(0));
        assert_eq!(list.page(), 3);
    }

    #[test]
    fn filter_or_sort_change_resets_page() {
        let mut list = list_with(120);
        list.go_to_page(2);
        list.set_sort(SortKey::Price, SortDirection::Desc);
        assert_eq!(list.page(), 1);

        list.go_to_page(2);
        list.set_search("stock");
        assert_eq!(list.page(), 1);
    }

    #[test]
    fn descending_is_exact_reverse() {
        let mut list = mixed_list();
        list.set_sort(SortKey::Price, SortDirection::Asc);
        let ascending = symbols(&list);
        assert_eq!(ascending, vec!["AAPL", "MSFT", "7203.T", "9984.T", "6758.T"]);

        list.toggle_direction();
        let mut descending = symbols(&list);
        descending.reverse();
        assert_eq!(descending, ascending);
    }

    #[test]
    fn missing_numbers_sort_as_zero() {
        let index = StockIndex::from_body(
            r#"[{"symbol": "AAA", "price": 5}, {"symbol": "BBB"}, {"symbol": "CCC", "price": -1}]"#,
        )
        .expect("index");
        let mut list = StockList::new();
        list.load(index, None);
        list.set_sort(SortKey::Price, SortDirection::Asc);
        assert_eq!(symbols(&list), vec!["CCC", "BBB", "AAA"]);
    }

    #[test]
    fn header_sort_toggles_or_resets() {
        let mut list = mixed_list();
        list.sort_by_header(SortKey::Symbol);
        assert_eq!(list.direction(), SortDirection::Desc);
        list.sort_by_header(SortKey::Name);
        assert_eq!(
            (list.sort_key(), list.direction()),
            (SortKey::Name, SortDirection::Asc)
        );
        assert_eq!(symbols(&list)[0], "AAPL");
    }

    #[test]
    fn page_window_slides() {
        let mut list = list_with(500);
        assert_eq!(list.page_window(), 1..=5);
        list.go_to_page(6);
        assert_eq!(list.page_window(), 4..=8);
        list.go_to_page(10);
        assert_eq!(list.page_window(), 8..=10);
    }

    #[test]
    fn query_seeds_state() {
        let mut list = mixed_list();
        list.apply_query(Some("JP"), Some("price"), Some("S"));
        assert_eq!(list.market(), MarketFilter::Only(Market::Jp));
        assert_eq!(list.sort_key(), SortKey::Price);
        assert_eq!(symbols(&list), vec!["9984.T", "6758.T"]);

        list.apply_query(Some("crypto"), Some("bogus"), None);
        assert_eq!(list.market(), MarketFilter::All);
        assert_eq!(list.sort_key(), SortKey::Price);
    }

    #[test]
    fn reload_remembers_universe_and_page() {
        let mut list = mixed_list();
        list.set_tier(TierFilter::Only(Tier::Core));
        let index = StockIndex::from_body(r#"[{"symbol": "7203.T"}, {"symbol": "MSFT"}]"#)
            .expect("index");
        list.load(index, None);
        assert_eq!(symbols(&list), vec!["7203.T"]);
        assert_eq!(list.page_info(), None);
    }
}
