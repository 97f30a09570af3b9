use log::warn;

use super::classify::ChangeClass;
use super::constants::{
    LOADING_TEXT, MISSING_VALUE, WATCHLIST_DISPLAY_LIMIT, WATCHLIST_STORAGE_KEY,
};
use super::format::{format_percent, format_price};
use super::refresh::SnapshotCache;
use super::source::{SnapshotFetcher, fetch_stock};
use super::storage::{KeyValueStore, StorageError};
use super::types::StockRecord;

/// Ordered, duplicate-free list of watched symbols persisted as a JSON array.
#[derive(Debug)]
pub struct Watchlist<S> {
    store: S,
    symbols: Vec<String>,
}

impl<S: KeyValueStore> Watchlist<S> {
    /// Reads the persisted list, writing an empty one if none exists yet.
    pub fn load(store: S) -> Self {
        let symbols = read_symbols(&store);
        Watchlist { store, symbols }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|watched| watched == symbol)
    }

    /// Entries shown on the dashboard.
    pub fn display_symbols(&self) -> &[String] {
        let end = self.symbols.len().min(WATCHLIST_DISPLAY_LIMIT);
        &self.symbols[..end]
    }

    /// Appends `symbol` if absent, removes it if present, and persists.
    /// Returns whether the symbol is watched afterwards.
    pub fn toggle(&mut self, symbol: &str) -> Result<bool, StorageError> {
        // Another page may have changed the list since it was loaded.
        let mut symbols = read_symbols(&self.store);
        let watched = match symbols.iter().position(|watched| watched == symbol) {
            Some(idx) => {
                symbols.remove(idx);
                false
            }
            None => {
                symbols.push(symbol.to_string());
                true
            }
        };

        let encoded = serde_json::to_string(&symbols)
            .map_err(|err| StorageError::Write(err.to_string()))?;
        self.store.set(WATCHLIST_STORAGE_KEY, &encoded)?;
        self.symbols = symbols;
        Ok(watched)
    }
}

fn read_symbols<S: KeyValueStore>(store: &S) -> Vec<String> {
    match store.get(WATCHLIST_STORAGE_KEY) {
        Ok(Some(raw)) => serde_json::from_str::<Vec<String>>(&raw).unwrap_or_else(|err| {
            warn!("ignoring malformed watchlist: {err}");
            Vec::new()
        }),
        Ok(None) => {
            if let Err(err) = store.set(WATCHLIST_STORAGE_KEY, "[]") {
                warn!("could not initialise watchlist: {err}");
            }
            Vec::new()
        }
        Err(err) => {
            warn!("watchlist unavailable: {err}");
            Vec::new()
        }
    }
}

/// Finds a symbol in already-fetched data: rankings, then international
/// indices, then realtime quotes.
pub fn lookup_quote<'a>(cache: &'a SnapshotCache, symbol: &str) -> Option<&'a StockRecord> {
    let rankings = cache
        .rankings
        .as_ref()
        .and_then(|rankings| rankings.0.find(symbol))
        .or_else(|| {
            cache
                .extended_rankings
                .as_ref()
                .and_then(|rankings| rankings.0.find(symbol))
        });
    rankings
        .or_else(|| {
            cache
                .major_indices
                .as_ref()
                .and_then(|indices| indices.find(symbol))
        })
        .or_else(|| {
            cache
                .realtime
                .as_ref()
                .and_then(|realtime| realtime.find(symbol))
        })
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatchQuote {
    pub symbol: String,
    pub price: String,
    pub change: String,
    pub class: ChangeClass,
}

impl WatchQuote {
    pub fn pending(symbol: &str) -> WatchQuote {
        WatchQuote {
            symbol: symbol.to_string(),
            price: LOADING_TEXT.to_string(),
            change: MISSING_VALUE.to_string(),
            class: ChangeClass::Neutral,
        }
    }

    pub fn from_record(symbol: &str, record: &StockRecord) -> WatchQuote {
        WatchQuote {
            symbol: symbol.to_string(),
            price: format_price(record.price, record.market()),
            change: format_percent(record.change_percent),
            class: ChangeClass::of(record.change),
        }
    }
}

/// Resolves each symbol from the cache, fetching the per-symbol snapshot for
/// the rest. Misses keep their placeholders.
pub async fn resolve_quotes<F>(
    fetcher: &F,
    cache: &SnapshotCache,
    symbols: &[String],
) -> Vec<WatchQuote>
where
    F: SnapshotFetcher + ?Sized,
{
    let mut quotes = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        if let Some(record) = lookup_quote(cache, symbol) {
            quotes.push(WatchQuote::from_record(symbol, record));
            continue;
        }
        match fetch_stock(fetcher, symbol).await {
            Ok(record) => quotes.push(WatchQuote::from_record(symbol, &record)),
            Err(err) => {
                warn!("watchlist quote for {symbol} failed: {err}");
                quotes.push(WatchQuote::pending(symbol));
            }
        }
    }
    quotes
}
