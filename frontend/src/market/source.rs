use std::fmt;

use futures::future::LocalBoxFuture;
use thiserror::Error;

use super::types::{Snapshot, StockRecord};

/// Every JSON snapshot the dashboard reads. Paths are relative to the origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    RealtimePrices,
    Summary,
    MajorIndices,
    Rankings,
    ExtendedRankings,
    PeriodRankings,
    StockIndex,
    Universe,
    Stock(String),
    ChartData,
    HistoricalData,
}

impl Endpoint {
    pub fn path(&self) -> String {
        match self {
            Endpoint::RealtimePrices => "/data/realtime_prices.json".to_string(),
            Endpoint::Summary => "/api/summary.json".to_string(),
            Endpoint::MajorIndices => "/api/major_indices.json".to_string(),
            Endpoint::Rankings => "/api/rankings.json".to_string(),
            Endpoint::ExtendedRankings => "/api/extended_rankings.json".to_string(),
            Endpoint::PeriodRankings => "/api/period_rankings.json".to_string(),
            Endpoint::StockIndex => "/api/stocks/index.json".to_string(),
            Endpoint::Universe => "/api/universe.json".to_string(),
            Endpoint::Stock(symbol) => format!("/api/stocks/{symbol}.json"),
            Endpoint::ChartData => "/data/chart_data.json".to_string(),
            Endpoint::HistoricalData => "/data/historical_data.json".to_string(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected HTTP status {0}")]
    Http(u16),
    #[error("malformed payload: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

/// Retrieves the raw body of an endpoint. A non-2xx response is an error.
pub trait SnapshotFetcher {
    fn fetch(&self, endpoint: &Endpoint) -> LocalBoxFuture<'_, Result<String, FetchError>>;
}

/// Fetches and parses a snapshot in one step.
pub async fn fetch_snapshot<T, F>(fetcher: &F) -> Result<T, FetchError>
where
    T: Snapshot,
    F: SnapshotFetcher + ?Sized,
{
    let endpoint = T::endpoint();
    let body = fetcher.fetch(&endpoint).await?;
    T::from_body(&body).map_err(FetchError::from)
}

/// Per-symbol quote from `/api/stocks/{symbol}.json`.
pub async fn fetch_stock<F>(fetcher: &F, symbol: &str) -> Result<StockRecord, FetchError>
where
    F: SnapshotFetcher + ?Sized,
{
    let body = fetcher.fetch(&Endpoint::Stock(symbol.to_string())).await?;
    let mut record: StockRecord = serde_json::from_str(&body)?;
    if record.symbol.is_empty() {
        record.symbol = symbol.to_string();
    }
    Ok(record)
}

/// Same-origin HTTP fetcher backed by `gloo-net`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFetcher;

#[cfg(target_arch = "wasm32")]
impl SnapshotFetcher for HttpFetcher {
    fn fetch(&self, endpoint: &Endpoint) -> LocalBoxFuture<'_, Result<String, FetchError>> {
        use futures::FutureExt;
        use gloo_net::http::Request;

        let path = endpoint.path();
        async move {
            let response = Request::get(&path)
                .send()
                .await
                .map_err(|err| FetchError::Network(err.to_string()))?;
            if !response.ok() {
                return Err(FetchError::Http(response.status()));
            }
            response
                .text()
                .await
                .map_err(|err| FetchError::Network(err.to_string()))
        }
        .boxed_local()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl SnapshotFetcher for HttpFetcher {
    fn fetch(&self, endpoint: &Endpoint) -> LocalBoxFuture<'_, Result<String, FetchError>> {
        use futures::FutureExt;

        let path = endpoint.path();
        async move { Err(FetchError::Network(format!("no browser to fetch {path}"))) }.boxed_local()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use futures::FutureExt;

    use super::*;

    /// Serves canned bodies and records the order of requests.
    #[derive(Default)]
    pub struct MemoryFetcher {
        responses: RefCell<HashMap<String, Result<String, FetchError>>>,
        requests: RefCell<Vec<String>>,
    }

    impl MemoryFetcher {
        pub fn with(self, endpoint: Endpoint, body: &str) -> Self {
            self.responses
                .borrow_mut()
                .insert(endpoint.path(), Ok(body.to_string()));
            self
        }

        pub fn failing(self, endpoint: Endpoint, error: FetchError) -> Self {
            self.responses
                .borrow_mut()
                .insert(endpoint.path(), Err(error));
            self
        }

        pub fn set(&self, endpoint: Endpoint, response: Result<String, FetchError>) {
            self.responses.borrow_mut().insert(endpoint.path(), response);
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.borrow().clone()
        }

        pub fn count(&self, endpoint: &Endpoint) -> usize {
            let path = endpoint.path();
            self.requests.borrow().iter().filter(|p| **p == path).count()
        }
    }

    impl SnapshotFetcher for MemoryFetcher {
        fn fetch(&self, endpoint: &Endpoint) -> LocalBoxFuture<'_, Result<String, FetchError>> {
            let path = endpoint.path();
            self.requests.borrow_mut().push(path.clone());
            let response = self
                .responses
                .borrow()
                .get(&path)
                .cloned()
                .unwrap_or(Err(FetchError::Http(404)));
            async move { response }.boxed_local()
        }
    }
}
