use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use dashboard_frontend::market::source::{Endpoint, FetchError, SnapshotFetcher};
use futures::future::{FutureExt, LocalBoxFuture};

/// Reads snapshots from a directory laid out like the served origin, so
/// `/api/rankings.json` lives at `<root>/api/rankings.json`.
#[derive(Debug, Clone)]
pub struct SnapshotDir {
    root: PathBuf,
}

impl SnapshotDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn file_for(&self, endpoint: &Endpoint) -> PathBuf {
        self.root.join(endpoint.path().trim_start_matches('/'))
    }

    /// Symbols with a per-symbol quote file under `api/stocks/`, sorted.
    pub async fn stock_symbols(&self) -> std::io::Result<Vec<String>> {
        let dir = self.root.join("api").join("stocks");
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };

        let mut symbols = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match path.file_stem().and_then(|stem| stem.to_str()) {
                Some("index") | None => {}
                Some(symbol) => symbols.push(symbol.to_string()),
            }
        }
        symbols.sort();
        Ok(symbols)
    }
}

impl SnapshotFetcher for SnapshotDir {
    fn fetch(&self, endpoint: &Endpoint) -> LocalBoxFuture<'_, Result<String, FetchError>> {
        let path = self.file_for(endpoint);
        async move {
            match tokio::fs::read_to_string(&path).await {
                Ok(body) => Ok(body),
                // Same shape the browser sees for an absent file.
                Err(err) if err.kind() == ErrorKind::NotFound => Err(FetchError::Http(404)),
                Err(err) => Err(FetchError::Network(format!("{}: {err}", path.display()))),
            }
        }
        .boxed_local()
    }
}
