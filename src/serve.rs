use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::Router;
use clap::Args;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};

use crate::constants::{DEFAULT_ADDR, DEFAULT_DIST_DIR, DEFAULT_SNAPSHOT_ROOT};
use crate::logging;

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    /// Snapshot directory holding `api/` and `data/`
    #[arg(long, default_value = DEFAULT_SNAPSHOT_ROOT)]
    pub root: PathBuf,

    /// Built frontend (trunk `dist/` output)
    #[arg(long, default_value = DEFAULT_DIST_DIR)]
    pub dist: PathBuf,

    /// Address to listen on
    #[arg(long, default_value = DEFAULT_ADDR)]
    pub addr: String,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_SNAPSHOT_ROOT),
            dist: PathBuf::from(DEFAULT_DIST_DIR),
            addr: DEFAULT_ADDR.to_string(),
        }
    }
}

/// `/api/*` and `/data/*` come from the snapshot root; any other path is a
/// frontend asset, falling back to `index.html` so client-side routes such
/// as `/stocks/detail` load the app.
pub fn router(root: &Path, dist: &Path) -> Router {
    let index = ServeFile::new(dist.join("index.html"));

    Router::new()
        .nest_service("/api", ServeDir::new(root.join("api")))
        .nest_service("/data", ServeDir::new(root.join("data")))
        .fallback_service(ServeDir::new(dist).fallback(index))
}

pub async fn run(args: ServeArgs) -> Result<()> {
    if !args.dist.join("index.html").is_file() {
        logging::warn(
            "serve.dist_missing",
            "Frontend build not found; only snapshot paths will resolve",
            json!({ "dist": args.dist.display().to_string() }),
        );
    }

    let listener = TcpListener::bind(args.addr.as_str())
        .await
        .with_context(|| format!("failed to bind dashboard server at {}", args.addr))?;

    serve(listener, &args.root, &args.dist, shutdown_signal()).await
}

/// Serves until `shutdown` resolves, then drains in-flight requests.
pub async fn serve<S>(listener: TcpListener, root: &Path, dist: &Path, shutdown: S) -> Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener
        .local_addr()
        .context("failed to read dashboard server address")?;
    logging::info(
        "serve.bind",
        "Dashboard server listening",
        logging::metadata_from_pairs(&[
            ("addr", json!(local_addr.to_string())),
            ("root", json!(root.display().to_string())),
            ("dist", json!(dist.display().to_string())),
        ]),
    );

    axum::serve(listener, router(root, dist).into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .context("dashboard server terminated with error")?;

    logging::info_simple("serve.stop", "Dashboard server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        logging::warn(
            "signal.error",
            "Failed to listen for Ctrl-C; serving until killed",
            json!({ "error": err.to_string() }),
        );
        std::future::pending::<()>().await;
    }
    logging::info(
        "signal.received",
        "Shutdown requested",
        json!({ "signal": "SIGINT" }),
    );
}
