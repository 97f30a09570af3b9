use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use market_dashboard::{logging, serve};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

fn write(root: &Path, relative: &str, body: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("mkdir");
    }
    std::fs::write(path, body).expect("write fixture");
}

struct Running {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<anyhow::Result<()>>,
}

async fn start(root: &Path, dist: &Path) -> Running {
    logging::set_silent(true);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    let (stop, stopped) = oneshot::channel::<()>();
    let root = root.to_path_buf();
    let dist = dist.to_path_buf();

    let handle = tokio::spawn(async move {
        serve::serve(listener, &root, &dist, async move {
            let _ = stopped.await;
        })
        .await
    });

    Running { addr, stop, handle }
}

/// Minimal HTTP/1.1 GET returning `(status, body)`.
async fn get(addr: SocketAddr, path: &str) -> (u16, String) {
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    let request = format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.expect("send request");

    let mut raw = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut raw))
        .await
        .expect("response before timeout")
        .expect("read response");
    let text = String::from_utf8_lossy(&raw).into_owned();

    let status = text
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .expect("status line");
    let body = text
        .split_once("\r\n\r\n")
        .map(|(_, body)| body.to_string())
        .unwrap_or_default();
    (status, body)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn serves_snapshots_and_client_routes() {
    let root = tempfile::tempdir().expect("snapshot root");
    let dist = tempfile::tempdir().expect("dist");
    write(root.path(), "api/rankings.json", r#"{"gainers": []}"#);
    write(root.path(), "data/chart_data.json", r#"{"charts": {}}"#);
    write(dist.path(), "index.html", "<html>dashboard</html>");

    let server = start(root.path(), dist.path()).await;

    let (status, body) = get(server.addr, "/api/rankings.json").await;
    assert_eq!(status, 200);
    assert!(body.contains("gainers"));

    let (status, body) = get(server.addr, "/data/chart_data.json").await;
    assert_eq!(status, 200);
    assert!(body.contains("charts"));

    let (status, body) = get(server.addr, "/stocks/detail?s=7203.T").await;
    assert_eq!(status, 200);
    assert!(body.contains("dashboard"), "client routes fall back to index.html");

    let (status, _) = get(server.addr, "/api/summary.json").await;
    assert_eq!(status, 404, "missing snapshots stay 404 for the dashboard to handle");

    server.stop.send(()).expect("server still running");
    let result = tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("graceful shutdown")
        .expect("server task");
    assert!(result.is_ok());
}
