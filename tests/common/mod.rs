//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use page_vitals::config::VitalsConfig;
use page_vitals::lifecycle::Shutdown;
use page_vitals::CollectorServer;
use serde_json::Value;
use tokio::net::TcpListener;

/// A running collection endpoint on an ephemeral port.
pub struct Collector {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

#[allow(dead_code)]
impl Collector {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start the real collection endpoint storing under `store_dir`.
#[allow(dead_code)]
pub async fn start_collector(store_dir: &Path) -> Collector {
    let mut config = VitalsConfig::default();
    config.storage.dir = store_dir.display().to_string();
    start_collector_with(config).await
}

#[allow(dead_code)]
pub async fn start_collector_with(mut config: VitalsConfig) -> Collector {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server = CollectorServer::new(config);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    Collector { addr, shutdown }
}

/// A programmable metrics sink.
#[allow(dead_code)]
#[derive(Clone)]
pub struct Sink {
    pub addr: SocketAddr,
    hits: Arc<AtomicU32>,
    accepted: Arc<Mutex<Vec<Value>>>,
}

#[allow(dead_code)]
impl Sink {
    pub fn endpoint(&self) -> String {
        format!("http://{}/api/metrics", self.addr)
    }

    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }

    /// Bodies answered with a 2xx status.
    pub fn accepted(&self) -> Vec<Value> {
        self.accepted.lock().unwrap().clone()
    }

    /// Poll until `n` bodies were accepted or `timeout` elapses.
    pub async fn wait_for_accepted(&self, n: usize, timeout: Duration) -> Vec<Value> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let accepted = self.accepted();
            if accepted.len() >= n || tokio::time::Instant::now() >= deadline {
                return accepted;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

struct SinkState {
    respond: Box<dyn Fn(u32) -> u16 + Send + Sync>,
    hits: Arc<AtomicU32>,
    accepted: Arc<Mutex<Vec<Value>>>,
}

/// Start a sink whose status for hit number `n` (0-based) is `respond(n)`.
#[allow(dead_code)]
pub async fn start_programmable_sink<F>(respond: F) -> Sink
where
    F: Fn(u32) -> u16 + Send + Sync + 'static,
{
    let hits = Arc::new(AtomicU32::new(0));
    let accepted = Arc::new(Mutex::new(Vec::new()));
    let state = Arc::new(SinkState {
        respond: Box::new(respond),
        hits: hits.clone(),
        accepted: accepted.clone(),
    });

    let app = Router::new()
        .route("/api/metrics", post(sink_handler))
        .with_state(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Sink {
        addr,
        hits,
        accepted,
    }
}

async fn sink_handler(State(state): State<Arc<SinkState>>, body: Bytes) -> StatusCode {
    let n = state.hits.fetch_add(1, Ordering::SeqCst);
    let status = StatusCode::from_u16((state.respond)(n)).unwrap_or(StatusCode::OK);
    if status.is_success() {
        if let Ok(value) = serde_json::from_slice::<Value>(&body) {
            state.accepted.lock().unwrap().push(value);
        }
    }
    status
}

/// Client that never reuses connections between tests.
#[allow(dead_code)]
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
