//! page-vitals collection endpoint.
//!
//! # Architecture Overview
//!
//! ```text
//! page view (browser side)
//!     observers → aggregator → delivery (fetch, beacon, retry)
//!         │
//!         │ POST /api/metrics
//!         ▼
//! collection endpoint (this binary)
//!     http → storage → performance_metrics.json / performance_metrics.csv
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use page_vitals::config::load_or_default;
use page_vitals::lifecycle::{spawn_signal_listener, Shutdown};
use page_vitals::observability::{logging, metrics};
use page_vitals::CollectorServer;

#[derive(Parser)]
#[command(name = "page-vitals")]
#[command(about = "Collection endpoint for page-view performance metrics", long_about = None)]
struct Args {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_or_default(args.config.as_deref())?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!("page-vitals v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        store_dir = %config.storage.dir,
        max_body_size = config.security.max_body_size,
        request_timeout_secs = config.security.request_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    let server = CollectorServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
