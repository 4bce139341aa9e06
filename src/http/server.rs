//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the collection handlers
//! - Wire up middleware (CORS, tracing, limits, request ID)
//! - Bind server to listener and drain on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::VitalsConfig;
use crate::http::handlers::{ingest_metrics, status};
use crate::lifecycle::wait_for_shutdown;
use crate::storage::FileStore;

pub const METRICS_ROUTE: &str = "/api/metrics";
pub const STATUS_ROUTE: &str = "/status";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<FileStore>,
}

/// The collection endpoint.
pub struct CollectorServer {
    router: Router,
    config: VitalsConfig,
    store: Arc<FileStore>,
}

impl CollectorServer {
    /// Create a new server with the given configuration.
    pub fn new(config: VitalsConfig) -> Self {
        let store = Arc::new(FileStore::new(&config.storage.dir));
        let state = AppState {
            store: store.clone(),
        };
        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            store,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &VitalsConfig, state: AppState) -> Router {
        let router = Router::new()
            .route(METRICS_ROUTE, post(ingest_metrics))
            .route(STATUS_ROUTE, get(status))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.security.request_timeout_secs,
            )))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            );

        if config.security.cors_permissive {
            router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
        } else {
            router
        }
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            store = %self.store.dir().display(),
            cors_permissive = self.config.security.cors_permissive,
            "Collection endpoint starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await?;

        tracing::info!("Collection endpoint stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &VitalsConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<FileStore> {
        self.store.clone()
    }
}
