//! Page-view performance metrics: collection, delivery and ingest.

// Client side
pub mod aggregator;
pub mod delivery;
pub mod observers;
pub mod record;

// Collection endpoint
pub mod http;
pub mod storage;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use aggregator::{PageView, PageViewHandle, SessionOutcome};
pub use config::VitalsConfig;
pub use delivery::DeliveryClient;
pub use http::CollectorServer;
pub use lifecycle::Shutdown;
pub use record::MetricsRecord;
