//! Collection endpoint.
//!
//! # Data Flow
//! ```text
//! POST /api/metrics
//!     → server.rs (CORS, trace, request ID, timeout, body limit)
//!     → handlers.rs (parse JSON, require pageUrl, assign id)
//!     → storage::FileStore (JSON array + CSV row)
//!     → response.rs ({"success":true,"id":...} or ApiError)
//! ```

pub mod handlers;
pub mod response;
pub mod server;

pub use response::{Ack, ApiError, ErrorBody, StatusBody};
pub use server::{AppState, CollectorServer, METRICS_ROUTE, STATUS_ROUTE};
