//! Delivery subsystem.
//!
//! # Data Flow
//! ```text
//! Finalized MetricsRecord
//!     → client.rs (offline check, attempt loop)
//!     → transport.rs (HTTP POST, then beacon fallback)
//!     → resilience::backoff (linear delay between attempts)
//!     → DeliveryOutcome (Sent / Offline / Exhausted)
//! ```
//!
//! # Design Decisions
//! - Best-effort telemetry: failures end in a log line, never an error
//! - No persistence of unsent records
//! - Offline short-circuits before any attempt, including retries

pub mod client;
pub mod error;
pub mod network;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{DeliveryClient, DeliveryOutcome};
pub use error::{DeliveryError, DeliveryResult};
pub use network::NetworkStatus;
pub use transport::{BeaconTransport, HttpTransport, Transport, TransportKind, BEACON_MAX_PAYLOAD};
