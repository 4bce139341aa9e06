//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Delivery attempt fails (primary and fallback transport):
//!     → backoff.rs (linear delay: 1 × step, 2 × step, ...)
//!     → next attempt, until the retry bound is reached
//! ```
//!
//! # Design Decisions
//! - Retries are bounded; telemetry loss after the last attempt is accepted
//! - Backoff is linear and deterministic (no jitter)

pub mod backoff;
