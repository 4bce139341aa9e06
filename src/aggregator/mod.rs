//! Metrics aggregator.
//!
//! # Responsibilities
//! - Own the per-page-view record and apply observations to it
//! - Decide when the record is finalized
//! - Hand the finalized record to delivery exactly once
//!
//! # Data Flow
//! ```text
//! observers ──Observation──▶ PageViewContext::apply
//!                                   │ ready?
//! session timer ────────────────────┤
//! interaction wait ─────────────────┤
//!                                   ▼
//!                          SendLatch::try_claim
//!                                   │ first wins
//!                                   ▼
//!                          DeliveryClient::deliver
//! ```
//!
//! # Design Decisions
//! - One task per page view; all triggers meet in a single `select!`
//! - The latch is the only synchronization point for finalization
//! - Teardown wins over everything, including an in-flight delivery

pub mod latch;
pub mod policy;
pub mod session;

pub use latch::SendLatch;
pub use policy::ReadinessPolicy;
pub use session::{
    FinalizeTrigger, PageView, PageViewContext, PageViewHandle, SessionOutcome, SessionSettings,
    Signal,
};
