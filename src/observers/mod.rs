//! Browser performance observation subsystem.
//!
//! # Data Flow
//! ```text
//! PerformanceSource (host timeline)
//!     → capabilities.rs (detect supported entry types once)
//!     → observer.rs (observe(metric) → normalized Observation stream)
//!         ↳ unsupported LCP: load-event fallback after a grace delay
//!     → interaction.rs (collapse event entries into an INP value)
//!     → aggregator (per-page-view context)
//! ```
//!
//! # Design Decisions
//! - Unsupported observation types are a typed error, never a panic
//! - Each subscription is a handle that cancels on drop
//! - Handles for one page view live in an `ObserverGroup`

pub mod capabilities;
pub mod entry;
pub mod feed;
pub mod interaction;
pub mod observer;
pub mod source;

pub use capabilities::Capabilities;
pub use entry::{EntryType, NavigationTiming, PerformanceEntry};
pub use feed::EntryFeed;
pub use interaction::InteractionSamples;
pub use observer::{
    observe, spawn_lcp_fallback, Observation, ObserverError, ObserverGroup, ObserverHandle,
};
pub use source::{EntryStream, PerformanceSource};
