//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight requests → Exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::{wait_for_shutdown, Shutdown};
pub use signals::{spawn_signal_listener, wait_for_signal};
