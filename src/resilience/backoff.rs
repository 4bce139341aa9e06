//! Linear backoff between delivery attempts.

use std::time::Duration;

/// Delay before retry number `attempt`: `attempt * step`.
///
/// Attempt 0 is the initial try and waits nothing.
pub fn linear_backoff(attempt: u32, step: Duration) -> Duration {
    step.saturating_mul(attempt)
}
