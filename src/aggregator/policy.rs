//! Readiness policy.

use serde::{Deserialize, Serialize};

use crate::record::MetricsRecord;

/// When a record is complete enough to send before the session timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessPolicy {
    /// TTFB and LCP (observed or fallback) both present.
    #[default]
    TtfbAndLcp,
    /// LCP present.
    LcpOnly,
    /// Sent after a user interaction and its bounded wait.
    FirstInteraction,
}

impl ReadinessPolicy {
    pub fn is_ready(&self, record: &MetricsRecord) -> bool {
        match self {
            ReadinessPolicy::TtfbAndLcp => record.ttfb.is_some() && record.lcp.is_some(),
            ReadinessPolicy::LcpOnly => record.lcp.is_some(),
            ReadinessPolicy::FirstInteraction => false,
        }
    }

    pub fn is_interaction_driven(&self) -> bool {
        matches!(self, ReadinessPolicy::FirstInteraction)
    }
}
