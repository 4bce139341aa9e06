//! Metric identifiers.

use std::fmt;

/// A timing field tracked on a [`MetricsRecord`](super::MetricsRecord).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    /// Time to first byte.
    Ttfb,
    /// Largest contentful paint.
    Lcp,
    /// First contentful paint.
    Fcp,
    /// Cumulative layout shift.
    Cls,
    /// First input delay.
    Fid,
    /// Interaction to next paint.
    Inp,
}

impl MetricName {
    /// Every tracked metric, in registration order.
    pub const ALL: [MetricName; 6] = [
        MetricName::Ttfb,
        MetricName::Lcp,
        MetricName::Fcp,
        MetricName::Cls,
        MetricName::Fid,
        MetricName::Inp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::Ttfb => "ttfb",
            MetricName::Lcp => "lcp",
            MetricName::Fcp => "fcp",
            MetricName::Cls => "cls",
            MetricName::Fid => "fid",
            MetricName::Inp => "inp",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
