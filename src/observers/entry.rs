//! Performance entries as reported by the host environment.

use std::fmt;

/// Observation type a performance source may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    Navigation,
    Paint,
    LargestContentfulPaint,
    FirstInput,
    Event,
    LayoutShift,
}

impl EntryType {
    pub const ALL: [EntryType; 6] = [
        EntryType::Navigation,
        EntryType::Paint,
        EntryType::LargestContentfulPaint,
        EntryType::FirstInput,
        EntryType::Event,
        EntryType::LayoutShift,
    ];

    /// The entry type name used by browser performance timelines.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Navigation => "navigation",
            EntryType::Paint => "paint",
            EntryType::LargestContentfulPaint => "largest-contentful-paint",
            EntryType::FirstInput => "first-input",
            EntryType::Event => "event",
            EntryType::LayoutShift => "layout-shift",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Navigation timestamps, in milliseconds relative to navigation start.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NavigationTiming {
    pub request_start: f64,
    pub response_start: f64,
    /// Zero until the load event has finished.
    pub load_event_end: f64,
}

/// A single entry on the performance timeline.
#[derive(Debug, Clone, PartialEq)]
pub enum PerformanceEntry {
    Navigation(NavigationTiming),
    Paint {
        name: String,
        start_time: f64,
    },
    LargestContentfulPaint {
        start_time: f64,
    },
    FirstInput {
        start_time: f64,
        processing_start: f64,
    },
    Event {
        /// Present (and non-zero) only for entries that belong to a user interaction.
        interaction_id: Option<u64>,
        duration: f64,
    },
    LayoutShift {
        value: f64,
        had_recent_input: bool,
    },
}

impl PerformanceEntry {
    pub fn entry_type(&self) -> EntryType {
        match self {
            PerformanceEntry::Navigation(_) => EntryType::Navigation,
            PerformanceEntry::Paint { .. } => EntryType::Paint,
            PerformanceEntry::LargestContentfulPaint { .. } => EntryType::LargestContentfulPaint,
            PerformanceEntry::FirstInput { .. } => EntryType::FirstInput,
            PerformanceEntry::Event { .. } => EntryType::Event,
            PerformanceEntry::LayoutShift { .. } => EntryType::LayoutShift,
        }
    }
}
