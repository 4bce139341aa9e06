//! Interaction timing aggregation.
//!
//! Several event entries can belong to one interaction (pointerdown,
//! pointerup, click); they collapse to the longest one. Across interactions
//! the reported value is the maximum while samples are few, and the 75th
//! percentile once there are enough of them.

use std::collections::HashMap;

/// Distinct interactions needed before the percentile replaces the maximum.
pub const PERCENTILE_MIN_SAMPLES: usize = 5;

#[derive(Debug, Default, Clone)]
pub struct InteractionSamples {
    by_interaction: HashMap<u64, f64>,
}

impl InteractionSamples {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one event duration for `interaction_id`.
    pub fn record(&mut self, interaction_id: u64, duration: f64) {
        if !duration.is_finite() || duration < 0.0 {
            return;
        }
        let slot = self.by_interaction.entry(interaction_id).or_insert(duration);
        if duration > *slot {
            *slot = duration;
        }
    }

    /// Number of distinct interactions.
    pub fn len(&self) -> usize {
        self.by_interaction.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_interaction.is_empty()
    }

    /// The value to report as INP.
    pub fn value(&self) -> Option<f64> {
        let mut durations: Vec<f64> = self.by_interaction.values().copied().collect();
        if durations.is_empty() {
            return None;
        }
        durations.sort_by(|a, b| a.total_cmp(b));
        if durations.len() < PERCENTILE_MIN_SAMPLES {
            return durations.last().copied();
        }
        Some(percentile_75(&durations))
    }
}

/// Element at `floor(n * 0.75)` of an ascending, non-empty slice.
fn percentile_75(sorted: &[f64]) -> f64 {
    let idx = (sorted.len() * 3 / 4).min(sorted.len() - 1);
    sorted[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(durations: &[f64]) -> InteractionSamples {
        let mut s = InteractionSamples::new();
        for (i, d) in durations.iter().enumerate() {
            s.record(i as u64 + 1, *d);
        }
        s
    }

    #[test]
    fn test_empty() {
        assert_eq!(InteractionSamples::new().value(), None);
    }

    #[test]
    fn test_few_samples_report_maximum() {
        assert_eq!(samples(&[80.0]).value(), Some(80.0));
        assert_eq!(samples(&[80.0, 210.0, 64.0]).value(), Some(210.0));
    }

    #[test]
    fn test_percentile_with_enough_samples() {
        // sorted: [40, 55, 60, 120, 300], floor(5 * 0.75) = 3
        let s = samples(&[40.0, 120.0, 55.0, 300.0, 60.0]);
        assert_eq!(s.len(), 5);
        assert_eq!(s.value(), Some(120.0));
    }

    #[test]
    fn test_same_interaction_keeps_longest_entry() {
        let mut s = InteractionSamples::new();
        s.record(7, 24.0);
        s.record(7, 96.0);
        s.record(7, 40.0);
        assert_eq!(s.len(), 1);
        assert_eq!(s.value(), Some(96.0));
    }

    #[test]
    fn test_negative_duration_ignored() {
        let mut s = InteractionSamples::new();
        s.record(1, -3.0);
        assert!(s.is_empty());
    }
}
