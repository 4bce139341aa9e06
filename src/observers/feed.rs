//! In-process performance source.
//!
//! The host pushes entries as the page produces them; observers receive
//! buffered entries first and then live ones. Used by the CLI simulator,
//! the tests, and any runtime that forwards timeline entries into Rust.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc;

use crate::delivery::NetworkStatus;
use crate::observers::entry::{EntryType, NavigationTiming, PerformanceEntry};
use crate::observers::source::{EntryStream, PerformanceSource};
use crate::record::DeviceContext;

#[derive(Default)]
struct FeedState {
    buffer: Vec<PerformanceEntry>,
    navigation: Option<NavigationTiming>,
    subscribers: Vec<(EntryType, mpsc::UnboundedSender<PerformanceEntry>)>,
}

/// A performance source fed by the host.
pub struct EntryFeed {
    supported: HashSet<EntryType>,
    device: DeviceContext,
    network: NetworkStatus,
    state: Mutex<FeedState>,
}

impl EntryFeed {
    /// Create a feed that supports every entry type.
    pub fn new(device: DeviceContext, network: NetworkStatus) -> Self {
        Self {
            supported: EntryType::ALL.into_iter().collect(),
            device,
            network,
            state: Mutex::new(FeedState::default()),
        }
    }

    /// Drop support for `kind`, as an older client would.
    pub fn without(mut self, kind: EntryType) -> Self {
        self.supported.remove(&kind);
        self
    }

    /// Append an entry to the timeline. Returns false if the type is unsupported.
    pub fn push(&self, entry: PerformanceEntry) -> bool {
        let kind = entry.entry_type();
        // Navigation timing stays readable for the LCP fallback even when
        // navigation entries cannot be observed.
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let PerformanceEntry::Navigation(timing) = &entry {
            state.navigation = Some(*timing);
        }
        if !self.supported.contains(&kind) {
            return false;
        }
        // Closed subscribers are pruned here.
        state
            .subscribers
            .retain(|(k, tx)| *k != kind || tx.send(entry.clone()).is_ok());
        state.buffer.push(entry);
        true
    }
}

impl PerformanceSource for EntryFeed {
    fn supported_entry_types(&self) -> Vec<EntryType> {
        EntryType::ALL
            .into_iter()
            .filter(|k| self.supported.contains(k))
            .collect()
    }

    fn client_hints(&self) -> DeviceContext {
        self.device.clone()
    }

    fn is_online(&self) -> bool {
        self.network.is_online()
    }

    fn entries(&self, kind: EntryType) -> Option<EntryStream> {
        if !self.supported.contains(&kind) {
            return None;
        }
        // Subscribing under the lock keeps replay and live delivery disjoint.
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let buffered = state
            .buffer
            .iter()
            .filter(|e| e.entry_type() == kind)
            .cloned()
            .collect();
        let (tx, live) = mpsc::unbounded_channel();
        state.subscribers.push((kind, tx));
        Some(EntryStream { buffered, live })
    }

    fn navigation_timing(&self) -> Option<NavigationTiming> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).navigation
    }
}
