//! The environment a page view is measured in.

use tokio::sync::mpsc;

use crate::observers::entry::{EntryType, NavigationTiming, PerformanceEntry};
use crate::record::DeviceContext;

/// Entries already on the timeline plus a live feed of new ones.
///
/// `live` carries only entries of the subscribed type and never drops any.
pub struct EntryStream {
    pub buffered: Vec<PerformanceEntry>,
    pub live: mpsc::UnboundedReceiver<PerformanceEntry>,
}

/// A host that can report performance entries for one page view.
pub trait PerformanceSource: Send + Sync {
    /// Entry types this host is able to observe.
    fn supported_entry_types(&self) -> Vec<EntryType>;

    /// Device and network hints.
    fn client_hints(&self) -> DeviceContext;

    /// Whether the client currently has network connectivity.
    fn is_online(&self) -> bool;

    /// Subscribe to entries of `kind`. Returns `None` if unsupported.
    fn entries(&self, kind: EntryType) -> Option<EntryStream>;

    /// Latest navigation timing, if a navigation entry exists.
    fn navigation_timing(&self) -> Option<NavigationTiming>;
}
