//! Capability detection, run once per page view.

use std::collections::HashSet;

use crate::observers::entry::EntryType;
use crate::observers::source::PerformanceSource;
use crate::record::DeviceContext;

/// What the current client can observe, detected at session start.
#[derive(Debug, Clone)]
pub struct Capabilities {
    entry_types: HashSet<EntryType>,
    /// Device and network hints; absent hints stay `None`.
    pub device: DeviceContext,
    pub online: bool,
}

impl Capabilities {
    /// Probe the source once.
    pub fn detect(source: &dyn PerformanceSource) -> Self {
        let caps = Self {
            entry_types: source.supported_entry_types().into_iter().collect(),
            device: source.client_hints(),
            online: source.is_online(),
        };
        tracing::debug!(
            entry_types = ?caps.entry_types,
            connection_type = ?caps.device.connection_type,
            online = caps.online,
            "Capabilities detected"
        );
        caps
    }

    pub fn supports(&self, kind: EntryType) -> bool {
        self.entry_types.contains(&kind)
    }
}
