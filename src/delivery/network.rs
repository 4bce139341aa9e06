//! Client connectivity flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared online/offline state, updated by the host.
#[derive(Debug, Clone)]
pub struct NetworkStatus {
    online: Arc<AtomicBool>,
}

impl NetworkStatus {
    pub fn new(online: bool) -> Self {
        Self {
            online: Arc::new(AtomicBool::new(online)),
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Relaxed);
    }
}

impl Default for NetworkStatus {
    fn default() -> Self {
        Self::new(true)
    }
}
