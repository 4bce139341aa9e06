//! One-shot send latch.

use std::sync::atomic::{AtomicBool, Ordering};

/// Guards the transition to "sent". Only the first claim succeeds.
#[derive(Debug, Default)]
pub struct SendLatch {
    claimed: AtomicBool,
}

impl SendLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the right to send. Returns false if already claimed.
    pub fn try_claim(&self) -> bool {
        self.claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_single_claim() {
        let latch = SendLatch::new();
        assert!(!latch.is_claimed());
        assert!(latch.try_claim());
        assert!(!latch.try_claim());
        assert!(latch.is_claimed());
    }

    #[test]
    fn test_racing_claims() {
        let latch = Arc::new(SendLatch::new());
        let winners: usize = (0..8)
            .map(|_| {
                let latch = latch.clone();
                std::thread::spawn(move || latch.try_claim())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum();
        assert_eq!(winners, 1);
    }
}
