//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::delivery::error::{DeliveryError, DeliveryResult};
use crate::delivery::transport::{Transport, TransportKind};

/// Replays queued results, then falls back to a default.
pub struct ScriptedTransport {
    kind: TransportKind,
    script: Mutex<VecDeque<DeliveryResult<()>>>,
    default_ok: bool,
    calls: AtomicUsize,
    delivered: Mutex<Vec<Vec<u8>>>,
}

impl ScriptedTransport {
    /// Succeeds unless scripted otherwise.
    pub fn new(kind: TransportKind) -> Self {
        Self {
            kind,
            script: Mutex::new(VecDeque::new()),
            default_ok: true,
            calls: AtomicUsize::new(0),
            delivered: Mutex::new(Vec::new()),
        }
    }

    pub fn always_failing(kind: TransportKind) -> Self {
        Self {
            default_ok: false,
            ..Self::new(kind)
        }
    }

    /// Queue the result of the next unscripted call.
    pub fn then(self, result: DeliveryResult<()>) -> Self {
        self.script.lock().unwrap().push_back(result);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Payloads of successful sends.
    pub fn payloads(&self) -> Vec<Vec<u8>> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn kind(&self) -> TransportKind {
        self.kind
    }

    async fn send(&self, payload: &[u8]) -> DeliveryResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.script.lock().unwrap().pop_front();
        let result = scripted.unwrap_or(if self.default_ok {
            Ok(())
        } else {
            Err(DeliveryError::TransportFailure("scripted failure".into()))
        });
        if result.is_ok() {
            self.delivered.lock().unwrap().push(payload.to_vec());
        }
        result
    }
}
