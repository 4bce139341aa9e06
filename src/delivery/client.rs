//! Delivery client: one record, at most one successful transmission.
//!
//! # Algorithm
//! ```text
//! offline?                     → Offline (no attempt, no retry)
//! primary POST ok?             → Sent
//! beacon queued?               → Sent
//! attempts left?               → sleep(attempt × step), start over
//! otherwise                    → mark incomplete, Exhausted
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::config::DeliveryConfig;
use crate::delivery::error::{DeliveryError, DeliveryResult};
use crate::delivery::network::NetworkStatus;
use crate::delivery::transport::{BeaconTransport, HttpTransport, Transport, TransportKind};
use crate::observability::metrics;
use crate::record::MetricsRecord;
use crate::resilience::backoff::linear_backoff;

/// Final result of a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The record left through `via` on attempt number `attempts`.
    Sent { attempts: u32, via: TransportKind },
    /// The client was offline; nothing was sent.
    Offline,
    /// Every attempt failed; the record was dropped.
    Exhausted { attempts: u32 },
}

impl DeliveryOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DeliveryOutcome::Sent { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryOutcome::Sent { .. } => "sent",
            DeliveryOutcome::Offline => "offline",
            DeliveryOutcome::Exhausted { .. } => "exhausted",
        }
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryOutcome::Sent { attempts, via } => {
                write!(f, "sent via {} on attempt {}", via, attempts)
            }
            DeliveryOutcome::Offline => f.write_str("offline, not sent"),
            DeliveryOutcome::Exhausted { attempts } => {
                write!(f, "dropped after {} attempts", attempts)
            }
        }
    }
}

/// Ships finalized records to the collection endpoint.
#[derive(Clone)]
pub struct DeliveryClient {
    primary: Arc<dyn Transport>,
    fallback: Arc<dyn Transport>,
    network: NetworkStatus,
    max_retries: u32,
    backoff_step: Duration,
}

impl DeliveryClient {
    /// Create a client with explicit transports and default retry policy.
    pub fn new(
        primary: Arc<dyn Transport>,
        fallback: Arc<dyn Transport>,
        network: NetworkStatus,
    ) -> Self {
        let defaults = DeliveryConfig::default();
        Self {
            primary,
            fallback,
            network,
            max_retries: defaults.max_retries,
            backoff_step: Duration::from_millis(defaults.backoff_step_ms),
        }
    }

    /// Build HTTP and beacon transports for the configured endpoint.
    pub fn from_config(config: &DeliveryConfig, network: NetworkStatus) -> DeliveryResult<Self> {
        let endpoint: Url = config.endpoint.parse().map_err(|e| {
            DeliveryError::TransportFailure(format!(
                "invalid endpoint '{}': {}",
                config.endpoint, e
            ))
        })?;
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let primary = Arc::new(HttpTransport::new(endpoint.clone(), timeout)?);
        let fallback = Arc::new(BeaconTransport::new(endpoint, timeout)?);

        Ok(Self::new(primary, fallback, network)
            .with_retry_policy(config.max_retries, Duration::from_millis(config.backoff_step_ms)))
    }

    /// Override the retry bound and backoff step.
    pub fn with_retry_policy(mut self, max_retries: u32, backoff_step: Duration) -> Self {
        self.max_retries = max_retries;
        self.backoff_step = backoff_step;
        self
    }

    pub fn network(&self) -> &NetworkStatus {
        &self.network
    }

    /// Wait up to `limit` for background sends to finish. Returns false on timeout.
    pub async fn drain(&self, limit: Duration) -> bool {
        let drained = tokio::time::timeout(limit, async {
            self.primary.drain().await;
            self.fallback.drain().await;
        })
        .await
        .is_ok();
        if !drained {
            tracing::warn!(limit_ms = limit.as_millis() as u64, "Background sends still pending");
        }
        drained
    }

    /// Transmit `record`. Failures are logged, never returned.
    pub async fn deliver(&self, record: &mut MetricsRecord) -> DeliveryOutcome {
        let outcome = self.try_deliver(record).await;
        if let DeliveryOutcome::Exhausted { .. } = outcome {
            record.incomplete = true;
        }
        let attempts = match outcome {
            DeliveryOutcome::Sent { attempts, .. } | DeliveryOutcome::Exhausted { attempts } => {
                attempts
            }
            DeliveryOutcome::Offline => 0,
        };
        metrics::record_delivery(outcome.as_str(), attempts);
        outcome
    }

    fn ensure_online(&self) -> DeliveryResult<()> {
        if self.network.is_online() {
            Ok(())
        } else {
            Err(DeliveryError::Offline)
        }
    }

    async fn try_deliver(&self, record: &MetricsRecord) -> DeliveryOutcome {
        let payload = match serde_json::to_vec(record) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(record_id = %record.id, error = %e, "Failed to serialize record");
                return DeliveryOutcome::Exhausted { attempts: 0 };
            }
        };

        let total = self.max_retries.saturating_add(1);
        for attempt in 1..=total {
            if let Err(e) = self.ensure_online() {
                tracing::info!(record_id = %record.id, attempt, error = %e, "Abandoning delivery");
                return DeliveryOutcome::Offline;
            }

            match self.primary.send(&payload).await {
                Ok(()) => {
                    tracing::info!(
                        record_id = %record.id,
                        attempt,
                        via = %self.primary.kind(),
                        incomplete = record.incomplete,
                        "Metrics delivered"
                    );
                    return DeliveryOutcome::Sent {
                        attempts: attempt,
                        via: self.primary.kind(),
                    };
                }
                Err(e) => {
                    tracing::warn!(record_id = %record.id, attempt, error = %e, "Primary delivery failed");
                }
            }

            match self.fallback.send(&payload).await {
                Ok(()) => {
                    tracing::info!(
                        record_id = %record.id,
                        attempt,
                        via = %self.fallback.kind(),
                        "Metrics handed to fallback transport"
                    );
                    return DeliveryOutcome::Sent {
                        attempts: attempt,
                        via: self.fallback.kind(),
                    };
                }
                Err(e) => {
                    tracing::warn!(record_id = %record.id, attempt, error = %e, "Fallback delivery failed");
                }
            }

            if attempt < total {
                let delay = linear_backoff(attempt, self.backoff_step);
                tracing::info!(record_id = %record.id, attempt, delay = ?delay, "Retrying delivery");
                tokio::time::sleep(delay).await;
            }
        }

        tracing::warn!(record_id = %record.id, attempts = total, "Delivery attempts exhausted, dropping record");
        DeliveryOutcome::Exhausted { attempts: total }
    }
}

impl fmt::Debug for DeliveryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryClient")
            .field("primary", &self.primary.kind())
            .field("fallback", &self.fallback.kind())
            .field("max_retries", &self.max_retries)
            .field("backoff_step", &self.backoff_step)
            .finish()
    }
}
