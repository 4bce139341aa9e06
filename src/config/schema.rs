//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! collector. All types derive Serde traits for deserialization from
//! config files.

use serde::{Deserialize, Serialize};

use crate::aggregator::ReadinessPolicy;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct VitalsConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Page-view session timers and readiness policy.
    pub collector: CollectorConfig,

    /// Client-side delivery to the collection endpoint.
    pub delivery: DeliveryConfig,

    /// Endpoint record store.
    pub storage: StorageConfig,

    /// CORS, body and request limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Page-view session settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Force finalization this long after the page view starts.
    pub session_timeout_ms: u64,

    /// Wait after a user interaction for an INP sample.
    pub interaction_wait_ms: u64,

    /// Upper bound on the interaction wait, measured from the first interaction.
    pub interaction_wait_max_ms: u64,

    /// Delay before the load-event LCP fallback is read.
    pub lcp_grace_ms: u64,

    /// Which metrics must be present before the record is sent.
    pub readiness: ReadinessPolicy,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            session_timeout_ms: 30_000,
            interaction_wait_ms: 5_000,
            interaction_wait_max_ms: 10_000,
            lcp_grace_ms: 1_000,
            readiness: ReadinessPolicy::default(),
        }
    }
}

/// Delivery settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Absolute URL of the collection endpoint.
    pub endpoint: String,

    /// Retries after the first failed attempt.
    pub max_retries: u32,

    /// Retry n waits n * step.
    pub backoff_step_ms: u64,

    /// Per-request timeout.
    pub request_timeout_ms: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/api/metrics".to_string(),
            max_retries: 2,
            backoff_step_ms: 1_000,
            request_timeout_ms: 5_000,
        }
    }
}

/// Record store settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the JSON and CSV files.
    pub dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: "metrics".to_string(),
        }
    }
}

/// Endpoint hardening.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Answer CORS preflights for any origin.
    pub cors_permissive: bool,
    /// Maximum body size in bytes.
    pub max_body_size: usize,
    /// Whole-request timeout.
    pub request_timeout_secs: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors_permissive: true,
            max_body_size: 64 * 1024,
            request_timeout_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: VitalsConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.collector.session_timeout_ms, 30_000);
        assert_eq!(config.collector.readiness, ReadinessPolicy::TtfbAndLcp);
        assert_eq!(config.delivery.max_retries, 2);
        assert_eq!(config.storage.dir, "metrics");
        assert!(config.security.cors_permissive);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_sections() {
        let config: VitalsConfig = toml::from_str(
            r#"
            [collector]
            readiness = "first_interaction"
            interaction_wait_ms = 3000

            [delivery]
            endpoint = "https://vitals.example.com/api/metrics"
            "#,
        )
        .unwrap();
        assert_eq!(config.collector.readiness, ReadinessPolicy::FirstInteraction);
        assert_eq!(config.collector.interaction_wait_ms, 3000);
        assert_eq!(config.collector.interaction_wait_max_ms, 10_000);
        assert_eq!(config.delivery.endpoint, "https://vitals.example.com/api/metrics");
        assert_eq!(config.delivery.backoff_step_ms, 1_000);
    }
}
