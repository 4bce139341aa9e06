//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, wait bounds ordered)
//! - Check that addresses and the delivery endpoint parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: VitalsConfig → Result<(), Vec<ValidationError>>

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::VitalsConfig;

/// One failed check, keyed by the dotted config path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check every semantic rule and report all failures.
pub fn validate_config(config: &VitalsConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    let collector = &config.collector;
    for (field, value) in [
        ("collector.session_timeout_ms", collector.session_timeout_ms),
        ("collector.interaction_wait_ms", collector.interaction_wait_ms),
        ("collector.interaction_wait_max_ms", collector.interaction_wait_max_ms),
        ("delivery.request_timeout_ms", config.delivery.request_timeout_ms),
        ("security.request_timeout_secs", config.security.request_timeout_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than zero"));
        }
    }
    if collector.interaction_wait_ms > collector.interaction_wait_max_ms {
        errors.push(ValidationError::new(
            "collector.interaction_wait_ms",
            format!(
                "{} exceeds interaction_wait_max_ms ({})",
                collector.interaction_wait_ms, collector.interaction_wait_max_ms
            ),
        ));
    }

    match Url::parse(&config.delivery.endpoint) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "delivery.endpoint",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            "delivery.endpoint",
            format!("'{}' is not a URL: {}", config.delivery.endpoint, e),
        )),
    }

    if config.storage.dir.trim().is_empty() {
        errors.push(ValidationError::new("storage.dir", "must not be empty"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new(
            "security.max_body_size",
            "must be greater than zero",
        ));
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&VitalsConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = VitalsConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.collector.session_timeout_ms = 0;
        config.collector.interaction_wait_ms = 20_000;
        config.delivery.endpoint = "ftp://example.com/metrics".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "collector.session_timeout_ms",
                "collector.interaction_wait_ms",
                "delivery.endpoint",
            ]
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = VitalsConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "observability.metrics_address");
    }
}
