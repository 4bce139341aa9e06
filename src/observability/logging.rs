//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` wins over the configured level when set

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default directives for a configured level.
pub fn default_directives(log_level: &str) -> String {
    format!("page_vitals={level},tower_http={level}", level = log_level)
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(log_level)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(
            default_directives("debug"),
            "page_vitals=debug,tower_http=debug"
        );
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging("info");
        init_logging("warn");
    }
}
