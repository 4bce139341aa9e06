//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, VITALS_* overrides)
//!     → validation.rs (semantic checks)
//!     → VitalsConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{
    apply_env_overrides, default_config, load_config, load_or_default, set_public_base_url,
    ConfigError,
};
pub use schema::{
    CollectorConfig, DeliveryConfig, ListenerConfig, ObservabilityConfig, SecurityConfig,
    StorageConfig, VitalsConfig,
};
pub use validation::{validate_config, ValidationError};
