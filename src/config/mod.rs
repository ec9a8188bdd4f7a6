//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! config.toml
//!     → loader.rs (read, parse TOML)
//!     → validation.rs (semantic checks, all errors collected)
//!     → schema types consumed at startup to build the trust registry
//! ```

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    EncodingConfig, IpHeaderConfig, ListenerConfig, ObservabilityConfig, ProtocolHeaderConfig,
    ProtocolValuesConfig, ResolverConfig, TrustEntryConfig,
};
pub use validation::{validate_config, ValidationError};
