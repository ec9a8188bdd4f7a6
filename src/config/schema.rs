//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! resolver. All types derive Serde traits for deserialization from config
//! files.

use serde::{Deserialize, Serialize};

use crate::trust::ChainEncoding;

/// Root configuration for the trusted-hosts resolver.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ResolverConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Trust entries, matched in declaration order.
    pub trusted_hosts: Vec<TrustEntryConfig>,
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

/// One configured trust boundary.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TrustEntryConfig {
    /// Networks trusted as immediate peers: exact addresses or CIDR ranges.
    pub networks: Vec<String>,

    /// Ordered chain headers. Empty selects the defaults
    /// (`x-forwarded-for` plain, `forward` rfc7239).
    pub ip_headers: Vec<IpHeaderConfig>,

    /// Ordered protocol headers; arrays-of-tables so declaration order is
    /// preserved.
    pub protocol_headers: Vec<ProtocolHeaderConfig>,

    /// Ordered host-override headers.
    pub host_headers: Vec<String>,

    /// Ordered URL-rewrite headers. Empty selects the default
    /// (`x-rewrite-url`).
    pub url_headers: Vec<String>,

    /// Attribute whitelist; unset forwards all resolved attributes.
    pub trusted_attributes: Option<Vec<String>>,
}

/// A chain header and its encoding.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IpHeaderConfig {
    pub name: String,

    #[serde(default)]
    pub encoding: EncodingConfig,
}

/// Chain header encoding selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EncodingConfig {
    /// One IP per element (`X-Forwarded-For` style).
    #[default]
    Plain,
    /// RFC 7239 structured elements.
    Rfc7239,
}

impl From<EncodingConfig> for ChainEncoding {
    fn from(encoding: EncodingConfig) -> Self {
        match encoding {
            EncodingConfig::Plain => ChainEncoding::Plain,
            EncodingConfig::Rfc7239 => ChainEncoding::Rfc7239,
        }
    }
}

/// A protocol header and its scheme mapping.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProtocolHeaderConfig {
    pub header: String,

    /// Ordered scheme mappings. Empty selects the default
    /// `{ http: [http], https: [https, on] }` table.
    #[serde(default)]
    pub protocols: Vec<ProtocolValuesConfig>,
}

/// One scheme and the header values that indicate it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProtocolValuesConfig {
    pub scheme: String,
    pub values: Vec<String>,
}
