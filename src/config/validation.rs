//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate networks, header names, and protocol mappings before they
//!   reach the trust registry
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ResolverConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ResolverConfig;
use crate::trust::network::parse_network;

/// One semantic configuration defect.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("listener bind_address {value:?} is not a valid socket address")]
    InvalidBindAddress { value: String },

    #[error("observability metrics_address {value:?} is not a valid socket address")]
    InvalidMetricsAddress { value: String },

    #[error("trusted_hosts[{index}]: networks list is empty")]
    EmptyNetworks { index: usize },

    #[error("trusted_hosts[{index}]: invalid network {value:?}")]
    InvalidNetwork { index: usize, value: String },

    #[error("trusted_hosts[{index}]: ip header name is empty")]
    EmptyIpHeader { index: usize },

    #[error("trusted_hosts[{index}]: protocol header name is empty")]
    EmptyProtocolHeader { index: usize },

    #[error("trusted_hosts[{index}], header {header:?}: protocol scheme is empty")]
    EmptyProtocolScheme { index: usize, header: String },

    #[error(
        "trusted_hosts[{index}], header {header:?}: accepted values for {scheme:?} are empty"
    )]
    EmptyAcceptedValues {
        index: usize,
        header: String,
        scheme: String,
    },

    #[error("trusted_hosts[{index}]: host header name is empty")]
    EmptyHostHeader { index: usize },

    #[error("trusted_hosts[{index}]: url header name is empty")]
    EmptyUrlHeader { index: usize },
}

/// Validate a loaded configuration, collecting every defect.
pub fn validate_config(config: &ResolverConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress {
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress {
            value: config.observability.metrics_address.clone(),
        });
    }

    for (index, entry) in config.trusted_hosts.iter().enumerate() {
        if entry.networks.is_empty() {
            errors.push(ValidationError::EmptyNetworks { index });
        }
        for network in &entry.networks {
            if parse_network(network).is_err() {
                errors.push(ValidationError::InvalidNetwork {
                    index,
                    value: network.clone(),
                });
            }
        }
        for header in &entry.ip_headers {
            if header.name.trim().is_empty() {
                errors.push(ValidationError::EmptyIpHeader { index });
            }
        }
        for protocol_header in &entry.protocol_headers {
            if protocol_header.header.trim().is_empty() {
                errors.push(ValidationError::EmptyProtocolHeader { index });
            }
            for protocol in &protocol_header.protocols {
                if protocol.scheme.trim().is_empty() {
                    errors.push(ValidationError::EmptyProtocolScheme {
                        index,
                        header: protocol_header.header.clone(),
                    });
                }
                if protocol.values.is_empty() {
                    errors.push(ValidationError::EmptyAcceptedValues {
                        index,
                        header: protocol_header.header.clone(),
                        scheme: protocol.scheme.clone(),
                    });
                }
            }
        }
        if entry.host_headers.iter().any(|name| name.trim().is_empty()) {
            errors.push(ValidationError::EmptyHostHeader { index });
        }
        if entry.url_headers.iter().any(|name| name.trim().is_empty()) {
            errors.push(ValidationError::EmptyUrlHeader { index });
        }
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
    use crate::config::schema::{ProtocolHeaderConfig, ProtocolValuesConfig, TrustEntryConfig};

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ResolverConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let config = ResolverConfig {
            trusted_hosts: vec![
                TrustEntryConfig {
                    networks: vec![],
                    ..Default::default()
                },
                TrustEntryConfig {
                    networks: vec!["not-a-network".to_string(), "10.0.0.0/8".to_string()],
                    protocol_headers: vec![ProtocolHeaderConfig {
                        header: "x-forwarded-proto".to_string(),
                        protocols: vec![ProtocolValuesConfig {
                            scheme: "https".to_string(),
                            values: vec![],
                        }],
                    }],
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[0], ValidationError::EmptyNetworks { index: 0 }));
        assert!(matches!(
            errors[1],
            ValidationError::InvalidNetwork { index: 1, .. }
        ));
        assert!(matches!(
            errors[2],
            ValidationError::EmptyAcceptedValues { index: 1, .. }
        ));
    }

    #[test]
    fn test_invalid_bind_address() {
        let config = ResolverConfig {
            listener: crate::config::schema::ListenerConfig {
                bind_address: "nowhere".to_string(),
            },
            ..Default::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(
            errors[0],
            ValidationError::InvalidBindAddress { .. }
        ));
    }
}
