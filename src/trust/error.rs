//! Trust configuration error definitions.

use thiserror::Error;

/// Errors raised while building trust entries and registries.
///
/// All variants except [`TrustError::EmptyScheme`] are configuration-time
/// failures and must abort startup. Runtime header anomalies never surface
/// here; they degrade to the untrusted outcome instead.
#[derive(Debug, Error)]
pub enum TrustError {
    /// A trust entry was given no networks to trust.
    #[error("trusted networks list is empty")]
    EmptyNetworks,

    /// A configured network is neither an address nor a CIDR range.
    #[error("invalid trusted network {0:?}")]
    InvalidNetwork(String),

    /// A header name was empty after normalization.
    #[error("header name is empty")]
    EmptyHeaderName,

    /// A protocol mapping contained no protocol entries.
    #[error("protocol mapping is empty")]
    EmptyProtocolMapping,

    /// A protocol entry had an empty protocol name.
    #[error("protocol name is empty")]
    EmptyProtocolName,

    /// A protocol entry accepted no header values.
    #[error("accepted values for protocol {0:?} are empty")]
    EmptyAcceptedValues(String),

    /// A custom protocol strategy returned an empty scheme. The contract
    /// allows only "no decision" or a non-empty scheme, so this is observed
    /// when the strategy runs, not when it is registered.
    #[error("custom protocol strategy returned an empty scheme")]
    EmptyScheme,
}

/// Result type for trust configuration operations.
pub type TrustResult<T> = Result<T, TrustError>;
