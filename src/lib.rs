//! Trusted-hosts network resolution middleware.
//!
//! Determines the true client network identity (IP, scheme, host, path)
//! behind one or more reverse proxies, refusing to trust forwarded headers
//! unless the immediate peer is on an explicitly configured trust list.

pub mod config;
pub mod middleware;
pub mod observability;
pub mod trust;

pub use middleware::{
    scheme_resolver_middleware, trusted_hosts_middleware, ForwardedIdentity, SchemeResolver,
    TrustedHosts,
};
pub use trust::{
    ChainEncoding, ProtocolResolution, Resolution, TrustEntry, TrustError, TrustRegistry,
};
