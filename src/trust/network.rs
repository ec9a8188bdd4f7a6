//! Trusted-network membership matching.
//!
//! # Responsibilities
//! - Parse configured networks (exact addresses and CIDR ranges)
//! - Decide whether a candidate address belongs to a trusted set
//!
//! # Design Decisions
//! - Literal addresses become host-length networks, so they match on exact
//!   equality only
//! - IPv4 and IPv6 never cross-match
//! - A malformed candidate address matches nothing; a malformed configured
//!   network is rejected when the set is built

use std::net::IpAddr;

use ipnet::IpNet;

use crate::trust::error::{TrustError, TrustResult};

/// A parsed, order-independent set of trusted networks.
#[derive(Debug, Clone, Default)]
pub struct NetworkSet {
    nets: Vec<IpNet>,
}

impl NetworkSet {
    /// Parse a list of network strings. Each entry is either an exact
    /// address (`127.0.0.1`, `::1`) or a CIDR range (`10.0.0.0/8`).
    pub fn parse<I, S>(networks: I) -> TrustResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut nets = Vec::new();
        for network in networks {
            nets.push(parse_network(network.as_ref())?);
        }
        Ok(Self { nets })
    }

    pub fn is_empty(&self) -> bool {
        self.nets.is_empty()
    }

    /// Membership test for an already-parsed address.
    pub fn contains(&self, addr: IpAddr) -> bool {
        self.nets.iter().any(|net| net.contains(&addr))
    }

    /// Membership test for a textual address. Malformed input matches
    /// nothing rather than erroring.
    pub fn contains_str(&self, addr: &str) -> bool {
        match addr.trim().parse::<IpAddr>() {
            Ok(ip) => self.contains(ip),
            Err(_) => false,
        }
    }
}

/// Parse one configured network, accepting bare addresses as host-length
/// networks.
pub fn parse_network(network: &str) -> TrustResult<IpNet> {
    let network = network.trim();
    if let Ok(addr) = network.parse::<IpAddr>() {
        return Ok(IpNet::from(addr));
    }
    network
        .parse::<IpNet>()
        .map_err(|_| TrustError::InvalidNetwork(network.to_string()))
}
