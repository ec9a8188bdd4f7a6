//! The proxy-chain walk.
//!
//! # Responsibilities
//! - Gate every request on the immediate peer's trust-entry membership
//! - Walk the forwarded chain right-to-left to find the real client IP
//! - Resolve scheme/host/path/query overrides from the active entry's
//!   headers
//!
//! # Design Decisions
//! - A peer outside every entry short-circuits to the untrusted outcome
//!   before any header is read
//! - Membership is first-match in registration order, both for the peer and
//!   for every hop re-match
//! - The walk stops at the first untrusted hop; hops further left are
//!   unverifiable

use std::collections::HashMap;
use std::net::IpAddr;

use axum::http::HeaderMap;

use crate::trust::chain::{parse_chain, Hop};
use crate::trust::error::TrustResult;
use crate::trust::registry::{
    TrustRegistry, ATTR_CLIENT_IP, ATTR_HOST, ATTR_PATH, ATTR_QUERY, ATTR_SCHEME,
};

/// The network identity resolved for one trusted request.
///
/// Created fresh per request and consumed immediately by the middleware;
/// nothing here is shared or persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub client_ip: IpAddr,
    pub scheme: Option<String>,
    pub host: Option<String>,
    pub path: Option<String>,
    pub query: Option<String>,
    /// Resolved fields as forwardable name/value pairs, restricted to the
    /// active entry's whitelist. Always carries the client IP.
    pub attributes: HashMap<String, String>,
}

/// Walk the proxy chain for one request.
///
/// Returns `Ok(None)` when the immediate peer is outside every configured
/// trust entry; header content is never consulted in that case. `Err` is
/// only possible from a custom protocol strategy violating its contract.
pub fn resolve(
    registry: &TrustRegistry,
    peer: IpAddr,
    headers: &HeaderMap,
) -> TrustResult<Option<Resolution>> {
    let Some(mut active) = registry.entry_for(peer) else {
        return Ok(None);
    };

    let mut client_ip = peer;
    let mut scheme: Option<String> = None;
    let mut host: Option<String> = None;

    // First configured chain header present on the request decides the
    // encoding. An absent (or empty) chain leaves the peer as the client.
    let hops: Vec<Hop> = active
        .ip_headers()
        .iter()
        .find_map(|(name, encoding)| {
            let values = header_values(headers, name);
            if values.is_empty() {
                None
            } else {
                Some(parse_chain(&values, *encoding))
            }
        })
        .unwrap_or_default();

    // Right-to-left: nearest proxy first. Each trusted hop hands the walk to
    // its own entry; the first untrusted hop is the client.
    for hop in hops.iter().rev() {
        if scheme.is_none() {
            scheme.clone_from(&hop.proto);
        }
        if host.is_none() {
            host.clone_from(&hop.host);
        }
        client_ip = hop.addr;
        match registry.entry_for(hop.addr) {
            Some(entry) => active = entry,
            None => break,
        }
    }

    if scheme.is_none() {
        for (name, resolution) in active.protocol_headers() {
            let values = owned_header_values(headers, name);
            if values.is_empty() {
                continue;
            }
            if let Some(resolved) = resolution.resolve(&values)? {
                scheme = Some(resolved);
                break;
            }
        }
    }

    if host.is_none() {
        host = active
            .host_headers()
            .iter()
            .find_map(|name| first_header_value(headers, name));
    }

    let (path, query) = active
        .url_headers()
        .iter()
        .find_map(|name| first_header_value(headers, name))
        .map(split_rewrite_url)
        .unwrap_or((None, None));

    let mut attributes = HashMap::new();
    attributes.insert(ATTR_CLIENT_IP.to_string(), client_ip.to_string());
    for (name, value) in [
        (ATTR_SCHEME, &scheme),
        (ATTR_HOST, &host),
        (ATTR_PATH, &path),
        (ATTR_QUERY, &query),
    ] {
        if let Some(value) = value {
            if active.allows_attribute(name) {
                attributes.insert(name.to_string(), value.clone());
            }
        }
    }

    Ok(Some(Resolution {
        client_ip,
        scheme,
        host,
        path,
        query,
        attributes,
    }))
}

/// An absolute path optionally followed by `?query`. Anything else is
/// ignored (malformed header data degrades, never errors).
fn split_rewrite_url(value: String) -> (Option<String>, Option<String>) {
    if !value.starts_with('/') {
        return (None, None);
    }
    match value.split_once('?') {
        Some((path, query)) => (Some(path.to_string()), Some(query.to_string())),
        None => (value.into(), None),
    }
}

fn header_values<'a>(headers: &'a HeaderMap, name: &str) -> Vec<&'a str> {
    headers
        .get_all(name)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect()
}

fn owned_header_values(headers: &HeaderMap, name: &str) -> Vec<String> {
    header_values(headers, name)
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn first_header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let value = headers.get(name)?.to_str().ok()?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
