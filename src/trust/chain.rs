//! Forwarded-chain parsing.
//!
//! # Responsibilities
//! - Split chain headers into ordered per-hop facts
//! - Support both the plain one-IP-per-hop encoding (`X-Forwarded-For`) and
//!   RFC 7239 structured elements (`for=...;proto=...;host=...`)
//!
//! # Design Decisions
//! - Hop order follows header order: leftmost is the furthest client,
//!   rightmost is the nearest proxy
//! - Parsing is best-effort: a hop without a usable address is dropped and
//!   the chain continues with the remaining hops
//! - Directive keys are matched case-insensitively; unrecognized keys are
//!   ignored

use std::net::IpAddr;

/// Encoding of a forwarded-chain header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainEncoding {
    /// One IP per element, `X-Forwarded-For` style.
    Plain,
    /// RFC 7239 structured elements carrying `for`/`proto`/`host` directives.
    Rfc7239,
}

/// One proxy's contribution to the forwarded chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop {
    pub addr: IpAddr,
    pub proto: Option<String>,
    pub host: Option<String>,
}

impl Hop {
    fn plain(addr: IpAddr) -> Self {
        Self {
            addr,
            proto: None,
            host: None,
        }
    }
}

/// Parse a chain header's values into an ordered hop sequence.
///
/// `values` holds every value of the selected header in wire order; elements
/// are additionally split on commas so that repeated header lines and
/// single comma-joined lines produce the same sequence.
pub fn parse_chain(values: &[&str], encoding: ChainEncoding) -> Vec<Hop> {
    let elements = values
        .iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|element| !element.is_empty());

    match encoding {
        ChainEncoding::Plain => elements
            .filter_map(|element| element.parse::<IpAddr>().ok().map(Hop::plain))
            .collect(),
        ChainEncoding::Rfc7239 => elements.filter_map(parse_element).collect(),
    }
}

/// Parse one RFC 7239 element. Returns `None` when the element carries no
/// usable `for` directive.
fn parse_element(element: &str) -> Option<Hop> {
    let mut addr = None;
    let mut proto = None;
    let mut host = None;

    for directive in element.split(';') {
        let Some((key, value)) = directive.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"');
        match key.trim().to_ascii_lowercase().as_str() {
            "for" => addr = parse_forwarded_addr(value),
            "proto" => proto = Some(value.to_ascii_lowercase()),
            "host" => host = Some(value.to_string()),
            _ => {}
        }
    }

    addr.map(|addr| Hop { addr, proto, host })
}

/// Parse a `for=` value, stripping an optional port and IPv6 brackets
/// (`192.0.2.60:8080`, `"[2001:db8::1]:443"`).
fn parse_forwarded_addr(value: &str) -> Option<IpAddr> {
    if let Some(rest) = value.strip_prefix('[') {
        return rest.split(']').next()?.parse().ok();
    }
    if let Ok(addr) = value.parse::<IpAddr>() {
        return Some(addr);
    }
    // IPv4 with a port; bare IPv6 already parsed above.
    value.split(':').next()?.parse().ok()
}
