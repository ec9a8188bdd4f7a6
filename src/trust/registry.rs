//! Trust entries and the ordered trust registry.
//!
//! # Responsibilities
//! - Bind trusted networks to the headers used to interpret their forwarded
//!   data
//! - Keep entries in registration order for first-match semantics
//! - Hold the not-trusted branch handler
//!
//! # Design Decisions
//! - Every mutation returns a new value; registries are safely shared
//!   read-only across concurrent in-flight requests
//! - Header names are normalized to lower-case at construction
//! - Entry invariants (non-empty networks, non-empty protocol mappings) are
//!   enforced when the entry is built, never at request time

use std::net::IpAddr;
use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response};
use futures_util::future::BoxFuture;

use crate::trust::chain::ChainEncoding;
use crate::trust::error::{TrustError, TrustResult};
use crate::trust::network::NetworkSet;
use crate::trust::protocol::ProtocolResolution;

/// Attribute names a trust entry may forward.
pub const ATTR_CLIENT_IP: &str = "clientIp";
pub const ATTR_SCHEME: &str = "scheme";
pub const ATTR_HOST: &str = "host";
pub const ATTR_PATH: &str = "path";
pub const ATTR_QUERY: &str = "query";

/// Handler invoked when the immediate peer is outside all trust entries.
pub type NotTrustedBranch =
    Arc<dyn Fn(Request<Body>) -> BoxFuture<'static, Response> + Send + Sync>;

/// One configured trust boundary: a set of networks trusted as immediate
/// peers, bound to the headers used to interpret their forwarded data.
#[derive(Debug, Clone)]
pub struct TrustEntry {
    networks: NetworkSet,
    ip_headers: Vec<(String, ChainEncoding)>,
    protocol_headers: Vec<(String, ProtocolResolution)>,
    host_headers: Vec<String>,
    url_headers: Vec<String>,
    trusted_attributes: Option<Vec<String>>,
}

impl TrustEntry {
    /// Create an entry trusting `networks`, wired to the default headers:
    /// `x-forwarded-for` (plain) and `forward` (RFC 7239) for ip-chains,
    /// `x-rewrite-url` for URL rewrites.
    pub fn new<I, S>(networks: I) -> TrustResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let networks = NetworkSet::parse(networks)?;
        if networks.is_empty() {
            return Err(TrustError::EmptyNetworks);
        }
        Ok(Self {
            networks,
            ip_headers: vec![
                ("x-forwarded-for".to_string(), ChainEncoding::Plain),
                ("forward".to_string(), ChainEncoding::Rfc7239),
            ],
            protocol_headers: Vec::new(),
            host_headers: Vec::new(),
            url_headers: vec!["x-rewrite-url".to_string()],
            trusted_attributes: None,
        })
    }

    /// Replace the ordered ip-chain header list.
    pub fn with_ip_headers<I, S>(mut self, headers: I) -> TrustResult<Self>
    where
        I: IntoIterator<Item = (S, ChainEncoding)>,
        S: AsRef<str>,
    {
        self.ip_headers = headers
            .into_iter()
            .map(|(name, encoding)| Ok((normalize_header(name.as_ref())?, encoding)))
            .collect::<TrustResult<_>>()?;
        Ok(self)
    }

    /// Register a protocol header. `None` selects the default
    /// `{ http: [http], https: [https, on] }` table.
    pub fn with_protocol_header(
        mut self,
        header: &str,
        resolution: Option<ProtocolResolution>,
    ) -> TrustResult<Self> {
        let name = normalize_header(header)?;
        let resolution = resolution.unwrap_or_else(ProtocolResolution::default_table);
        self.protocol_headers.push((name, resolution));
        Ok(self)
    }

    /// Replace the ordered host-override header list.
    pub fn with_host_headers<I, S>(mut self, headers: I) -> TrustResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.host_headers = normalize_headers(headers)?;
        Ok(self)
    }

    /// Replace the ordered URL-rewrite header list.
    pub fn with_url_headers<I, S>(mut self, headers: I) -> TrustResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.url_headers = normalize_headers(headers)?;
        Ok(self)
    }

    /// Restrict the attributes this entry may forward. Unset means all
    /// resolved attributes are forwarded.
    pub fn with_trusted_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.trusted_attributes = Some(
            attributes
                .into_iter()
                .map(|attribute| attribute.as_ref().to_string())
                .collect(),
        );
        self
    }

    pub fn networks(&self) -> &NetworkSet {
        &self.networks
    }

    pub fn ip_headers(&self) -> &[(String, ChainEncoding)] {
        &self.ip_headers
    }

    pub fn protocol_headers(&self) -> &[(String, ProtocolResolution)] {
        &self.protocol_headers
    }

    pub fn host_headers(&self) -> &[String] {
        &self.host_headers
    }

    pub fn url_headers(&self) -> &[String] {
        &self.url_headers
    }

    /// Whether this entry may forward the named attribute. The resolved
    /// client IP is always forwarded regardless of the whitelist.
    pub fn allows_attribute(&self, name: &str) -> bool {
        name == ATTR_CLIENT_IP
            || self
                .trusted_attributes
                .as_ref()
                .is_none_or(|whitelist| whitelist.iter().any(|attribute| attribute == name))
    }
}

fn normalize_header(name: &str) -> TrustResult<String> {
    let name = name.trim().to_ascii_lowercase();
    if name.is_empty() {
        return Err(TrustError::EmptyHeaderName);
    }
    Ok(name)
}

fn normalize_headers<I, S>(headers: I) -> TrustResult<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    headers
        .into_iter()
        .map(|name| normalize_header(name.as_ref()))
        .collect()
}

/// Ordered, immutable collection of trust entries.
///
/// Registration order is semantically significant: every membership test
/// uses the first matching entry, so entries meant to win for overlapping
/// networks must be registered first.
#[derive(Clone, Default)]
pub struct TrustRegistry {
    entries: Vec<Arc<TrustEntry>>,
    not_trusted: Option<NotTrustedBranch>,
}

impl TrustRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, yielding a new registry.
    pub fn with_entry(&self, entry: TrustEntry) -> Self {
        let mut entries = self.entries.clone();
        entries.push(Arc::new(entry));
        Self {
            entries,
            not_trusted: self.not_trusted.clone(),
        }
    }

    /// Drop every entry, yielding a new registry.
    pub fn without_entries(&self) -> Self {
        Self {
            entries: Vec::new(),
            not_trusted: self.not_trusted.clone(),
        }
    }

    /// Replace the not-trusted branch, yielding a new registry.
    pub fn with_not_trusted_branch(&self, branch: NotTrustedBranch) -> Self {
        Self {
            entries: self.entries.clone(),
            not_trusted: Some(branch),
        }
    }

    pub fn entries(&self) -> &[Arc<TrustEntry>] {
        &self.entries
    }

    pub fn not_trusted_branch(&self) -> Option<&NotTrustedBranch> {
        self.not_trusted.as_ref()
    }

    /// First entry whose networks contain `addr`, in registration order.
    pub fn entry_for(&self, addr: IpAddr) -> Option<&Arc<TrustEntry>> {
        self.entries
            .iter()
            .find(|entry| entry.networks().contains(addr))
    }
}

impl std::fmt::Debug for TrustRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustRegistry")
            .field("entries", &self.entries)
            .field("not_trusted", &self.not_trusted.is_some())
            .finish()
    }
}
