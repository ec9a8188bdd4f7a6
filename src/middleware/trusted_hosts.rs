//! Trusted-hosts network resolution middleware.
//!
//! # Responsibilities
//! - Gate forwarded-header trust on the immediate peer's network
//! - Rewrite the request URI with the resolved scheme/host/path/query
//! - Attach the resolved identity as a request extension
//! - Dispatch untrusted requests to the configured branch
//!
//! # Design Decisions
//! - Never trust forwarded headers from a peer outside the registry
//! - Fail closed: the default untrusted response is 412 with an empty body
//! - Configuration methods return new values, so a wired router is never
//!   affected by later configuration

use std::collections::HashMap;
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures_util::future::BoxFuture;

use crate::config::schema::TrustEntryConfig;
use crate::middleware::uri::rewrite_uri;
use crate::observability::metrics;
use crate::trust::error::TrustResult;
use crate::trust::protocol::ProtocolResolution;
use crate::trust::registry::{NotTrustedBranch, TrustEntry, TrustRegistry};
use crate::trust::resolver::resolve;

/// Identity attached to requests that passed the trust check.
///
/// `attributes` holds the resolved fields the active trust entry was allowed
/// to forward; `clientIp` is always present.
#[derive(Clone, Debug)]
pub struct ForwardedIdentity {
    pub client_ip: IpAddr,
    pub attributes: HashMap<String, String>,
}

/// State and configuration surface of the trusted-hosts middleware.
#[derive(Clone, Debug, Default)]
pub struct TrustedHosts {
    registry: TrustRegistry,
}

impl TrustedHosts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trust `networks` with the default header wiring, yielding a new
    /// middleware value. Use [`TrustEntry`] + [`with_trusted_entry`] for
    /// custom header bindings.
    ///
    /// [`with_trusted_entry`]: Self::with_trusted_entry
    pub fn add_trusted_hosts<I, S>(&self, networks: I) -> TrustResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self.with_trusted_entry(TrustEntry::new(networks)?))
    }

    /// Append a fully configured trust entry, yielding a new middleware
    /// value. Entries are matched first-registered-first.
    pub fn with_trusted_entry(&self, entry: TrustEntry) -> Self {
        Self {
            registry: self.registry.with_entry(entry),
        }
    }

    /// Drop every trust entry, yielding a new middleware value.
    pub fn remove_trusted_hosts(&self) -> Self {
        Self {
            registry: self.registry.without_entries(),
        }
    }

    /// Replace the handler invoked for untrusted peers, yielding a new
    /// middleware value. The default responds 412 with an empty body.
    pub fn with_not_trusted_branch<F, Fut>(&self, handler: F) -> Self
    where
        F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        let branch: NotTrustedBranch =
            Arc::new(move |req| Box::pin(handler(req)) as BoxFuture<'static, Response>);
        Self {
            registry: self.registry.with_not_trusted_branch(branch),
        }
    }

    /// Build a middleware value from validated configuration.
    pub fn from_config<'a, I>(entries: I) -> TrustResult<Self>
    where
        I: IntoIterator<Item = &'a TrustEntryConfig>,
    {
        let mut trusted = Self::new();
        for config in entries {
            trusted = trusted.with_trusted_entry(entry_from_config(config)?);
        }
        Ok(trusted)
    }

    pub fn registry(&self) -> &TrustRegistry {
        &self.registry
    }
}

fn entry_from_config(config: &TrustEntryConfig) -> TrustResult<TrustEntry> {
    let mut entry = TrustEntry::new(&config.networks)?;

    if !config.ip_headers.is_empty() {
        entry = entry.with_ip_headers(
            config
                .ip_headers
                .iter()
                .map(|header| (header.name.as_str(), header.encoding.into())),
        )?;
    }
    for protocol_header in &config.protocol_headers {
        let resolution = if protocol_header.protocols.is_empty() {
            None
        } else {
            Some(ProtocolResolution::table(
                protocol_header
                    .protocols
                    .iter()
                    .map(|protocol| (protocol.scheme.as_str(), protocol.values.iter())),
            )?)
        };
        entry = entry.with_protocol_header(&protocol_header.header, resolution)?;
    }
    if !config.host_headers.is_empty() {
        entry = entry.with_host_headers(&config.host_headers)?;
    }
    if !config.url_headers.is_empty() {
        entry = entry.with_url_headers(&config.url_headers)?;
    }
    if let Some(attributes) = &config.trusted_attributes {
        entry = entry.with_trusted_attributes(attributes);
    }
    Ok(entry)
}

/// Middleware function resolving the true client network identity.
pub async fn trusted_hosts_middleware(
    State(trust): State<TrustedHosts>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let resolution = match resolve(trust.registry(), peer.ip(), req.headers()) {
        Ok(Some(resolution)) => resolution,
        Ok(None) => {
            tracing::warn!(peer = %peer.ip(), "Peer outside trusted networks");
            metrics::record_untrusted();
            return match trust.registry().not_trusted_branch() {
                Some(branch) => branch(req).await,
                None => default_not_trusted_response(),
            };
        }
        Err(err) => {
            tracing::error!(error = %err, "Protocol strategy violated its contract");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    metrics::record_trusted();
    if let Some(scheme) = &resolution.scheme {
        metrics::record_scheme_override(scheme);
    }

    tracing::debug!(
        peer = %peer.ip(),
        client = %resolution.client_ip,
        scheme = resolution.scheme.as_deref(),
        host = resolution.host.as_deref(),
        "Resolved client identity"
    );

    if let Some(uri) = rewrite_uri(&req, &resolution) {
        *req.uri_mut() = uri;
    }
    req.extensions_mut().insert(ForwardedIdentity {
        client_ip: resolution.client_ip,
        attributes: resolution.attributes,
    });

    next.run(req).await
}

fn default_not_trusted_response() -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::PRECONDITION_FAILED;
    response
}
