//! Chain-less scheme resolution middleware.
//!
//! # Responsibilities
//! - Learn the request scheme from a fixed protocol header, without a trust
//!   list or chain walk
//!
//! # Design Decisions
//! - Intended for setups where the client IP is already resolved upstream
//!   (for example by `ngx_http_realip_module`); do not register headers an
//!   untrusted sender can reach
//! - First registered header present on the request decides; later headers
//!   are consulted only when a custom strategy declines

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::middleware::uri::rewrite_scheme;
use crate::trust::error::{TrustError, TrustResult};
use crate::trust::protocol::ProtocolResolution;

/// Scheme resolver that unconditionally trusts its configured headers.
#[derive(Clone, Debug, Default)]
pub struct SchemeResolver {
    protocol_headers: Vec<(String, ProtocolResolution)>,
}

impl SchemeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a protocol header, yielding a new resolver. `None` selects
    /// the default `{ http: [http], https: [https, on] }` table;
    /// re-registering a header replaces its strategy in place.
    pub fn with_protocol_header(
        &self,
        header: &str,
        resolution: Option<ProtocolResolution>,
    ) -> TrustResult<Self> {
        let name = header.trim().to_ascii_lowercase();
        if name.is_empty() {
            return Err(TrustError::EmptyHeaderName);
        }
        let resolution = resolution.unwrap_or_else(ProtocolResolution::default_table);
        let mut protocol_headers = self.protocol_headers.clone();
        match protocol_headers.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = resolution,
            None => protocol_headers.push((name, resolution)),
        }
        Ok(Self { protocol_headers })
    }

    /// Unregister one header, yielding a new resolver.
    pub fn without_protocol_header(&self, header: &str) -> Self {
        let name = header.trim().to_ascii_lowercase();
        Self {
            protocol_headers: self
                .protocol_headers
                .iter()
                .filter(|(existing, _)| *existing != name)
                .cloned()
                .collect(),
        }
    }

    /// Unregister every header, yielding a new resolver.
    pub fn without_protocol_headers(&self) -> Self {
        Self {
            protocol_headers: Vec::new(),
        }
    }

    /// First decision from the registered headers present on the request.
    fn resolve_scheme(&self, headers: &HeaderMap) -> TrustResult<Option<String>> {
        for (name, resolution) in &self.protocol_headers {
            let values: Vec<String> = headers
                .get_all(name)
                .iter()
                .filter_map(|value| value.to_str().ok())
                .map(str::to_string)
                .collect();
            if values.is_empty() {
                continue;
            }
            if let Some(scheme) = resolution.resolve(&values)? {
                return Ok(Some(scheme));
            }
        }
        Ok(None)
    }
}

/// Middleware function applying the resolved scheme to the request URI.
pub async fn scheme_resolver_middleware(
    State(resolver): State<SchemeResolver>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match resolver.resolve_scheme(req.headers()) {
        Ok(Some(scheme)) => {
            if let Some(uri) = rewrite_scheme(&req, &scheme) {
                tracing::debug!(scheme = %scheme, "Scheme resolved from protocol header");
                *req.uri_mut() = uri;
            }
        }
        Ok(None) => {}
        Err(err) => {
            tracing::error!(error = %err, "Protocol strategy violated its contract");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }
    next.run(req).await
}
