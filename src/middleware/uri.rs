//! URI rewriting helpers shared by the middleware.

use axum::{
    body::Body,
    http::{
        header,
        uri::{Authority, PathAndQuery, Scheme},
        Request, Uri,
    },
};

use crate::trust::resolver::Resolution;

/// Rebuild the request URI with the resolved overrides applied. Returns
/// `None` when nothing changes or the result would not form a valid URI.
pub(crate) fn rewrite_uri(req: &Request<Body>, resolution: &Resolution) -> Option<Uri> {
    if resolution.scheme.is_none() && resolution.host.is_none() && resolution.path.is_none() {
        return None;
    }

    let mut parts = req.uri().clone().into_parts();

    if let Some(path) = &resolution.path {
        let path_and_query = match resolution.query.as_deref() {
            Some(query) if !query.is_empty() => format!("{path}?{query}"),
            _ => path.clone(),
        };
        // An unusable rewrite value keeps the original path.
        if let Ok(pq) = PathAndQuery::try_from(path_and_query.as_str()) {
            parts.path_and_query = Some(pq);
        }
    }

    if let Some(host) = &resolution.host {
        if let Ok(authority) = Authority::try_from(host.as_str()) {
            parts.authority = Some(authority);
        }
    }

    if let Some(scheme) = &resolution.scheme {
        if let Ok(scheme) = Scheme::try_from(scheme.as_str()) {
            parts.scheme = Some(scheme);
        }
    }

    normalize_parts(req, parts)
}

/// Swap only the URI scheme, keeping everything else.
pub(crate) fn rewrite_scheme(req: &Request<Body>, scheme: &str) -> Option<Uri> {
    let scheme = Scheme::try_from(scheme).ok()?;
    if req.uri().scheme() == Some(&scheme) {
        return None;
    }
    let mut parts = req.uri().clone().into_parts();
    parts.scheme = Some(scheme);
    normalize_parts(req, parts)
}

/// `http::Uri` cannot carry a scheme without an authority (or an authority
/// without a scheme), so fill the gaps from the request before rebuilding.
fn normalize_parts(
    req: &Request<Body>,
    mut parts: axum::http::uri::Parts,
) -> Option<Uri> {
    if parts.scheme.is_some() && parts.authority.is_none() {
        parts.authority = host_header_authority(req);
        parts.authority.as_ref()?;
    }
    if parts.authority.is_some() && parts.scheme.is_none() {
        parts.scheme = Some(Scheme::HTTP);
    }
    if parts.scheme.is_some() && parts.path_and_query.is_none() {
        parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    Uri::from_parts(parts).ok()
}

fn host_header_authority(req: &Request<Body>) -> Option<Authority> {
    let host = req.headers().get(header::HOST)?.to_str().ok()?;
    Authority::try_from(host).ok()
}
