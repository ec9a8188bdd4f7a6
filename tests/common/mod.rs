//! Shared utilities for middleware integration tests.

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    middleware,
    routing::get,
    Router,
};

use trusted_hosts::{trusted_hosts_middleware, ForwardedIdentity, TrustedHosts};

/// Router that reports the identity the middleware resolved.
#[allow(dead_code)]
pub fn echo_router(trusted: TrustedHosts) -> Router {
    Router::new()
        .route("/", get(echo_identity))
        .route("/{*path}", get(echo_identity))
        .layer(middleware::from_fn_with_state(
            trusted,
            trusted_hosts_middleware,
        ))
}

#[allow(dead_code)]
async fn echo_identity(req: Request<Body>) -> String {
    let uri = req.uri();
    let identity = req.extensions().get::<ForwardedIdentity>();

    let mut lines = vec![
        format!("uri: {uri}"),
        format!("path: {}", uri.path()),
        format!("query: {}", uri.query().unwrap_or_default()),
        format!("scheme: {}", uri.scheme_str().unwrap_or_default()),
        format!("host: {}", uri.host().unwrap_or_default()),
    ];
    if let Some(identity) = identity {
        lines.push(format!("client_ip: {}", identity.client_ip));
        let mut attributes: Vec<_> = identity.attributes.iter().collect();
        attributes.sort();
        for (name, value) in attributes {
            lines.push(format!("attr.{name}: {value}"));
        }
    }
    lines.join("\n")
}

/// Build a request carrying the given peer address, as the transport layer
/// would via `ConnectInfo`.
#[allow(dead_code)]
pub fn request_from(peer: &str, uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let mut req = builder.body(Body::empty()).unwrap();
    let peer: SocketAddr = peer.parse().unwrap();
    req.extensions_mut().insert(ConnectInfo(peer));
    req
}

/// Collect a response body as text.
#[allow(dead_code)]
pub async fn body_text(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
