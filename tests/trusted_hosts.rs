//! Integration tests for the trusted-hosts middleware.

mod common;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower::ServiceExt;

use common::{body_text, echo_router, request_from};
use trusted_hosts::TrustedHosts;

const PEER: &str = "127.0.0.1:41234";

fn trusting(networks: &[&str]) -> TrustedHosts {
    TrustedHosts::new().add_trusted_hosts(networks.to_vec()).unwrap()
}

#[tokio::test]
async fn test_x_forwarded_chain_stops_at_untrusted_hop() {
    let router = echo_router(trusting(&["8.8.8.8", "127.0.0.1"]));
    let req = request_from(
        PEER,
        "/",
        &[("x-forwarded-for", "9.9.9.9, 5.5.5.5, 2.2.2.2")],
    );

    let response = router.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response.into_body()).await;
    assert!(body.contains("client_ip: 2.2.2.2"), "{body}");
    assert!(body.contains("attr.clientIp: 2.2.2.2"), "{body}");
}

#[tokio::test]
async fn test_x_forwarded_chain_walks_through_trusted_hop() {
    let router = echo_router(trusting(&["8.8.8.8", "127.0.0.1", "2.2.2.2"]));
    let req = request_from(
        PEER,
        "/",
        &[("x-forwarded-for", "9.9.9.9, 5.5.5.5, 2.2.2.2")],
    );

    let response = router.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response.into_body()).await;
    assert!(body.contains("client_ip: 5.5.5.5"), "{body}");
}

#[tokio::test]
async fn test_rfc_chain_level_one() {
    let router = echo_router(trusting(&["8.8.8.8", "127.0.0.1"]));
    let req = request_from(
        PEER,
        "/",
        &[("forward", "for=9.9.9.9, for=5.5.5.5, for=2.2.2.2")],
    );

    let response = router.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response.into_body()).await;
    assert!(body.contains("client_ip: 2.2.2.2"), "{body}");
}

#[tokio::test]
async fn test_rfc_chain_with_host_and_protocol() {
    let router = echo_router(trusting(&["8.8.8.8", "127.0.0.1", "2.2.2.2"]));
    let req = request_from(
        PEER,
        "/",
        &[(
            "forward",
            "for=9.9.9.9, proto=https;for=5.5.5.5;host=test, for=2.2.2.2",
        )],
    );

    let response = router.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response.into_body()).await;
    assert!(body.contains("client_ip: 5.5.5.5"), "{body}");
    assert!(body.contains("scheme: https"), "{body}");
    assert!(body.contains("host: test"), "{body}");
    assert!(body.contains("attr.scheme: https"), "{body}");
    assert!(body.contains("attr.host: test"), "{body}");
}

#[tokio::test]
async fn test_rewrite_url_header() {
    let router = echo_router(trusting(&["8.8.8.8", "127.0.0.1", "2.2.2.2"]));
    let req = request_from(
        PEER,
        "/",
        &[
            (
                "forward",
                "for=9.9.9.9, proto=https;for=5.5.5.5;host=test, for=2.2.2.2",
            ),
            ("x-rewrite-url", "/test?test=test"),
        ],
    );

    let response = router.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response.into_body()).await;
    assert!(body.contains("client_ip: 5.5.5.5"), "{body}");
    assert!(body.contains("path: /test"), "{body}");
    assert!(body.contains("query: test=test"), "{body}");
}

#[tokio::test]
async fn test_repeated_header_lines() {
    let router = echo_router(trusting(&["8.8.8.8", "127.0.0.1"]));
    let req = request_from(
        PEER,
        "/",
        &[
            ("x-forwarded-for", "9.9.9.9"),
            ("x-forwarded-for", "5.5.5.5"),
            ("x-forwarded-for", "2.2.2.2"),
        ],
    );

    let response = router.oneshot(req).await.unwrap();
    let body = body_text(response.into_body()).await;
    assert!(body.contains("client_ip: 2.2.2.2"), "{body}");
}

#[tokio::test]
async fn test_no_entries_is_untrusted() {
    let router = echo_router(TrustedHosts::new());
    let req = request_from(PEER, "/", &[("x-forwarded-for", "9.9.9.9")]);

    let response = router.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
    assert!(body_text(response.into_body()).await.is_empty());
}

#[tokio::test]
async fn test_untrusted_peer_gets_default_branch() {
    let router = echo_router(trusting(&["8.8.8.8"]));
    let req = request_from(
        PEER,
        "/",
        &[("x-forwarded-for", "9.9.9.9, 5.5.5.5, 2.2.2.2")],
    );

    let response = router.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
}

#[tokio::test]
async fn test_custom_not_trusted_branch() {
    let trusted = TrustedHosts::new().with_not_trusted_branch(|_req| async {
        let response: Response = (StatusCode::FORBIDDEN, "Another branch.").into_response();
        response
    });
    let router = echo_router(trusted);
    let req = request_from(PEER, "/", &[]);

    let response = router.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_text(response.into_body()).await, "Another branch.");
}

#[tokio::test]
async fn test_trusted_peer_without_chain_resolves_to_peer() {
    let router = echo_router(trusting(&["127.0.0.1"]));
    let req = request_from(PEER, "/", &[]);

    let response = router.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response.into_body()).await;
    assert!(body.contains("client_ip: 127.0.0.1"), "{body}");
}

#[tokio::test]
async fn test_configuration_never_affects_prior_values() {
    let base = TrustedHosts::new();
    let derived = base.add_trusted_hosts(["127.0.0.1"]).unwrap();

    // The base middleware still rejects the peer the derived one trusts.
    let response = echo_router(base)
        .oneshot(request_from(PEER, "/", &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);

    let response = echo_router(derived)
        .oneshot(request_from(PEER, "/", &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_spoofed_headers_from_untrusted_peer_ignored() {
    let router = echo_router(trusting(&["10.0.0.0/8"]));
    let req = request_from(
        "203.0.113.7:55000",
        "/",
        &[
            ("x-forwarded-for", "10.0.0.1"),
            ("x-rewrite-url", "/admin?elevate=1"),
        ],
    );

    let response = router.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
}
