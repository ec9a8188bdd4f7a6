//! End-to-end test over a real TCP listener.

mod common;

use std::net::SocketAddr;

use common::echo_router;
use tokio::net::TcpListener;
use trusted_hosts::TrustedHosts;

#[tokio::test]
async fn test_resolution_over_real_sockets() {
    let trusted = TrustedHosts::new()
        .add_trusted_hosts(["127.0.0.1"])
        .unwrap();
    let app = echo_router(trusted);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    let client = reqwest::Client::new();

    // The loopback peer is trusted, so the chain resolves.
    let body = client
        .get(format!("http://{addr}/"))
        .header("x-forwarded-for", "9.9.9.9, 5.5.5.5")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("client_ip: 5.5.5.5"), "{body}");

    // Without a chain the peer itself is the client.
    let body = client
        .get(format!("http://{addr}/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("client_ip: 127.0.0.1"), "{body}");
}
