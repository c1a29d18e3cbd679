//! Tests for the plain HTTP surface: greetings, health, and the
//! connection-count metrics endpoint.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::net::TcpListener;

/// Helper: start the server on a random port and return its address.
async fn start_test_server() -> SocketAddr {
    let state = relay_server::state::AppState::new();
    let app = relay_server::routes::build_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

async fn get_json(addr: SocketAddr, path: &str) -> serde_json::Value {
    reqwest::get(format!("http://{}{}", addr, path))
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_root_greeting() {
    let addr = start_test_server().await;
    let body = get_json(addr, "/").await;
    assert_eq!(body["message"], "Hello World");
}

#[tokio::test]
async fn test_parameterized_greeting() {
    let addr = start_test_server().await;
    let body = get_json(addr, "/hello/Marie").await;
    assert_eq!(body["message"], "Hello Marie");
}

#[tokio::test]
async fn test_health_check() {
    let addr = start_test_server().await;
    let body = reqwest::get(format!("http://{}/health", addr))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_metrics_track_live_connections() {
    let addr = start_test_server().await;

    let body = get_json(addr, "/metrics").await;
    assert_eq!(body["active_connections"], 0);

    // Echo sessions never touch the registry.
    let mut echo = tokio_tungstenite::connect_async(format!("ws://{}/ws/hello", addr))
        .await
        .expect("Failed to connect")
        .0;
    let _ = echo.next().await; // "Hello"
    let body = get_json(addr, "/metrics").await;
    assert_eq!(body["active_connections"], 0);

    // Broadcast sessions do.
    let mut member = tokio_tungstenite::connect_async(format!("ws://{}/ws/broadcast/Zoe", addr))
        .await
        .expect("Failed to connect")
        .0;
    let _ = member.next().await; // welcome
    let body = get_json(addr, "/metrics").await;
    assert_eq!(body["active_connections"], 1);

    drop(member);
    tokio::time::sleep(Duration::from_millis(200)).await;
    let body = get_json(addr, "/metrics").await;
    assert_eq!(body["active_connections"], 0);
}
