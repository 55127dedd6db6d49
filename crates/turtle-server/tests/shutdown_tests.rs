//! Shutdown behavior with live event-stream subscribers.
//!
//! These tests bind the real router to an ephemeral local port, because
//! graceful shutdown only matters for connections the server is holding
//! open.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use turtle_server::{AppState, serve};

/// Open `GET /events` and wait for the response head.
async fn open_event_stream(addr: std::net::SocketAddr) -> TcpStream {
    let mut socket = TcpStream::connect(addr).await.unwrap();
    socket
        .write_all(b"GET /events HTTP/1.1\r\nHost: localhost\r\nAccept: text/event-stream\r\n\r\n")
        .await
        .unwrap();

    let mut head = Vec::new();
    let mut buf = [0_u8; 512];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = tokio::time::timeout(Duration::from_secs(2), socket.read(&mut buf))
            .await
            .unwrap()
            .unwrap();
        assert!(n > 0, "connection closed before the response head");
        head.extend_from_slice(buf.get(..n).unwrap());
    }
    assert!(head.starts_with(b"HTTP/1.1 200"));
    socket
}

#[tokio::test]
async fn cancelling_shutdown_stops_server_with_open_streams() {
    let state = Arc::new(AppState::default());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(serve(listener, Arc::clone(&state)));

    let mut socket = open_event_stream(addr).await;
    assert_eq!(state.hub.subscriber_count().await, 1);

    state.shutdown.cancel();

    let stopped = tokio::time::timeout(Duration::from_secs(3), server)
        .await
        .unwrap_or_else(|_| panic!("server still running with a subscriber attached"));
    assert!(stopped.unwrap().is_ok());
    assert_eq!(state.hub.subscriber_count().await, 0);

    // The stream was finished rather than abandoned: the socket reaches EOF.
    let mut rest = Vec::new();
    tokio::time::timeout(Duration::from_secs(2), socket.read_to_end(&mut rest))
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn streams_opened_after_shutdown_end_immediately() {
    let state = Arc::new(AppState::default());
    state.shutdown.cancel();

    let response = axum::response::IntoResponse::into_response(
        turtle_server::events::events(axum::extract::State(Arc::clone(&state))).await,
    );
    let body = axum::body::to_bytes(response.into_body(), usize::MAX);
    let bytes = tokio::time::timeout(Duration::from_secs(2), body)
        .await
        .unwrap()
        .unwrap();

    assert!(bytes.is_empty());
    assert_eq!(state.hub.subscriber_count().await, 0);
}
