//! Size-bound enforcement on streaming downloads
//!
//! Responses come from a local socket, so no test touches the network.

use pakt_errors::{Error, SourceError};
use pakt_net::{download_file, NetClient, NetConfig};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Serve one connection with a canned HTTP response.
async fn serve_once(response: Vec<u8>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let _ = socket.read(&mut buf).await;
        let _ = socket.write_all(&response).await;
        let _ = socket.shutdown().await;
    });
    format!("http://{addr}/file.bin")
}

fn client() -> NetClient {
    NetClient::new(NetConfig {
        retry_count: 0,
        retry_delay: Duration::ZERO,
        ..NetConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn advertised_oversize_is_rejected_before_streaming() {
    let mut response =
        b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\nConnection: close\r\n\r\n".to_vec();
    response.extend(vec![0u8; 1000]);
    let url = serve_once(response).await;

    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("file.bin");
    let err = download_file(&client(), &url, &dest, 10).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Source(SourceError::SizeLimitExceeded { limit: 10, .. })
    ));
    // The pre-check fires before the destination is even created.
    assert!(!dest.exists());
}

#[tokio::test]
async fn stream_past_the_bound_aborts_and_removes_the_partial_file() {
    // No Content-Length: the body size is only discovered by streaming.
    let mut response = b"HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n".to_vec();
    response.extend(vec![7u8; 4096]);
    let url = serve_once(response).await;

    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("file.bin");
    let err = download_file(&client(), &url, &dest, 64).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Source(SourceError::SizeLimitExceeded { limit: 64, .. })
    ));
    assert!(!dest.exists());
}

#[tokio::test]
async fn bounded_download_within_the_limit_succeeds() {
    let body = b"small payload";
    let mut response = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    response.extend_from_slice(body);
    let url = serve_once(response).await;

    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("file.bin");
    download_file(&client(), &url, &dest, 1024).await.unwrap();
    assert_eq!(tokio::fs::read(&dest).await.unwrap(), body);
}
