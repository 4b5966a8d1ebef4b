//! `HttpFetcher` against a throwaway local HTTP server.
//!
//! The server answers each connection once with a canned response chosen by
//! request path, which is enough to check status mapping, user agent and
//! timeouts without any external network.

use flagdeck::{FetchError, HttpFetcher, PageFetcher};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const USER_AGENT: &str = "FlagDeckTest/1.0";

/// Spawn a server; returns its address and the request heads it has seen.
async fn serve() -> (SocketAddr, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let log = Arc::clone(&log);
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let mut head = String::new();
                while !head.contains("\r\n\r\n") {
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    if n == 0 {
                        return;
                    }
                    head.push_str(&String::from_utf8_lossy(&buf[..n]));
                }
                log.lock().unwrap().push(head.clone());

                let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                let (status, body): (&str, &[u8]) = match path.as_str() {
                    "/wiki/Flag_of_Chad" => ("200 OK", b"<html><body>Chad</body></html>".as_slice()),
                    "/img/chad.png" => ("200 OK", b"\x89PNG\r\n\x1a\n".as_slice()),
                    "/slow" => {
                        tokio::time::sleep(Duration::from_secs(3)).await;
                        ("200 OK", b"late".as_slice())
                    }
                    _ => ("404 Not Found", b"missing".as_slice()),
                };
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.write_all(body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, seen)
}

#[tokio::test]
async fn fetch_text_returns_body_and_sends_user_agent() {
    let (addr, seen) = serve().await;
    let fetcher = HttpFetcher::new(USER_AGENT).unwrap();

    let body = fetcher
        .fetch_text(&format!("http://{addr}/wiki/Flag_of_Chad"), Some(Duration::from_secs(5)))
        .await
        .unwrap();

    assert!(body.contains("Chad"));
    let heads = seen.lock().unwrap();
    assert!(
        heads[0].to_lowercase().contains(&format!("user-agent: {}", USER_AGENT.to_lowercase())),
        "{}",
        heads[0]
    );
}

#[tokio::test]
async fn fetch_bytes_returns_payload() {
    let (addr, _) = serve().await;
    let fetcher = HttpFetcher::new(USER_AGENT).unwrap();

    let bytes = fetcher
        .fetch_bytes(&format!("http://{addr}/img/chad.png"), None)
        .await
        .unwrap();

    assert_eq!(&bytes[..4], b"\x89PNG");
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let (addr, _) = serve().await;
    let fetcher = HttpFetcher::new(USER_AGENT).unwrap();
    let url = format!("http://{addr}/wiki/Flag_of_Nowhere");

    let err = fetcher.fetch_text(&url, None).await.unwrap_err();

    assert_eq!(err, FetchError::Status { url, status: 404 });
}

#[tokio::test]
async fn slow_response_times_out() {
    let (addr, _) = serve().await;
    let fetcher = HttpFetcher::new(USER_AGENT).unwrap();

    let err = fetcher
        .fetch_text(&format!("http://{addr}/slow"), Some(Duration::from_millis(200)))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Timeout { .. }), "{err}");
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let fetcher = HttpFetcher::new(USER_AGENT).unwrap();

    let err = fetcher
        .fetch_text(&format!("http://{addr}/"), Some(Duration::from_secs(2)))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Transport { .. }), "{err}");
}
