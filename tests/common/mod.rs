//! Loopback test doubles shared by the integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::Router;
use http_body_util::BodyExt;
use shadowtap::server::{self, AppState};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};

/// What an upstream double saw for one request.
#[derive(Debug)]
pub struct Seen {
    pub method: String,
    pub uri: String,
    pub host: Option<String>,
    pub content_length: Option<String>,
    pub body: Bytes,
}

pub enum Reply {
    /// Fixed status and body.
    Fixed(StatusCode, &'static str),
    /// Echo the request body back.
    Echo,
}

/// An HTTP upstream that reports every request it receives.
pub async fn spawn_upstream(reply: Reply) -> (String, mpsc::UnboundedReceiver<Seen>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let reply = Arc::new(reply);

    let app = Router::new().fallback(move |req: Request| {
        let tx = tx.clone();
        let reply = Arc::clone(&reply);
        async move {
            let (parts, body) = req.into_parts();
            let body = body.collect().await.unwrap().to_bytes();
            let header = |name: &str| {
                parts
                    .headers
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(String::from)
            };
            let _ = tx.send(Seen {
                method: parts.method.to_string(),
                uri: parts.uri.to_string(),
                host: header("host"),
                content_length: header("content-length"),
                body: body.clone(),
            });
            match *reply {
                Reply::Fixed(status, text) => (status, [("x-upstream", "primary")], Bytes::from(text)),
                Reply::Echo => (StatusCode::OK, [("x-upstream", "primary")], body),
            }
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, rx)
}

/// An address nothing listens on.
pub async fn unreachable_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);
    addr
}

/// Accepts connections and hangs up immediately, counting each attempt.
pub async fn spawn_hangup() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            drop(stream);
        }
    });
    (addr, count)
}

/// Run shadowtap on an ephemeral port.
pub async fn start_shadowtap(state: AppState) -> (SocketAddr, oneshot::Sender<()>) {
    let router = server::build_router(Arc::new(state));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        server::serve(listener, router, async {
            let _ = shutdown_rx.await;
        })
        .await
        .unwrap();
    });

    (addr, shutdown_tx)
}

pub async fn next(rx: &mut mpsc::UnboundedReceiver<Seen>) -> Seen {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("upstream saw nothing within 5s")
        .expect("upstream channel closed")
}

/// Assert no further request arrives within a short grace period.
pub async fn assert_quiet(rx: &mut mpsc::UnboundedReceiver<Seen>) {
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(rx.try_recv().is_err(), "unexpected extra request");
}
