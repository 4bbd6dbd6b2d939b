// Scripted HTTP responder for failure-injection and multi-tick sequences.
// httpmock covers static fixtures; this covers what it cannot: hanging up
// mid-exchange and serving a different payload on every poll.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// One scripted exchange.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Respond with the given status and JSON body.
    Json(u16, serde_json::Value),
    /// Accept the connection and close it without responding.
    Hangup,
}

pub struct TestServer {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl TestServer {
    /// Serve the scripted exchanges in order; the last one repeats for any
    /// further request.
    pub async fn start(script: Vec<Scripted>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test server");
        let addr = listener.local_addr().expect("test server addr");
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            let mut remaining = script;
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                counter.fetch_add(1, Ordering::SeqCst);

                let step = if remaining.len() > 1 {
                    remaining.remove(0)
                } else {
                    remaining.first().cloned().unwrap_or(Scripted::Hangup)
                };

                // Drain the request head; its contents are irrelevant.
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;

                match step {
                    Scripted::Hangup => drop(socket),
                    Scripted::Json(status, body) => {
                        let body = body.to_string();
                        let response = format!(
                            "HTTP/1.1 {} {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                            status,
                            reason(status),
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    }
                }
            }
        });

        TestServer { addr, hits }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Number of connections accepted so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        301 => "Moved Permanently",
        302 => "Found",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
