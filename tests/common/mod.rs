//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

/// How the mock endpoint answers a subscribe request.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum Reply {
    /// Send each message in order, then wait for the client to close.
    Send(Vec<String>),
    /// Close the connection with the given code and reason.
    Close(u16, &'static str),
    /// Never answer.
    Silent,
}

pub fn confirmation(ticker: &str) -> String {
    format!(
        r#"{{"event":"subscription_status","data":{{"status":"subscribed","ticker":"{}"}}}}"#,
        ticker
    )
}

/// A running mock streaming endpoint.
pub struct MockStreamServer {
    pub addr: SocketAddr,
    /// Text frames received from clients, across all connections.
    pub received: Arc<Mutex<Vec<String>>>,
    /// Number of accepted WebSocket connections.
    pub connections: Arc<AtomicUsize>,
}

impl MockStreamServer {
    /// URL template pointing at this server.
    pub fn url_template(&self) -> String {
        format!("ws://{}/ws?api_key={{api_key}}", self.addr)
    }

    pub fn url(&self) -> String {
        format!("ws://{}/ws?api_key=test", self.addr)
    }
}

/// Start a mock endpoint. `behavior` receives the 0-based connection index.
pub async fn start_stream_server<F>(behavior: F) -> MockStreamServer
where
    F: Fn(usize) -> Reply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let received = Arc::new(Mutex::new(Vec::new()));
    let connections = Arc::new(AtomicUsize::new(0));
    let behavior = Arc::new(behavior);

    let rx = received.clone();
    let count = connections.clone();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let behavior = behavior.clone();
            let rx = rx.clone();
            let index = count.fetch_add(1, Ordering::SeqCst);

            tokio::spawn(async move {
                let Ok(mut ws) = tokio_tungstenite::accept_async(socket).await else {
                    return;
                };

                if let Some(Ok(Message::Text(text))) = ws.next().await {
                    rx.lock().unwrap().push(text.as_str().to_owned());
                }

                match behavior(index) {
                    Reply::Send(messages) => {
                        for message in messages {
                            if ws.send(Message::text(message)).await.is_err() {
                                return;
                            }
                        }
                    }
                    Reply::Close(code, reason) => {
                        let frame = CloseFrame {
                            code: CloseCode::from(code),
                            reason: reason.into(),
                        };
                        let _ = ws.close(Some(frame)).await;
                    }
                    Reply::Silent => {}
                }

                // Drain until the client goes away.
                while let Some(Ok(_)) = ws.next().await {}
            });
        }
    });

    MockStreamServer {
        addr,
        received,
        connections,
    }
}

/// An address with nothing listening on it.
#[allow(dead_code)]
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
