//! Streaming transport binding.
//!
//! # Responsibilities
//! - Open a WebSocket connection to the endpoint
//! - Surface inbound traffic as `TransportEvent`s in delivery order
//! - Close deliberately with a chosen close code
//!
//! # Design Decisions
//! - `Connector` / `Connection` traits keep the session driver independent of
//!   tungstenite, so it can be driven by scripted transports in tests
//! - Ping/pong frames are consumed here and never reach the session
//! - A stream that ends without a close frame reports 1006 (abnormal closure)

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::probe::types::ProbeError;

/// Close code reported when the stream ends without a close frame.
pub const ABNORMAL_CLOSURE: u16 = 1006;

/// Inbound activity on an open connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Message(String),
    Closed { code: u16, reason: String },
    Error(String),
}

/// Opens connections to the endpoint.
#[async_trait]
pub trait Connector: Send + Sync {
    type Conn: Connection;

    async fn connect(&self, url: &str) -> Result<Self::Conn, ProbeError>;
}

/// An open, message-oriented connection.
#[async_trait]
pub trait Connection: Send {
    async fn send(&mut self, text: String) -> Result<(), ProbeError>;

    /// Wait for the next inbound event.
    async fn next_event(&mut self) -> TransportEvent;

    /// Close the connection. Failures are ignored; the session is already resolved.
    async fn close(&mut self, code: u16);
}

/// WebSocket connector backed by tokio-tungstenite.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    type Conn = WsConnection;

    async fn connect(&self, url: &str) -> Result<WsConnection, ProbeError> {
        let (stream, response) = connect_async(url)
            .await
            .map_err(|e| ProbeError::Transport(e.to_string()))?;
        tracing::debug!(status = %response.status(), "WebSocket handshake complete");
        Ok(WsConnection { stream })
    }
}

/// An open WebSocket connection.
pub struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Connection for WsConnection {
    async fn send(&mut self, text: String) -> Result<(), ProbeError> {
        self.stream
            .send(Message::text(text))
            .await
            .map_err(|e| ProbeError::Transport(e.to_string()))
    }

    async fn next_event(&mut self) -> TransportEvent {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return TransportEvent::Message(text.as_str().to_owned());
                }
                Some(Ok(Message::Binary(bytes))) => {
                    return TransportEvent::Message(String::from_utf8_lossy(&bytes).into_owned());
                }
                Some(Ok(Message::Close(frame))) => {
                    return match frame {
                        Some(frame) => TransportEvent::Closed {
                            code: u16::from(frame.code),
                            reason: frame.reason.as_str().to_owned(),
                        },
                        None => TransportEvent::Closed {
                            code: u16::from(CloseCode::Status),
                            reason: String::new(),
                        },
                    };
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => continue,
                Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) | None => {
                    return TransportEvent::Closed {
                        code: ABNORMAL_CLOSURE,
                        reason: String::new(),
                    };
                }
                Some(Err(e)) => return TransportEvent::Error(e.to_string()),
            }
        }
    }

    async fn close(&mut self, code: u16) {
        let frame = CloseFrame {
            code: CloseCode::from(code),
            reason: "".into(),
        };
        if let Err(e) = self.stream.close(Some(frame)).await {
            tracing::debug!(error = %e, "Error while closing WebSocket");
        }
    }
}
