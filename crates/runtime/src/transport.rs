//! Message transports.
//!
//! A transport moves whole JSON messages in both directions. It is split into a
//! writer half ([`Transport`]) and a reader half ([`TransportReceiver`]) so the
//! connection can drive them from separate tasks; decoded inbound messages land
//! on an unbounded queue handed out alongside the halves in [`TransportParts`].


pub mod fake;

use std::future::Future;
use std::pin::Pin;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::error::{Error, Result};

/// Writer half of a transport.
pub trait Transport: Send {
	fn send(&mut self, message: Value) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Reader half of a transport. `run` consumes the receiver and pumps decoded
/// messages until the peer closes.
pub trait TransportReceiver: Send {
	fn run(self: Box<Self>) -> Pin<Box<dyn Future<Output = Result<()>> + Send>>;
}

/// Everything a [`Connection`](crate::Connection) needs from a transport.
pub struct TransportParts {
	pub sender: Box<dyn Transport>,
	pub receiver: Box<dyn TransportReceiver>,
	pub message_rx: mpsc::UnboundedReceiver<Value>,
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Transport over the browser's DevTools WebSocket endpoint.
///
/// Each text frame carries exactly one JSON-RPC message.
pub struct WebSocketTransport {
	sink: SplitSink<WsStream, WsMessage>,
	stream: SplitStream<WsStream>,
	message_tx: mpsc::UnboundedSender<Value>,
}

impl WebSocketTransport {
	/// Connects to a `ws://` or `wss://` DevTools endpoint.
	pub async fn connect(url: &str) -> Result<(Self, mpsc::UnboundedReceiver<Value>)> {
		let (ws, _) = tokio_tungstenite::connect_async(url)
			.await
			.map_err(|e| Error::ConnectionFailed(format!("{url}: {e}")))?;
		tracing::debug!(url, "websocket connected");

		let (sink, stream) = ws.split();
		let (message_tx, message_rx) = mpsc::unbounded_channel();

		Ok((
			Self {
				sink,
				stream,
				message_tx,
			},
			message_rx,
		))
	}

	pub fn into_parts(self) -> (WebSocketTransportSender, WebSocketTransportReceiver) {
		(
			WebSocketTransportSender { sink: self.sink },
			WebSocketTransportReceiver {
				stream: self.stream,
				message_tx: self.message_tx,
			},
		)
	}

	pub fn into_transport_parts(self, message_rx: mpsc::UnboundedReceiver<Value>) -> TransportParts {
		let (sender, receiver) = self.into_parts();
		TransportParts {
			sender: Box::new(sender),
			receiver: Box::new(receiver),
			message_rx,
		}
	}
}

pub struct WebSocketTransportSender {
	sink: SplitSink<WsStream, WsMessage>,
}

impl Transport for WebSocketTransportSender {
	fn send(&mut self, message: Value) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
		Box::pin(async move {
			let text = serde_json::to_string(&message)?;
			self.sink
				.send(WsMessage::Text(text.into()))
				.await
				.map_err(|e| Error::TransportError(e.to_string()))
		})
	}
}

pub struct WebSocketTransportReceiver {
	stream: SplitStream<WsStream>,
	message_tx: mpsc::UnboundedSender<Value>,
}

impl TransportReceiver for WebSocketTransportReceiver {
	fn run(mut self: Box<Self>) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> {
		Box::pin(async move {
			while let Some(frame) = self.stream.next().await {
				let frame = frame.map_err(|e| Error::TransportError(e.to_string()))?;
				let value: Value = match frame {
					WsMessage::Text(text) => match serde_json::from_str(&text) {
						Ok(value) => value,
						Err(e) => {
							tracing::warn!(error = %e, "dropping undecodable text frame");
							continue;
						}
					},
					WsMessage::Binary(bytes) => match serde_json::from_slice(&bytes) {
						Ok(value) => value,
						Err(e) => {
							tracing::warn!(error = %e, "dropping undecodable binary frame");
							continue;
						}
					},
					WsMessage::Close(frame) => {
						tracing::debug!(?frame, "websocket closed by peer");
						break;
					}
					_ => continue,
				};

				if self.message_tx.send(value).is_err() {
					break;
				}
			}
			Ok(())
		})
	}
}
