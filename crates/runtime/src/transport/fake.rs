//! Fake transport for unit testing JSON-RPC correlation and event routing.
//!
//! Provides an in-memory transport so the connection and everything above it can
//! be exercised without a browser.
//!
//! # Example
//!
//! ```ignore
//! let (parts, controller) = FakeTransportBuilder::new().build();
//! let connection = Arc::new(Connection::new(parts));
//! tokio::spawn({
//!     let conn = Arc::clone(&connection);
//!     async move { conn.run().await }
//! });
//!
//! let pending = tokio::spawn(async move { connection.send_command("Page.enable", json!({}), None).await });
//! let sent = controller.next_sent().await;
//! controller.inject_response(sent["id"].as_u64().unwrap(), json!({}));
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{Value, json};
use tokio::sync::{Mutex, Notify, mpsc};

use super::{Transport, TransportParts, TransportReceiver};
use crate::error::Result;

/// Builder for creating fake transport instances.
#[derive(Default)]
pub struct FakeTransportBuilder {}

impl FakeTransportBuilder {
	pub fn new() -> Self {
		Self {}
	}

	/// Returns [`TransportParts`] for building a connection and a
	/// [`FakeTransportController`] for scripting the browser side.
	pub fn build(self) -> (TransportParts, FakeTransportController) {
		let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
		let (message_tx, message_rx) = mpsc::unbounded_channel();
		let sent = Arc::new(Mutex::new(Vec::new()));
		let sent_notify = Arc::new(Notify::new());

		let sender = FakeTransportSender {
			sent: Arc::clone(&sent),
			notify: Arc::clone(&sent_notify),
		};
		let receiver = FakeTransportReceiver {
			inbound_rx,
			message_tx,
		};
		let controller = FakeTransportController {
			inbound_tx: Some(inbound_tx),
			sent,
			sent_notify,
			cursor: Mutex::new(0),
		};

		let parts = TransportParts {
			sender: Box::new(sender),
			receiver: Box::new(receiver),
			message_rx,
		};

		(parts, controller)
	}
}

/// Browser-side handle of a fake transport.
pub struct FakeTransportController {
	inbound_tx: Option<mpsc::UnboundedSender<Value>>,
	sent: Arc<Mutex<Vec<Value>>>,
	sent_notify: Arc<Notify>,
	cursor: Mutex<usize>,
}

impl FakeTransportController {
	/// Inject a raw JSON message as if the browser had sent it.
	pub fn inject(&self, message: Value) {
		if let Some(tx) = &self.inbound_tx {
			let _ = tx.send(message);
		}
	}

	pub fn inject_response(&self, id: u64, result: Value) {
		self.inject(json!({ "id": id, "result": result }));
	}

	pub fn inject_error(&self, id: u64, code: i64, message: &str) {
		self.inject(json!({ "id": id, "error": { "code": code, "message": message } }));
	}

	/// Inject an event; `session_id` scopes it to a flat session.
	pub fn inject_event(&self, method: &str, params: Value, session_id: Option<&str>) {
		let mut message = json!({ "method": method, "params": params });
		if let Some(session_id) = session_id {
			message["sessionId"] = json!(session_id);
		}
		self.inject(message);
	}

	/// Simulate the browser hanging up.
	pub fn close(&mut self) {
		self.inbound_tx = None;
	}

	/// Take all sent messages, clearing the buffer.
	pub async fn take_sent(&self) -> Vec<Value> {
		*self.cursor.lock().await = 0;
		std::mem::take(&mut *self.sent.lock().await)
	}

	/// Wait for the next message written by the connection.
	pub async fn next_sent(&self) -> Value {
		loop {
			let notified = self.sent_notify.notified();
			{
				let sent = self.sent.lock().await;
				let mut cursor = self.cursor.lock().await;
				if let Some(message) = sent.get(*cursor) {
					*cursor += 1;
					return message.clone();
				}
			}
			notified.await;
		}
	}
}

struct FakeTransportSender {
	sent: Arc<Mutex<Vec<Value>>>,
	notify: Arc<Notify>,
}

impl Transport for FakeTransportSender {
	fn send(&mut self, message: Value) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
		Box::pin(async move {
			self.sent.lock().await.push(message);
			self.notify.notify_waiters();
			Ok(())
		})
	}
}

struct FakeTransportReceiver {
	inbound_rx: mpsc::UnboundedReceiver<Value>,
	message_tx: mpsc::UnboundedSender<Value>,
}

impl TransportReceiver for FakeTransportReceiver {
	fn run(mut self: Box<Self>) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> {
		Box::pin(async move {
			while let Some(message) = self.inbound_rx.recv().await {
				if self.message_tx.send(message).is_err() {
					break;
				}
			}
			Ok(())
		})
	}
}
