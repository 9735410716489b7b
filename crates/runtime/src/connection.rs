//! Command/response correlation over a [`Transport`](crate::Transport).
//!
//! Every outbound command gets the next integer id and a pending slot holding a
//! oneshot sender. The run loop reads inbound frames, completes the slot whose
//! id matches a reply and pushes everything with a `method` but no `id` onto a
//! single event queue, preserving arrival order.
//!
//! The pending map and the `closed` flag live under one lock, so a command can
//! never register after the loop has drained the map: once the transport goes
//! away, pending commands resolve to [`Error::ChannelClosed`], new ones fail
//! immediately and the event queue ends. Dropping a command future frees its slot.


use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabscope_protocol::SessionId;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, trace};

use crate::error::{Error, Result};
use crate::transport::{Transport, TransportParts, TransportReceiver};

/// Outbound command frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
	pub id: u64,
	pub method: String,
	pub params: Value,
	/// Flat session the command is addressed to; absent for browser-level commands.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub session_id: Option<SessionId>,
}

/// Reply frame. Exactly one of `result` and `error` is normally present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
	pub id: u64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub result: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<ErrorPayload>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub session_id: Option<SessionId>,
}

impl Response {
	/// The command's outcome; a missing result is `null`.
	pub fn into_result(self) -> Result<Value> {
		match self.error {
			Some(payload) => Err(payload.into()),
			None => Ok(self.result.unwrap_or(Value::Null)),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
	pub code: i64,
	pub message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<String>,
}

impl From<ErrorPayload> for Error {
	fn from(payload: ErrorPayload) -> Self {
		Error::Remote {
			code: payload.code,
			message: payload.message,
			data: payload.data,
		}
	}
}

/// Unsolicited protocol event. `session_id` is set for events raised inside a
/// flat session and absent for browser-level events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
	pub method: String,
	#[serde(default)]
	pub params: Value,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub session_id: Option<SessionId>,
}

/// Inbound frame classified by shape: replies carry `id`, events carry
/// `method` without `id`. Anything else is kept as `Unknown`.
#[derive(Debug, Clone)]
pub enum Message {
	Response(Response),
	Event(Event),
	Unknown(Value),
}

impl Message {
	pub fn classify(frame: Value) -> Result<Self> {
		if frame.get("id").is_some() {
			Ok(Message::Response(serde_json::from_value(frame)?))
		} else if frame.get("method").is_some() {
			Ok(Message::Event(serde_json::from_value(frame)?))
		} else {
			Ok(Message::Unknown(frame))
		}
	}
}

type Reply = oneshot::Sender<Result<Value>>;

#[derive(Default)]
struct Pending {
	slots: HashMap<u64, Reply>,
	closed: bool,
}

/// Frees a pending slot when the awaiting command future goes away, whether it
/// completed or was dropped mid-flight.
struct SlotGuard<'a> {
	id: u64,
	pending: &'a Mutex<Pending>,
}

impl Drop for SlotGuard<'_> {
	fn drop(&mut self) {
		if self.pending.lock().slots.remove(&self.id).is_some() {
			trace!(id = self.id, "released abandoned command slot");
		}
	}
}

/// Halves handed to [`Connection::run`], taken exactly once.
struct Parts {
	sender: Box<dyn Transport>,
	receiver: Box<dyn TransportReceiver>,
	inbound: mpsc::UnboundedReceiver<Value>,
	outbound: mpsc::UnboundedReceiver<Value>,
}

/// JSON-RPC connection to a browser.
pub struct Connection {
	next_id: AtomicU64,
	pending: Mutex<Pending>,
	outbound: mpsc::UnboundedSender<Value>,
	/// Dropped when the transport closes so the event receiver sees `None`.
	events_tx: Mutex<Option<mpsc::UnboundedSender<Event>>>,
	events_rx: Mutex<Option<mpsc::UnboundedReceiver<Event>>>,
	parts: Mutex<Option<Parts>>,
}

impl Connection {
	pub fn new(transport: TransportParts) -> Self {
		let (outbound, outbound_rx) = mpsc::unbounded_channel();
		let (events_tx, events_rx) = mpsc::unbounded_channel();

		Self {
			next_id: AtomicU64::new(1),
			pending: Mutex::new(Pending::default()),
			outbound,
			events_tx: Mutex::new(Some(events_tx)),
			events_rx: Mutex::new(Some(events_rx)),
			parts: Mutex::new(Some(Parts {
				sender: transport.sender,
				receiver: transport.receiver,
				inbound: transport.message_rx,
				outbound: outbound_rx,
			})),
		}
	}

	/// Takes the event queue. Only the first caller gets it.
	pub fn take_events(&self) -> Option<mpsc::UnboundedReceiver<Event>> {
		self.events_rx.lock().take()
	}

	pub fn is_closed(&self) -> bool {
		self.pending.lock().closed
	}

	/// Sends `method` and waits for its reply. With `session_id` set the command
	/// is routed to that flat session.
	pub async fn send_command(&self, method: &str, params: Value, session_id: Option<&SessionId>) -> Result<Value> {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		let (reply, rx) = oneshot::channel();
		{
			let mut pending = self.pending.lock();
			if pending.closed {
				return Err(Error::ChannelClosed);
			}
			pending.slots.insert(id, reply);
		}
		let _slot = SlotGuard {
			id,
			pending: &self.pending,
		};

		let frame = serde_json::to_value(Request {
			id,
			method: method.to_string(),
			params,
			session_id: session_id.cloned(),
		})?;
		debug!(id, method, session = ?session_id, "command");
		self.outbound.send(frame).map_err(|_| Error::ChannelClosed)?;

		rx.await.map_err(|_| Error::ChannelClosed)?
	}

	/// Drives the transport until the peer hangs up, then fails whatever is
	/// still pending. Returns immediately if called a second time.
	pub async fn run(self: &Arc<Self>) {
		let Some(parts) = self.parts.lock().take() else {
			error!("connection is already running");
			return;
		};
		let Parts {
			mut sender,
			receiver,
			mut inbound,
			mut outbound,
		} = parts;

		let reader = tokio::spawn(async move {
			if let Err(err) = receiver.run().await {
				error!(error = %err, "transport read failed");
			}
		});
		let writer = tokio::spawn(async move {
			while let Some(frame) = outbound.recv().await {
				if let Err(err) = sender.send(frame).await {
					error!(error = %err, "transport write failed");
					break;
				}
			}
		});

		while let Some(frame) = inbound.recv().await {
			match Message::classify(frame) {
				Ok(message) => {
					if let Err(err) = self.deliver(message) {
						debug!(error = %err, "undeliverable frame");
					}
				}
				Err(err) => error!(error = %err, "malformed frame"),
			}
		}

		self.close();
		writer.abort();
		let _ = reader.await;
		let _ = writer.await;
	}

	fn close(&self) {
		let drained: Vec<_> = {
			let mut pending = self.pending.lock();
			pending.closed = true;
			pending.slots.drain().collect()
		};
		self.events_tx.lock().take();
		debug!(pending = drained.len(), "transport closed");
		for (_, reply) in drained {
			let _ = reply.send(Err(Error::ChannelClosed));
		}
	}

	fn deliver(&self, message: Message) -> Result<()> {
		match message {
			Message::Response(response) => {
				let reply = self
					.pending
					.lock()
					.slots
					.remove(&response.id)
					.ok_or_else(|| Error::ProtocolError(format!("reply to unknown command id {}", response.id)))?;
				let _ = reply.send(response.into_result());
				Ok(())
			}
			Message::Event(event) => {
				trace!(method = %event.method, session = ?event.session_id, "event");
				match self.events_tx.lock().as_ref() {
					Some(events) => events.send(event).map_err(|_| Error::ChannelClosed),
					None => Err(Error::ChannelClosed),
				}
			}
			Message::Unknown(frame) => {
				debug!(%frame, "ignoring unrecognised frame");
				Ok(())
			}
		}
	}
}
