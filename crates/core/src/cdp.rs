//! Production host over a single browser-level DevTools connection.
//!
//! Targets are attached with flat sessions (`Target.attachToTarget` with
//! `flatten: true`); inspection windows are browser targets created with
//! `Target.createTarget`, so their ids double as [`SurfaceId`]s.


use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tabscope_protocol::browser::GetVersionResult;
use tabscope_protocol::target::{
	AttachToTargetResult, CreateTargetResult, DetachedFromTarget, GetTargetsResult, TargetDestroyed, TargetInfo,
};
use tabscope_protocol::{SessionId, TargetId, methods};
use tabscope_runtime::{Connection, Event, WebSocketTransport};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::host::{AttachFailure, DebuggerHost, HostSignal, SurfaceHost, SurfaceId, SurfaceSpec};

/// Diagnostics the browser uses when another client already holds the target.
const CONFLICT_MARKERS: [&str; 2] = ["already attached", "another debugger"];

pub struct CdpHost {
	connection: Arc<Connection>,
	sessions: Mutex<HashMap<TargetId, SessionId>>,
	surfaces: Mutex<HashSet<TargetId>>,
	protocol_version: String,
	product: String,
}

impl CdpHost {
	/// Connects to a browser WebSocket endpoint and starts the connection.
	pub async fn connect(ws_url: &str) -> Result<(Arc<Self>, mpsc::UnboundedReceiver<Event>)> {
		let (transport, message_rx) = WebSocketTransport::connect(ws_url).await?;
		let connection = Arc::new(Connection::new(transport.into_transport_parts(message_rx)));
		Self::start(connection).await
	}

	/// Spawns the connection's run loop, reads the browser version and enables
	/// target discovery. Returns the host and the raw event queue.
	pub async fn start(connection: Arc<Connection>) -> Result<(Arc<Self>, mpsc::UnboundedReceiver<Event>)> {
		let events = connection
			.take_events()
			.ok_or_else(|| tabscope_runtime::Error::ProtocolError("event queue already taken".to_string()))?;

		let runner = Arc::clone(&connection);
		tokio::spawn(async move { runner.run().await });

		let version: GetVersionResult = command(&connection, methods::GET_VERSION, json!({})).await?;
		info!(protocol = %version.protocol_version, product = %version.product, "connected to browser");

		let _: Value = command(&connection, methods::SET_DISCOVER_TARGETS, json!({ "discover": true })).await?;

		let host = Arc::new(Self {
			connection,
			sessions: Mutex::new(HashMap::new()),
			surfaces: Mutex::new(HashSet::new()),
			protocol_version: version.protocol_version,
			product: version.product,
		});
		Ok((host, events))
	}

	pub fn protocol_version(&self) -> &str {
		&self.protocol_version
	}

	pub fn product(&self) -> &str {
		&self.product
	}

	pub fn is_closed(&self) -> bool {
		self.connection.is_closed()
	}

	/// Inspectable page targets, excluding our own inspection windows.
	pub async fn targets(&self) -> Result<Vec<TargetInfo>> {
		let result: GetTargetsResult = command(&self.connection, methods::GET_TARGETS, json!({})).await?;
		let surfaces = self.surfaces.lock();
		Ok(result
			.target_infos
			.into_iter()
			.filter(|info| info.is_page() && !surfaces.contains(&info.target_id))
			.collect())
	}

	/// Converts a raw connection event into a host signal. Events of unknown
	/// sessions and unrelated browser events yield `None`.
	pub fn route(&self, event: Event) -> Option<HostSignal> {
		if let Some(session_id) = &event.session_id {
			let target = self.target_of(session_id);
			if target.is_none() {
				debug!(session = %session_id, method = %event.method, "event for unknown session");
			}
			return target.map(|target| HostSignal::Protocol {
				target,
				method: event.method,
				params: event.params,
			});
		}

		match event.method.as_str() {
			methods::DETACHED_FROM_TARGET => {
				let detached: DetachedFromTarget = decode(&event.method, event.params)?;
				let mut sessions = self.sessions.lock();
				let target = sessions
					.iter()
					.find(|(_, session)| **session == detached.session_id)
					.map(|(target, _)| target.clone())?;
				sessions.remove(&target);
				Some(HostSignal::RemoteDetach(target))
			}
			methods::TARGET_DESTROYED => {
				let destroyed: TargetDestroyed = decode(&event.method, event.params)?;
				if self.surfaces.lock().remove(&destroyed.target_id) {
					Some(HostSignal::SurfaceClosed(SurfaceId::new(destroyed.target_id.as_str())))
				} else {
					None
				}
			}
			_ => None,
		}
	}

	fn target_of(&self, session_id: &SessionId) -> Option<TargetId> {
		self.sessions
			.lock()
			.iter()
			.find(|(_, session)| *session == session_id)
			.map(|(target, _)| target.clone())
	}
}

#[async_trait]
impl DebuggerHost for CdpHost {
	async fn attach(&self, target: &TargetId, version: &str) -> std::result::Result<(), AttachFailure> {
		if self.protocol_version != version {
			return Err(AttachFailure::Failed(Error::UnsupportedProtocol {
				expected: version.to_string(),
				actual: self.protocol_version.clone(),
			}));
		}
		if self.sessions.lock().contains_key(target) {
			return Ok(());
		}

		let params = json!({ "targetId": target, "flatten": true });
		let result = match self.connection.send_command(methods::ATTACH_TO_TARGET, params, None).await {
			Ok(result) => result,
			Err(err) => {
				let message = err.remote_message().unwrap_or_default().to_string();
				let lowered = message.to_ascii_lowercase();
				if CONFLICT_MARKERS.iter().any(|marker| lowered.contains(marker)) {
					return Err(AttachFailure::Conflict(message));
				}
				return Err(AttachFailure::Failed(Error::Attach {
					target: target.clone(),
					source: err,
				}));
			}
		};

		let attached: AttachToTargetResult =
			serde_json::from_value(result).map_err(|e| Error::payload(methods::ATTACH_TO_TARGET, e))?;
		debug!(target_id = %target, session = %attached.session_id, "flat session attached");
		self.sessions.lock().insert(target.clone(), attached.session_id);
		Ok(())
	}

	async fn detach(&self, target: &TargetId) -> Result<()> {
		let Some(session_id) = self.sessions.lock().remove(target) else {
			return Ok(());
		};
		let _: Value = command(&self.connection, methods::DETACH_FROM_TARGET, json!({ "sessionId": session_id })).await?;
		Ok(())
	}

	async fn send(&self, target: &TargetId, method: &str, params: Value) -> Result<Value> {
		let session_id = self
			.sessions
			.lock()
			.get(target)
			.cloned()
			.ok_or_else(|| Error::NotAttached(target.clone()))?;
		Ok(self.connection.send_command(method, params, Some(&session_id)).await?)
	}
}

#[async_trait]
impl SurfaceHost for CdpHost {
	async fn open_surface(&self, target: &TargetId, spec: &SurfaceSpec) -> Result<SurfaceId> {
		let params = json!({
			"url": spec.url,
			"newWindow": true,
			"width": spec.width,
			"height": spec.height,
		});
		let created: CreateTargetResult = command(&self.connection, methods::CREATE_TARGET, params).await?;
		debug!(target_id = %target, surface = %created.target_id, "inspection window opened");
		let surface = SurfaceId::new(created.target_id.as_str());
		self.surfaces.lock().insert(created.target_id);
		Ok(surface)
	}

	async fn close_surface(&self, surface: &SurfaceId) -> Result<()> {
		let target = TargetId::from(surface.as_str());
		if !self.surfaces.lock().remove(&target) {
			return Ok(());
		}
		let _: Value = command(&self.connection, methods::CLOSE_TARGET, json!({ "targetId": target })).await?;
		Ok(())
	}
}

async fn command<T: DeserializeOwned>(connection: &Connection, method: &str, params: Value) -> Result<T> {
	let result = connection.send_command(method, params, None).await?;
	serde_json::from_value(result).map_err(|e| Error::payload(method, e))
}

fn decode<T: DeserializeOwned>(method: &str, params: Value) -> Option<T> {
	match serde_json::from_value(params) {
		Ok(value) => Some(value),
		Err(err) => {
			warn!(method, error = %err, "undecodable target event");
			None
		}
	}
}
