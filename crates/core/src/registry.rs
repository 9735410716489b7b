//! Session registry: one debugging session per target.
//!
//! ```text
//!   (absent) --toggle--> Attaching --attach ok + surface ok--> Attached
//!       ^                    |                                   |
//!       |              failure/abort                   toggle / remote detach /
//!       |                    |                           surface closed
//!       +--------------------+<------------ Detaching <----------+
//! ```
//!
//! Every transition is decided under the sessions lock; the host calls that
//! follow run without it. Whoever moves a session to `Detaching` owns its
//! teardown, so concurrent detach paths never double-close a surface.


use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tabscope_protocol::TargetId;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::host::{AttachFailure, DebuggerHost, Host, HostSignal, SurfaceHost, SurfaceId};
use crate::inspection::Inspection;
use crate::options::InspectorOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
	Attaching,
	Attached,
	Detaching,
}

/// What the operator sees: whether a session exists for the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
	pub attached: bool,
}

struct Session {
	state: SessionState,
	generation: u64,
	surface: Option<SurfaceId>,
	inspection: Option<Arc<Inspection>>,
}

/// A session moved to `Detaching`; the holder runs its teardown.
struct Claimed {
	generation: u64,
	surface: Option<SurfaceId>,
}

impl Session {
	fn claim(&mut self) -> Claimed {
		self.state = SessionState::Detaching;
		if let Some(inspection) = self.inspection.take() {
			inspection.close();
		}
		Claimed {
			generation: self.generation,
			surface: self.surface.take(),
		}
	}
}

enum Plan {
	Attach(u64),
	Detach(Claimed),
	Report(bool),
}

struct RegistryInner {
	host: Arc<dyn Host>,
	options: InspectorOptions,
	sessions: Mutex<HashMap<TargetId, Session>>,
	next_generation: AtomicU64,
}

/// Owns every debugging session. Cheap to clone.
#[derive(Clone)]
pub struct SessionRegistry {
	inner: Arc<RegistryInner>,
}

impl SessionRegistry {
	pub fn new(host: Arc<dyn Host>, options: InspectorOptions) -> Self {
		Self {
			inner: Arc::new(RegistryInner {
				host,
				options,
				sessions: Mutex::new(HashMap::new()),
				next_generation: AtomicU64::new(1),
			}),
		}
	}

	pub fn options(&self) -> &InspectorOptions {
		&self.inner.options
	}

	/// Attaches when no session exists, detaches an attached one, and reports
	/// the destination of a transition already in flight without starting another.
	pub async fn toggle(&self, target: &TargetId) -> Result<SessionStatus> {
		let plan = {
			let mut sessions = self.inner.sessions.lock();
			match sessions.get_mut(target) {
				None => {
					let generation = self.inner.next_generation.fetch_add(1, Ordering::SeqCst);
					sessions.insert(
						target.clone(),
						Session {
							state: SessionState::Attaching,
							generation,
							surface: None,
							inspection: None,
						},
					);
					Plan::Attach(generation)
				}
				Some(session) => match session.state {
					SessionState::Attaching => Plan::Report(true),
					SessionState::Detaching => Plan::Report(false),
					SessionState::Attached => Plan::Detach(session.claim()),
				},
			}
		};

		match plan {
			Plan::Attach(generation) => {
				self.attach(target, generation).await?;
				Ok(SessionStatus { attached: true })
			}
			Plan::Detach(claimed) => {
				info!(target_id = %target, "detaching");
				self.detach_target(target).await;
				self.close_surface(claimed.surface.as_ref()).await;
				self.remove_if(target, claimed.generation);
				Ok(SessionStatus { attached: false })
			}
			Plan::Report(attached) => {
				debug!(target_id = %target, attached, "transition in flight, toggle ignored");
				Ok(SessionStatus { attached })
			}
		}
	}

	/// Side-effect free: true while any session exists for the target.
	pub fn status(&self, target: &TargetId) -> SessionStatus {
		SessionStatus {
			attached: self.inner.sessions.lock().contains_key(target),
		}
	}

	pub fn state(&self, target: &TargetId) -> Option<SessionState> {
		self.inner.sessions.lock().get(target).map(|session| session.state)
	}

	/// Live inspection state of an attached target.
	pub fn inspection(&self, target: &TargetId) -> Option<Arc<Inspection>> {
		self.inner
			.sessions
			.lock()
			.get(target)
			.filter(|session| session.state == SessionState::Attached)
			.and_then(|session| session.inspection.clone())
	}

	pub fn surface(&self, target: &TargetId) -> Option<SurfaceId> {
		self.inner.sessions.lock().get(target).and_then(|session| session.surface.clone())
	}

	pub fn len(&self) -> usize {
		self.inner.sessions.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.sessions.lock().is_empty()
	}

	/// Single entry point for asynchronous host input.
	pub async fn handle(&self, signal: HostSignal) {
		match signal {
			HostSignal::Protocol { target, method, params } => self.dispatch(&target, &method, params),
			HostSignal::RemoteDetach(target) => self.on_remote_detach(&target).await,
			HostSignal::SurfaceClosed(surface) => self.on_surface_closed(&surface).await,
		}
	}

	/// Routes a protocol event to the target's inspection. Events for targets
	/// without an attached session are discarded.
	pub fn dispatch(&self, target: &TargetId, method: &str, params: Value) {
		match self.inspection(target) {
			Some(inspection) => inspection.handle_event(method, params),
			None => debug!(target_id = %target, method, "discarding event for unattached target"),
		}
	}

	/// The debugging connection was cancelled from outside: close the surface and forget the session.
	pub async fn on_remote_detach(&self, target: &TargetId) {
		let claimed = {
			let mut sessions = self.inner.sessions.lock();
			let Some(session) = sessions.get_mut(target) else {
				return;
			};
			match session.state {
				SessionState::Detaching => return,
				SessionState::Attaching => {
					sessions.remove(target);
					info!(target_id = %target, "detached remotely while attaching");
					return;
				}
				SessionState::Attached => session.claim(),
			}
		};

		info!(target_id = %target, "detached remotely");
		self.close_surface(claimed.surface.as_ref()).await;
		self.remove_if(target, claimed.generation);
	}

	/// The operator closed an inspection window: detach its target and forget the session.
	pub async fn on_surface_closed(&self, surface: &SurfaceId) {
		let found = {
			let mut sessions = self.inner.sessions.lock();
			sessions
				.iter_mut()
				.find(|(_, session)| {
					session.state == SessionState::Attached && session.surface.as_ref() == Some(surface)
				})
				.map(|(target, session)| (target.clone(), session.claim()))
		};
		let Some((target, claimed)) = found else {
			return;
		};

		info!(target_id = %target, surface = %surface, "inspection window closed");
		self.detach_target(&target).await;
		self.remove_if(&target, claimed.generation);
	}

	/// Tears down every attached session and forgets in-flight ones.
	pub async fn shutdown(&self) {
		let claimed: Vec<(TargetId, Claimed)> = {
			let mut sessions = self.inner.sessions.lock();
			sessions.retain(|_, session| session.state != SessionState::Attaching);
			sessions
				.iter_mut()
				.filter(|(_, session)| session.state == SessionState::Attached)
				.map(|(target, session)| (target.clone(), session.claim()))
				.collect()
		};

		for (target, claimed) in claimed {
			self.detach_target(&target).await;
			self.close_surface(claimed.surface.as_ref()).await;
			self.remove_if(&target, claimed.generation);
		}
	}

	async fn attach(&self, target: &TargetId, generation: u64) -> Result<()> {
		let host = &self.inner.host;
		let options = &self.inner.options;
		info!(target_id = %target, "attaching");

		if let Err(err) = self.attach_with_retry(target).await {
			self.remove_if(target, generation);
			return Err(err);
		}

		if !self.is_attaching(target, generation) {
			self.detach_target(target).await;
			return Err(Error::AttachAborted(target.clone()));
		}

		let surface = match host.open_surface(target, &options.surface.for_target(target)).await {
			Ok(surface) => surface,
			Err(err) => {
				warn!(target_id = %target, error = %err, "could not open inspection window");
				self.detach_target(target).await;
				self.remove_if(target, generation);
				return Err(Error::Surface {
					target: target.clone(),
					reason: err.to_string(),
				});
			}
		};

		let inspection = Arc::new(Inspection::new(Arc::clone(host), target.clone(), options));
		let committed = {
			let mut sessions = self.inner.sessions.lock();
			match sessions.get_mut(target) {
				Some(session) if session.generation == generation && session.state == SessionState::Attaching => {
					session.state = SessionState::Attached;
					session.surface = Some(surface.clone());
					session.inspection = Some(Arc::clone(&inspection));
					true
				}
				_ => false,
			}
		};

		if !committed {
			info!(target_id = %target, "session ended while attaching, rolling back");
			inspection.close();
			self.close_surface(Some(&surface)).await;
			self.detach_target(target).await;
			return Err(Error::AttachAborted(target.clone()));
		}
		info!(target_id = %target, surface = %surface, "attached");

		if let Err(err) = inspection.enable_domains().await {
			warn!(target_id = %target, error = %err, "enabling domains failed, detaching");
			let claimed = self.claim_if(target, generation);
			if let Some(claimed) = claimed {
				self.detach_target(target).await;
				self.close_surface(claimed.surface.as_ref()).await;
				self.remove_if(target, claimed.generation);
			}
			return Err(err);
		}

		if let Err(err) = inspection.load_resources().await {
			warn!(target_id = %target, error = %err, "initial resource snapshot failed");
		}
		Ok(())
	}

	/// One attach, and on conflict a forced detach, the backoff, and exactly one retry.
	async fn attach_with_retry(&self, target: &TargetId) -> Result<()> {
		let host = &self.inner.host;
		let version = self.inner.options.protocol_version.as_str();

		match host.attach(target, version).await {
			Ok(()) => return Ok(()),
			Err(AttachFailure::Failed(err)) => {
				warn!(target_id = %target, error = %err, "attach failed");
				return Err(err);
			}
			Err(AttachFailure::Conflict(message)) => {
				debug!(target_id = %target, %message, "target held by another debugger, retrying");
			}
		}

		self.detach_target(target).await;
		tokio::time::sleep(self.inner.options.attach_backoff).await;

		match host.attach(target, version).await {
			Ok(()) => Ok(()),
			Err(AttachFailure::Conflict(message)) => {
				warn!(target_id = %target, %message, "attach abandoned after retry");
				Err(Error::AttachConflict {
					target: target.clone(),
					message,
				})
			}
			Err(AttachFailure::Failed(err)) => {
				warn!(target_id = %target, error = %err, "attach retry failed");
				Err(err)
			}
		}
	}

	fn is_attaching(&self, target: &TargetId, generation: u64) -> bool {
		self.inner
			.sessions
			.lock()
			.get(target)
			.is_some_and(|session| session.generation == generation && session.state == SessionState::Attaching)
	}

	fn claim_if(&self, target: &TargetId, generation: u64) -> Option<Claimed> {
		self.inner
			.sessions
			.lock()
			.get_mut(target)
			.filter(|session| session.generation == generation && session.state == SessionState::Attached)
			.map(Session::claim)
	}

	fn remove_if(&self, target: &TargetId, generation: u64) {
		let mut sessions = self.inner.sessions.lock();
		if sessions.get(target).is_some_and(|session| session.generation == generation) {
			sessions.remove(target);
			debug!(target_id = %target, "session removed");
		}
	}

	async fn detach_target(&self, target: &TargetId) {
		if let Err(err) = self.inner.host.detach(target).await {
			debug!(target_id = %target, error = %err, "detach failed");
		}
	}

	async fn close_surface(&self, surface: Option<&SurfaceId>) {
		let Some(surface) = surface else {
			return;
		};
		if let Err(err) = self.inner.host.close_surface(surface).await {
			debug!(surface = %surface, error = %err, "closing inspection window failed");
		}
	}
}
