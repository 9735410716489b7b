//! In-memory host for registry and inspection tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tabscope_protocol::{TargetId, methods};
use tokio::sync::Notify;

use crate::error::{Error, Result};
use crate::host::{AttachFailure, DebuggerHost, SurfaceHost, SurfaceId, SurfaceSpec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HostCall {
	Attach(TargetId),
	Detach(TargetId),
	Send(TargetId, String),
	OpenSurface(TargetId, SurfaceSpec),
	CloseSurface(SurfaceId),
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum AttachOutcome {
	Ok,
	Conflict,
	Fail,
}

#[derive(Default)]
pub(crate) struct FakeHost {
	outcomes: Mutex<VecDeque<AttachOutcome>>,
	calls: Mutex<Vec<HostCall>>,
	params: Mutex<Vec<(String, Value)>>,
	responses: Mutex<HashMap<String, Value>>,
	failures: Mutex<HashMap<String, String>>,
	surface_fail: AtomicBool,
	attach_gate: Mutex<Option<Arc<Notify>>>,
	attached: Mutex<HashSet<TargetId>>,
	surfaces: Mutex<HashSet<SurfaceId>>,
	next_surface: AtomicU64,
}

impl FakeHost {
	pub(crate) fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	/// Queues attach outcomes; once drained, attaches succeed.
	pub(crate) fn script_attach(&self, outcomes: impl IntoIterator<Item = AttachOutcome>) {
		self.outcomes.lock().extend(outcomes);
	}

	pub(crate) fn respond(&self, method: &str, result: Value) {
		self.responses.lock().insert(method.to_string(), result);
	}

	pub(crate) fn fail(&self, method: &str, message: &str) {
		self.failures.lock().insert(method.to_string(), message.to_string());
	}

	pub(crate) fn fail_surfaces(&self) {
		self.surface_fail.store(true, Ordering::SeqCst);
	}

	/// Makes every attach wait until the returned notify fires.
	pub(crate) fn gate_attach(&self) -> Arc<Notify> {
		let gate = Arc::new(Notify::new());
		*self.attach_gate.lock() = Some(Arc::clone(&gate));
		gate
	}

	pub(crate) fn calls(&self) -> Vec<HostCall> {
		self.calls.lock().clone()
	}

	pub(crate) fn count(&self, pred: impl Fn(&HostCall) -> bool) -> usize {
		self.calls.lock().iter().filter(|call| pred(call)).count()
	}

	pub(crate) fn sent_methods(&self) -> Vec<String> {
		self.calls
			.lock()
			.iter()
			.filter_map(|call| match call {
				HostCall::Send(_, method) => Some(method.clone()),
				_ => None,
			})
			.collect()
	}

	/// Parameters of every `method` command sent so far.
	pub(crate) fn params_of(&self, method: &str) -> Vec<Value> {
		self.params
			.lock()
			.iter()
			.filter(|(m, _)| m == method)
			.map(|(_, params)| params.clone())
			.collect()
	}

	pub(crate) fn is_attached(&self, target: &TargetId) -> bool {
		self.attached.lock().contains(target)
	}

	pub(crate) fn open_surfaces(&self) -> usize {
		self.surfaces.lock().len()
	}

	/// Waits until the host has seen an attach for `target`.
	pub(crate) async fn attach_started(&self, target: &TargetId) {
		while !self.calls.lock().contains(&HostCall::Attach(target.clone())) {
			tokio::task::yield_now().await;
		}
	}

	fn record(&self, call: HostCall) {
		self.calls.lock().push(call);
	}
}

fn remote(message: &str) -> Error {
	Error::Transport(tabscope_runtime::Error::Remote {
		code: -32000,
		message: message.to_string(),
		data: None,
	})
}

#[async_trait]
impl DebuggerHost for FakeHost {
	async fn attach(&self, target: &TargetId, _version: &str) -> std::result::Result<(), AttachFailure> {
		self.record(HostCall::Attach(target.clone()));
		tokio::task::yield_now().await;

		let gate = self.attach_gate.lock().clone();
		if let Some(gate) = gate {
			gate.notified().await;
		}

		let outcome = self.outcomes.lock().pop_front().unwrap_or(AttachOutcome::Ok);
		match outcome {
			AttachOutcome::Ok => {
				self.attached.lock().insert(target.clone());
				Ok(())
			}
			AttachOutcome::Conflict => Err(AttachFailure::Conflict(
				"Another debugger is already attached".to_string(),
			)),
			AttachOutcome::Fail => Err(AttachFailure::Failed(remote("No target with given id found"))),
		}
	}

	async fn detach(&self, target: &TargetId) -> Result<()> {
		self.record(HostCall::Detach(target.clone()));
		self.attached.lock().remove(target);
		Ok(())
	}

	async fn send(&self, target: &TargetId, method: &str, params: Value) -> Result<Value> {
		self.record(HostCall::Send(target.clone(), method.to_string()));
		self.params.lock().push((method.to_string(), params));
		if !self.is_attached(target) {
			return Err(Error::NotAttached(target.clone()));
		}
		if let Some(message) = self.failures.lock().get(method) {
			return Err(remote(message));
		}
		if let Some(result) = self.responses.lock().get(method) {
			return Ok(result.clone());
		}
		Ok(match method {
			methods::GET_RESOURCE_TREE => json!({
				"frameTree": {
					"frame": {"id": "F1", "url": "https://a.test/", "securityOrigin": "https://a.test"},
					"resources": [{"url": "https://a.test/app.js", "type": "Script", "mimeType": "text/javascript"}]
				}
			}),
			_ => json!({}),
		})
	}
}

#[async_trait]
impl SurfaceHost for FakeHost {
	async fn open_surface(&self, target: &TargetId, spec: &SurfaceSpec) -> Result<SurfaceId> {
		self.record(HostCall::OpenSurface(target.clone(), spec.clone()));
		if self.surface_fail.load(Ordering::SeqCst) {
			return Err(remote("window creation refused"));
		}
		let id = SurfaceId::new(format!("surface-{}", self.next_surface.fetch_add(1, Ordering::SeqCst)));
		self.surfaces.lock().insert(id.clone());
		Ok(id)
	}

	async fn close_surface(&self, surface: &SurfaceId) -> Result<()> {
		self.record(HostCall::CloseSurface(surface.clone()));
		self.surfaces.lock().remove(surface);
		Ok(())
	}
}
