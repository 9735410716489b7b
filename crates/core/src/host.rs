//! Seams between the inspector and the browser.
//!
//! [`DebuggerHost`] owns debugging connections to targets; [`SurfaceHost`] owns
//! the windows an operator watches. [`CdpHost`](crate::CdpHost) implements both
//! over one DevTools connection, tests substitute an in-memory host.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use tabscope_protocol::TargetId;

use crate::error::{Error, Result};

/// Opaque identifier of a presentation surface (an inspection window).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SurfaceId(String);

impl SurfaceId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for SurfaceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Creation parameters for a presentation surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceSpec {
	pub url: String,
	pub width: u32,
	pub height: u32,
}

/// Why an attach did not succeed.
#[derive(Debug)]
pub enum AttachFailure {
	/// The target is already held by another controller.
	Conflict(String),
	Failed(Error),
}

impl From<Error> for AttachFailure {
	fn from(err: Error) -> Self {
		AttachFailure::Failed(err)
	}
}

#[async_trait]
pub trait DebuggerHost: Send + Sync + 'static {
	/// Opens a debugging connection to `target` at protocol `version`.
	async fn attach(&self, target: &TargetId, version: &str) -> std::result::Result<(), AttachFailure>;

	/// Drops the debugging connection. Detaching an unattached target is a no-op.
	async fn detach(&self, target: &TargetId) -> Result<()>;

	/// Issues a protocol command on the target's connection.
	async fn send(&self, target: &TargetId, method: &str, params: Value) -> Result<Value>;
}

#[async_trait]
pub trait SurfaceHost: Send + Sync + 'static {
	async fn open_surface(&self, target: &TargetId, spec: &SurfaceSpec) -> Result<SurfaceId>;

	/// Closing an already closed surface is a no-op.
	async fn close_surface(&self, surface: &SurfaceId) -> Result<()>;
}

/// Both halves together; this is what the registry holds.
pub trait Host: DebuggerHost + SurfaceHost {}

impl<T: DebuggerHost + SurfaceHost> Host for T {}

/// Asynchronous input from the host, fed to [`SessionRegistry::handle`](crate::SessionRegistry::handle).
#[derive(Debug, Clone)]
pub enum HostSignal {
	/// A protocol event raised by an attached target.
	Protocol {
		target: TargetId,
		method: String,
		params: Value,
	},
	/// The debugging connection was cancelled from outside.
	RemoteDetach(TargetId),
	/// The operator closed a presentation surface.
	SurfaceClosed(SurfaceId),
}
