//! Per-target command channel.
//!
//! Wraps the host's `send` for one attached target. Once closed, every command
//! fails fast with [`Error::NotAttached`] without touching the host.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tabscope_protocol::debugger::GetScriptSourceResult;
use tabscope_protocol::network::GetResponseBodyResult;
use tabscope_protocol::page::{FrameResourceTree, GetResourceContentResult, GetResourceTreeResult};
use tabscope_protocol::{FrameId, RequestId, ScriptId, TargetId, methods};
use tracing::trace;

use crate::error::{Error, Result};
use crate::host::{DebuggerHost, Host};

/// Domains enabled on every new session.
pub const ENABLED_DOMAINS: [&str; 4] = [
	methods::NETWORK_ENABLE,
	methods::PAGE_ENABLE,
	methods::DEBUGGER_ENABLE,
	methods::DOM_STORAGE_ENABLE,
];

pub struct CommandChannel {
	host: Arc<dyn Host>,
	target: TargetId,
	open: AtomicBool,
}

impl std::fmt::Debug for CommandChannel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CommandChannel")
			.field("target", &self.target)
			.field("open", &self.is_open())
			.finish()
	}
}

impl CommandChannel {
	pub fn new(host: Arc<dyn Host>, target: TargetId) -> Self {
		Self {
			host,
			target,
			open: AtomicBool::new(true),
		}
	}

	pub fn target(&self) -> &TargetId {
		&self.target
	}

	pub fn is_open(&self) -> bool {
		self.open.load(Ordering::Acquire)
	}

	/// Marks the channel closed. Commands issued afterwards fail with [`Error::NotAttached`].
	pub fn close(&self) {
		self.open.store(false, Ordering::Release);
	}

	/// Sends a raw command and returns the raw result.
	pub async fn send_raw(&self, method: &str, params: Value) -> Result<Value> {
		if !self.is_open() {
			return Err(Error::NotAttached(self.target.clone()));
		}
		trace!(target_id = %self.target, method, "command");
		self.host.send(&self.target, method, params).await
	}

	/// Sends a command and decodes its result.
	pub async fn send<P: Serialize, R: DeserializeOwned>(&self, method: &str, params: P) -> Result<R> {
		let params = serde_json::to_value(params).map_err(|e| Error::payload(method, e))?;
		let result = self.send_raw(method, params).await?;
		serde_json::from_value(result).map_err(|e| Error::payload(method, e))
	}

	/// Sends a command whose result is ignored.
	pub async fn send_no_result<P: Serialize>(&self, method: &str, params: P) -> Result<()> {
		let _: Value = self.send(method, params).await?;
		Ok(())
	}

	pub async fn enable_domains(&self) -> Result<()> {
		for method in ENABLED_DOMAINS {
			self.send_no_result(method, json!({})).await?;
		}
		Ok(())
	}

	pub async fn resource_tree(&self) -> Result<FrameResourceTree> {
		let result: GetResourceTreeResult = self.send(methods::GET_RESOURCE_TREE, json!({})).await?;
		Ok(result.frame_tree)
	}

	pub async fn response_body(&self, request_id: &RequestId) -> Result<GetResponseBodyResult> {
		self.send(methods::GET_RESPONSE_BODY, json!({ "requestId": request_id }))
			.await
	}

	pub async fn script_source(&self, script_id: &ScriptId) -> Result<String> {
		let result: GetScriptSourceResult = self
			.send(methods::GET_SCRIPT_SOURCE, json!({ "scriptId": script_id }))
			.await?;
		Ok(result.script_source)
	}

	pub async fn resource_content(&self, frame_id: &FrameId, url: &str) -> Result<GetResourceContentResult> {
		self.send(
			methods::GET_RESOURCE_CONTENT,
			json!({ "frameId": frame_id, "url": url }),
		)
		.await
	}
}
