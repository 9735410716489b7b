//! Per-session inspection state: command channel, network ledger and resource
//! index for one attached target.


use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tabscope_protocol::debugger::ScriptParsed;
use tabscope_protocol::page::FrameNavigated;
use tabscope_protocol::{RequestId, TargetId, methods};
use tracing::{debug, info, warn};

use crate::channel::CommandChannel;
use crate::error::{Error, Result};
use crate::host::Host;
use crate::network::{LedgerChanges, NetworkLedger, ResponseBody, TypeFilter};
use crate::options::InspectorOptions;
use crate::resources::{ContentLocator, ResourceContent, ResourceIndex};
use crate::storage::{self, StorageArea, StorageEntry};

#[derive(Debug)]
pub struct Inspection {
	channel: CommandChannel,
	ledger: Mutex<NetworkLedger>,
	resources: Mutex<ResourceIndex>,
}

impl Inspection {
	pub fn new(host: Arc<dyn Host>, target: TargetId, options: &InspectorOptions) -> Self {
		let own_origins = options.effective_own_origins();
		let mut ledger = NetworkLedger::new(own_origins.clone());
		ledger.set_preserve_log(options.preserve_log);
		ledger.set_hide_own_traffic(options.hide_own_traffic);
		ledger.take_changes();

		Self {
			channel: CommandChannel::new(host, target),
			ledger: Mutex::new(ledger),
			resources: Mutex::new(ResourceIndex::new(own_origins)),
		}
	}

	pub fn target(&self) -> &TargetId {
		self.channel.target()
	}

	pub fn channel(&self) -> &CommandChannel {
		&self.channel
	}

	pub(crate) fn close(&self) {
		self.channel.close();
	}

	pub async fn enable_domains(&self) -> Result<()> {
		self.channel.enable_domains().await
	}

	/// Seeds the resource index from a `Page.getResourceTree` snapshot.
	pub async fn load_resources(&self) -> Result<usize> {
		let tree = self.channel.resource_tree().await?;
		let added = self.resources.lock().insert_frame_tree(&tree);
		info!(target_id = %self.target(), added, "loaded resource tree");
		Ok(added)
	}

	/// Routes one protocol event of this target.
	pub fn handle_event(&self, method: &str, params: Value) {
		if method.starts_with("Network.") {
			if let Err(err) = self.ledger.lock().handle_event(method, params) {
				warn!(target_id = %self.target(), error = %err, "dropping network event");
			}
			return;
		}

		match method {
			methods::SCRIPT_PARSED => match serde_json::from_value::<ScriptParsed>(params) {
				Ok(script) => {
					let locator = ContentLocator::Script {
						script_id: script.script_id,
					};
					if let Err(err) = self.resources.lock().insert(&script.url, locator) {
						warn!(target_id = %self.target(), error = %err, "dropping script url");
					}
				}
				Err(err) => warn!(method, error = %err, "undecodable event"),
			},
			methods::FRAME_NAVIGATED => match serde_json::from_value::<FrameNavigated>(params) {
				Ok(FrameNavigated { frame }) => {
					let locator = ContentLocator::FrameResource {
						frame_id: frame.id.clone(),
						url: frame.url.clone(),
					};
					if let Err(err) = self.resources.lock().insert(&frame.url, locator) {
						warn!(target_id = %self.target(), error = %err, "dropping frame url");
					}
					if frame.is_main() && self.ledger.lock().on_navigation() {
						debug!(target_id = %self.target(), url = %frame.url, "navigation cleared ledger");
					}
				}
				Err(err) => warn!(method, error = %err, "undecodable event"),
			},
			_ => debug!(method, "ignoring event"),
		}
	}

	/// Fetches a response body on demand. Failures are reported as
	/// [`Error::ContentUnavailable`], never as an empty body.
	pub async fn response_body(&self, id: &RequestId) -> Result<ResponseBody> {
		let mime_type = {
			let ledger = self.ledger.lock();
			let record = ledger.get(id).ok_or_else(|| Error::UnknownExchange(id.clone()))?;
			record.mime_type.clone()
		};

		let result = self
			.channel
			.response_body(id)
			.await
			.map_err(|err| unavailable(id.as_str(), err))?;
		Ok(ResponseBody::from_protocol(result, mime_type.as_deref()))
	}

	/// Fetches the content of an indexed file.
	pub async fn file_content(&self, url: &str) -> Result<ResourceContent> {
		let locator = self
			.resources
			.lock()
			.locator(url)
			.cloned()
			.ok_or_else(|| Error::UnknownResource(url.to_string()))?;

		match locator {
			ContentLocator::Script { script_id } => {
				let text = self
					.channel
					.script_source(&script_id)
					.await
					.map_err(|err| unavailable(url, err))?;
				Ok(ResourceContent {
					text,
					base64_encoded: false,
				})
			}
			ContentLocator::FrameResource { frame_id, url: resource_url } => {
				let result = self
					.channel
					.resource_content(&frame_id, &resource_url)
					.await
					.map_err(|err| unavailable(url, err))?;
				Ok(ResourceContent {
					text: result.content,
					base64_encoded: result.base64_encoded,
				})
			}
		}
	}

	pub fn curl_command(&self, id: &RequestId) -> Result<String> {
		self.ledger.lock().curl_command(id)
	}

	/// Read access to the ledger. The lock is held for the duration of `f`.
	pub fn read_ledger<R>(&self, f: impl FnOnce(&NetworkLedger) -> R) -> R {
		f(&self.ledger.lock())
	}

	/// Read access to the resource index. The lock is held for the duration of `f`.
	pub fn read_resources<R>(&self, f: impl FnOnce(&ResourceIndex) -> R) -> R {
		f(&self.resources.lock())
	}

	pub fn clear_ledger(&self) {
		self.ledger.lock().clear();
	}

	pub fn set_filter(&self, filter: TypeFilter) {
		self.ledger.lock().set_filter(filter);
	}

	pub fn set_preserve_log(&self, preserve: bool) {
		self.ledger.lock().set_preserve_log(preserve);
	}

	pub fn set_hide_own_traffic(&self, hide: bool) {
		self.ledger.lock().set_hide_own_traffic(hide);
	}

	pub fn toggle_expanded(&self, path: &str) -> Option<bool> {
		self.resources.lock().toggle_expanded(path)
	}

	pub fn take_ledger_changes(&self) -> LedgerChanges {
		self.ledger.lock().take_changes()
	}

	/// Frame tick for the resource view.
	pub fn take_render(&self) -> bool {
		self.resources.lock().take_render()
	}

	pub async fn storage_list(&self, area: StorageArea) -> Result<Vec<StorageEntry>> {
		storage::list(&self.channel, area).await
	}

	pub async fn storage_delete(&self, area: StorageArea, key: &str) -> Result<()> {
		storage::delete(&self.channel, area, key).await
	}

	pub async fn storage_clear(&self, area: StorageArea) -> Result<()> {
		storage::clear(&self.channel, area).await
	}
}

fn unavailable(subject: &str, err: Error) -> Error {
	Error::ContentUnavailable {
		subject: subject.to_string(),
		reason: err.remote_message().map(str::to_string).unwrap_or_else(|| err.to_string()),
	}
}
