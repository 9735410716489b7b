//! Network ledger: folds `Network.*` lifecycle events into exchange records.
//!
//! Events for one exchange may arrive interleaved with other exchanges and, for
//! supplementary headers, before the exchange itself. Correctness comes from the
//! phase order on each record rather than from buffering:
//!
//! | Event | Phase | Effect |
//! |---|---|---|
//! | `requestWillBeSent` | Initiated | create record (or record a redirect hop) |
//! | `requestWillBeSentExtraInfo` | - | side map, used only for the reproduction command |
//! | `responseReceived` | Responded | status, mime, response headers, type refinement |
//! | `loadingFinished` | Finished | size, duration, `Pending` defaults to 200 |
//! | `loadingFailed` | Failed | status `Failed`, error text |
//!
//! An event whose phase is not later than the record's current phase only fills
//! fields that are still unset, so a late or replayed event can never move a
//! record backwards. Later-phase events for unknown ids are dropped.

#[cfg(test)]
mod tests;

mod body;
mod curl;
mod format;
mod record;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use indexmap::{IndexMap, IndexSet};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tabscope_protocol::methods;
use tabscope_protocol::network::{
	LoadingFailed, LoadingFinished, RequestWillBeSent, RequestWillBeSentExtraInfo, ResponseReceived,
};
use tabscope_protocol::{Headers, RequestId};
use tracing::debug;

pub use body::ResponseBody;
pub use curl::curl_command;
pub use format::{format_bytes, format_duration};
pub use record::{ExchangeRecord, Phase, RedirectHop, ResourceType, Status, display_name};

use crate::error::{Error, Result};
use crate::options::OwnOrigins;

/// Category filter for the visible view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
	#[default]
	All,
	Only(ResourceType),
}

impl TypeFilter {
	/// The `Fetch` filter also admits XHR.
	pub fn admits(self, resource_type: ResourceType) -> bool {
		match self {
			TypeFilter::All => true,
			TypeFilter::Only(wanted) => {
				wanted == resource_type || (wanted == ResourceType::Fetch && resource_type == ResourceType::Xhr)
			}
		}
	}
}

impl FromStr for TypeFilter {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		if s.eq_ignore_ascii_case("all") {
			Ok(TypeFilter::All)
		} else {
			s.parse().map(TypeFilter::Only)
		}
	}
}

impl fmt::Display for TypeFilter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TypeFilter::All => f.write_str("all"),
			TypeFilter::Only(kind) => write!(f, "{kind}"),
		}
	}
}

/// What changed since the last [`NetworkLedger::take_changes`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerChanges {
	/// The whole view must be rebuilt (clear, navigation or toggle change).
	pub reset: bool,
	/// Records touched since the last take, in first-touch order.
	pub touched: Vec<RequestId>,
}

impl LedgerChanges {
	pub fn is_empty(&self) -> bool {
		!self.reset && self.touched.is_empty()
	}
}

/// Exchange records for one inspected target.
#[derive(Debug)]
pub struct NetworkLedger {
	records: IndexMap<RequestId, ExchangeRecord>,
	supplementary: HashMap<RequestId, Headers>,
	next_sequence: u64,
	filter: TypeFilter,
	preserve_log: bool,
	hide_own_traffic: bool,
	own_origins: OwnOrigins,
	reset: bool,
	touched: IndexSet<RequestId>,
}

impl Default for NetworkLedger {
	fn default() -> Self {
		Self::new(OwnOrigins::default())
	}
}

impl NetworkLedger {
	pub fn new(own_origins: OwnOrigins) -> Self {
		Self {
			records: IndexMap::new(),
			supplementary: HashMap::new(),
			next_sequence: 0,
			filter: TypeFilter::All,
			preserve_log: false,
			hide_own_traffic: false,
			own_origins,
			reset: false,
			touched: IndexSet::new(),
		}
	}

	/// Decodes and applies a `Network.*` event. Unknown methods are ignored.
	pub fn handle_event(&mut self, method: &str, params: Value) -> Result<()> {
		match method {
			methods::REQUEST_WILL_BE_SENT => self.on_request_will_be_sent(decode(method, params)?),
			methods::REQUEST_WILL_BE_SENT_EXTRA_INFO => self.on_extra_info(decode(method, params)?),
			methods::RESPONSE_RECEIVED => self.on_response_received(decode(method, params)?),
			methods::LOADING_FINISHED => self.on_loading_finished(decode(method, params)?),
			methods::LOADING_FAILED => self.on_loading_failed(decode(method, params)?),
			_ => debug!(method, "ignoring network event"),
		}
		Ok(())
	}

	pub fn on_request_will_be_sent(&mut self, event: RequestWillBeSent) {
		let id = event.request_id.clone();

		if let Some(record) = self.records.get_mut(&id) {
			// Same id again: either a redirect hop or a replay.
			match event.redirect_response {
				Some(redirect) if record.phase < Phase::Finished => {
					record.redirects.push(RedirectHop {
						url: std::mem::take(&mut record.url),
						method: record.method.clone(),
						status: redirect.status,
					});
					record.name = display_name(&event.request.url);
					record.url = event.request.url;
					record.method = event.request.method;
					record.request_headers = event.request.headers;
					record.post_data = event.request.post_data;
					self.touched.insert(id);
				}
				_ => debug!(request_id = %id, "duplicate requestWillBeSent ignored"),
			}
			return;
		}

		let sequence = self.next_sequence;
		self.next_sequence += 1;

		let record = ExchangeRecord {
			id: id.clone(),
			sequence,
			name: display_name(&event.request.url),
			url: event.request.url,
			method: event.request.method,
			resource_type: event
				.resource_type
				.as_deref()
				.map(ResourceType::from_protocol)
				.unwrap_or(ResourceType::Other),
			status: Status::Pending,
			mime_type: None,
			encoded_size: None,
			start: event.timestamp,
			wall_time: event.wall_time,
			duration_ms: None,
			request_headers: event.request.headers,
			response_headers: None,
			post_data: event.request.post_data,
			error_text: None,
			redirects: Vec::new(),
			phase: Phase::Initiated,
		};
		self.records.insert(id.clone(), record);
		self.touched.insert(id);
	}

	/// Stored even when the exchange is not known yet; the protocol may emit
	/// these before `requestWillBeSent`.
	pub fn on_extra_info(&mut self, event: RequestWillBeSentExtraInfo) {
		let entry = self.supplementary.entry(event.request_id).or_default();
		for (name, value) in event.headers.iter() {
			entry.insert(name, value);
		}
	}

	pub fn on_response_received(&mut self, event: ResponseReceived) {
		let Some(record) = self.records.get_mut(&event.request_id) else {
			debug!(request_id = %event.request_id, "response for unknown exchange dropped");
			return;
		};
		let response = event.response;
		let advance = record.phase < Phase::Responded;

		if advance || record.status == Status::Pending {
			record.status = Status::Code(response.status);
		}
		if advance || record.mime_type.is_none() {
			record.mime_type = Some(response.mime_type.clone());
		}
		if advance || record.response_headers.is_none() {
			record.response_headers = Some(response.headers);
		}
		if record.resource_type == ResourceType::Other {
			record.resource_type = ResourceType::from_mime(&response.mime_type);
		}
		if advance {
			record.phase = Phase::Responded;
		}
		self.touched.insert(event.request_id);
	}

	pub fn on_loading_finished(&mut self, event: LoadingFinished) {
		let Some(record) = self.records.get_mut(&event.request_id) else {
			debug!(request_id = %event.request_id, "finish for unknown exchange dropped");
			return;
		};
		if record.phase == Phase::Finished {
			debug!(request_id = %event.request_id, "duplicate loadingFinished ignored");
			return;
		}
		let advance = record.phase < Phase::Finished;

		if advance || record.encoded_size.is_none() {
			record.encoded_size = Some(event.encoded_data_length.max(0.0).round() as u64);
		}
		if advance || record.duration_ms.is_none() {
			record.duration_ms = Some(elapsed_ms(record.start, event.timestamp));
		}
		if record.status == Status::Pending {
			record.status = Status::Code(200);
		}
		if advance {
			record.phase = Phase::Finished;
		}
		self.touched.insert(event.request_id);
	}

	pub fn on_loading_failed(&mut self, event: LoadingFailed) {
		let Some(record) = self.records.get_mut(&event.request_id) else {
			debug!(request_id = %event.request_id, "failure for unknown exchange dropped");
			return;
		};

		if record.phase < Phase::Failed {
			record.status = Status::Failed;
			record.error_text = Some(event.error_text);
			record.phase = Phase::Failed;
		} else if record.error_text.is_none() {
			record.error_text = Some(event.error_text);
		}
		if record.duration_ms.is_none() {
			record.duration_ms = Some(elapsed_ms(record.start, event.timestamp));
		}
		self.touched.insert(event.request_id);
	}

	/// Top-level navigation committed. Clears unless preserve-log is on;
	/// returns whether it cleared.
	pub fn on_navigation(&mut self) -> bool {
		if self.preserve_log {
			return false;
		}
		self.clear();
		true
	}

	/// Discards every record and the supplementary headers.
	pub fn clear(&mut self) {
		self.records.clear();
		self.supplementary.clear();
		self.touched.clear();
		self.reset = true;
	}

	pub fn get(&self, id: &RequestId) -> Option<&ExchangeRecord> {
		self.records.get(id)
	}

	pub fn supplementary_headers(&self, id: &RequestId) -> Option<&Headers> {
		self.supplementary.get(id)
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// All records ordered by start time, then arrival.
	pub fn records(&self) -> Vec<&ExchangeRecord> {
		let mut records: Vec<_> = self.records.values().collect();
		records.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.sequence.cmp(&b.sequence)));
		records
	}

	/// Records passing the category filter and the own-traffic toggle, in view order.
	pub fn visible(&self) -> Vec<&ExchangeRecord> {
		self.records().into_iter().filter(|record| self.is_visible(record)).collect()
	}

	pub fn is_visible(&self, record: &ExchangeRecord) -> bool {
		self.filter.admits(record.resource_type) && !(self.hide_own_traffic && self.own_origins.matches(&record.url))
	}

	pub fn curl_command(&self, id: &RequestId) -> Result<String> {
		let record = self.get(id).ok_or_else(|| Error::UnknownExchange(id.clone()))?;
		Ok(curl_command(record, self.supplementary_headers(id)))
	}

	pub fn filter(&self) -> TypeFilter {
		self.filter
	}

	pub fn set_filter(&mut self, filter: TypeFilter) {
		if self.filter != filter {
			self.filter = filter;
			self.reset = true;
		}
	}

	pub fn preserve_log(&self) -> bool {
		self.preserve_log
	}

	pub fn set_preserve_log(&mut self, preserve: bool) {
		self.preserve_log = preserve;
	}

	pub fn hide_own_traffic(&self) -> bool {
		self.hide_own_traffic
	}

	/// Only affects visibility; stored records are untouched.
	pub fn set_hide_own_traffic(&mut self, hide: bool) {
		if self.hide_own_traffic != hide {
			self.hide_own_traffic = hide;
			self.reset = true;
		}
	}

	pub fn take_changes(&mut self) -> LedgerChanges {
		LedgerChanges {
			reset: std::mem::take(&mut self.reset),
			touched: std::mem::take(&mut self.touched).into_iter().collect(),
		}
	}
}

fn decode<T: DeserializeOwned>(method: &str, params: Value) -> Result<T> {
	serde_json::from_value(params).map_err(|e| Error::payload(method, e))
}

/// Whole milliseconds between two protocol timestamps (seconds), never negative.
fn elapsed_ms(start: f64, end: f64) -> u64 {
	((end - start) * 1000.0).round().max(0.0) as u64
}
