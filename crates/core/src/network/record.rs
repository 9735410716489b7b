//! Exchange records and the categorical values they carry.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tabscope_protocol::{Headers, RequestId};

/// Resource category of an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResourceType {
	Document,
	Stylesheet,
	Image,
	Media,
	Font,
	Script,
	#[serde(rename = "XHR")]
	Xhr,
	Fetch,
	WebSocket,
	Other,
}

impl ResourceType {
	/// Maps the protocol's `type` string. Unknown kinds become [`ResourceType::Other`].
	pub fn from_protocol(kind: &str) -> Self {
		match kind {
			"Document" => Self::Document,
			"Stylesheet" => Self::Stylesheet,
			"Image" => Self::Image,
			"Media" => Self::Media,
			"Font" => Self::Font,
			"Script" => Self::Script,
			"XHR" => Self::Xhr,
			"Fetch" => Self::Fetch,
			"WebSocket" => Self::WebSocket,
			_ => Self::Other,
		}
	}

	/// Derives a category from a mime type. First match wins.
	pub fn from_mime(mime: &str) -> Self {
		let mime = mime.to_ascii_lowercase();
		if mime.contains("javascript") || mime.contains("ecmascript") {
			Self::Script
		} else if mime.contains("html") {
			Self::Document
		} else if mime.contains("css") {
			Self::Stylesheet
		} else if mime.contains("image") {
			Self::Image
		} else if mime.contains("json") || mime.contains("xml") {
			Self::Fetch
		} else {
			Self::Other
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::Document => "Document",
			Self::Stylesheet => "Stylesheet",
			Self::Image => "Image",
			Self::Media => "Media",
			Self::Font => "Font",
			Self::Script => "Script",
			Self::Xhr => "XHR",
			Self::Fetch => "Fetch",
			Self::WebSocket => "WebSocket",
			Self::Other => "Other",
		}
	}
}

impl fmt::Display for ResourceType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

impl FromStr for ResourceType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"document" | "doc" => Ok(Self::Document),
			"stylesheet" | "css" => Ok(Self::Stylesheet),
			"image" | "img" => Ok(Self::Image),
			"media" => Ok(Self::Media),
			"font" => Ok(Self::Font),
			"script" | "js" => Ok(Self::Script),
			"xhr" => Ok(Self::Xhr),
			"fetch" | "data" => Ok(Self::Fetch),
			"websocket" | "ws" => Ok(Self::WebSocket),
			"other" => Ok(Self::Other),
			_ => Err(format!("unknown resource type: {s}")),
		}
	}
}

/// Outcome of an exchange as far as the ledger knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "code")]
pub enum Status {
	Pending,
	Code(u16),
	Failed,
}

impl Status {
	pub fn is_error(self) -> bool {
		match self {
			Status::Failed => true,
			Status::Code(code) => code >= 400,
			Status::Pending => false,
		}
	}
}

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Status::Pending => f.write_str("Pending"),
			Status::Code(code) => write!(f, "{code}"),
			Status::Failed => f.write_str("Failed"),
		}
	}
}

/// Logical lifecycle phase. Ordering is the phase order, not arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
	Initiated,
	Responded,
	Finished,
	Failed,
}

/// One hop of a redirect chain, recorded when the exchange moved on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectHop {
	pub url: String,
	pub method: String,
	pub status: u16,
}

/// A network exchange folded from its lifecycle events.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRecord {
	pub id: RequestId,
	/// Arrival order of the initiating event, used as a tie breaker.
	pub sequence: u64,
	pub url: String,
	/// Short display name (last path segment with query, or the host).
	pub name: String,
	pub method: String,
	pub resource_type: ResourceType,
	pub status: Status,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub mime_type: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub encoded_size: Option<u64>,
	/// Protocol monotonic timestamp, seconds.
	pub start: f64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub wall_time: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub duration_ms: Option<u64>,
	pub request_headers: Headers,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub response_headers: Option<Headers>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub post_data: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error_text: Option<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub redirects: Vec<RedirectHop>,
	pub phase: Phase,
}

impl ExchangeRecord {
	pub fn is_complete(&self) -> bool {
		self.phase >= Phase::Finished
	}
}

/// Display name for a URL: the last non-empty path segment plus query, falling
/// back to the host, then to the raw URL.
pub fn display_name(raw: &str) -> String {
	let Ok(parsed) = url::Url::parse(raw) else {
		return raw.to_string();
	};

	let segment = parsed
		.path_segments()
		.and_then(|mut segments| segments.rev().find(|s| !s.is_empty()))
		.map(str::to_string);

	match (segment, parsed.query()) {
		(Some(segment), Some(query)) if !query.is_empty() => format!("{segment}?{query}"),
		(Some(segment), _) => segment,
		(None, _) => parsed.host_str().map(str::to_string).unwrap_or_else(|| raw.to_string()),
	}
}
