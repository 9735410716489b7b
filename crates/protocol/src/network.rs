//! `Network` domain events and command results.

use serde::{Deserialize, Serialize};

use crate::{FrameId, Headers, RequestId};

/// Request data attached to [`RequestWillBeSent`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
	pub url: String,
	pub method: String,
	#[serde(default)]
	pub headers: Headers,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub post_data: Option<String>,
}

/// Response data carried by [`ResponseReceived`] and by redirects.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
	pub url: String,
	pub status: u16,
	#[serde(default)]
	pub status_text: String,
	#[serde(default)]
	pub headers: Headers,
	#[serde(default)]
	pub mime_type: String,
	#[serde(default)]
	pub encoded_data_length: Option<f64>,
}

/// `Network.requestWillBeSent`
///
/// `timestamp` is monotonic time in seconds. When the exchange is a redirect
/// hop, `redirect_response` holds the response that caused it and the event
/// reuses the original request id.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestWillBeSent {
	pub request_id: RequestId,
	pub request: Request,
	pub timestamp: f64,
	#[serde(default)]
	pub wall_time: Option<f64>,
	/// Resource type as a protocol string (`Script`, `XHR`, `Fetch`, ...).
	#[serde(default, rename = "type")]
	pub resource_type: Option<String>,
	#[serde(default)]
	pub frame_id: Option<FrameId>,
	#[serde(default)]
	pub redirect_response: Option<Response>,
}

/// `Network.requestWillBeSentExtraInfo`: raw headers as actually sent on the wire.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestWillBeSentExtraInfo {
	pub request_id: RequestId,
	#[serde(default)]
	pub headers: Headers,
}

/// `Network.responseReceived`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseReceived {
	pub request_id: RequestId,
	pub timestamp: f64,
	#[serde(default, rename = "type")]
	pub resource_type: Option<String>,
	pub response: Response,
}

/// `Network.loadingFinished`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingFinished {
	pub request_id: RequestId,
	pub timestamp: f64,
	#[serde(default)]
	pub encoded_data_length: f64,
}

/// `Network.loadingFailed`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingFailed {
	pub request_id: RequestId,
	pub timestamp: f64,
	#[serde(default)]
	pub error_text: String,
	#[serde(default)]
	pub canceled: Option<bool>,
}

/// Result of `Network.getResponseBody`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetResponseBodyResult {
	pub body: String,
	#[serde(default)]
	pub base64_encoded: bool,
}

/// A browser cookie.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
	pub name: String,
	pub value: String,
	pub domain: String,
	pub path: String,
	/// Expiry as seconds since the epoch, `-1` for session cookies.
	#[serde(default)]
	pub expires: f64,
	#[serde(default)]
	pub http_only: bool,
	#[serde(default)]
	pub secure: bool,
	#[serde(default)]
	pub session: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub same_site: Option<String>,
}

/// Result of `Network.getCookies`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GetCookiesResult {
	#[serde(default)]
	pub cookies: Vec<Cookie>,
}
