//! Response body presentation.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use tabscope_protocol::network::GetResponseBodyResult;

/// A fetched response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ResponseBody {
	/// Textual body; JSON bodies are pretty-printed when they parse.
	Text { text: String },
	/// Body delivered base64 encoded by the browser.
	Binary {
		base64: String,
		/// Decoded length, when the payload decodes.
		len: Option<usize>,
	},
}

impl ResponseBody {
	pub fn from_protocol(result: GetResponseBodyResult, mime_type: Option<&str>) -> Self {
		if result.base64_encoded {
			let len = STANDARD.decode(result.body.as_bytes()).ok().map(|bytes| bytes.len());
			return ResponseBody::Binary {
				base64: result.body,
				len,
			};
		}

		let is_json = mime_type.is_some_and(|mime| mime.to_ascii_lowercase().contains("json"));
		let text = if is_json {
			pretty_json(&result.body).unwrap_or(result.body)
		} else {
			result.body
		};
		ResponseBody::Text { text }
	}

	/// Raw bytes of the body, decoding base64 payloads.
	pub fn bytes(&self) -> Option<Vec<u8>> {
		match self {
			ResponseBody::Text { text } => Some(text.clone().into_bytes()),
			ResponseBody::Binary { base64, .. } => STANDARD.decode(base64.as_bytes()).ok(),
		}
	}
}

fn pretty_json(raw: &str) -> Option<String> {
	let value: serde_json::Value = serde_json::from_str(raw).ok()?;
	serde_json::to_string_pretty(&value).ok()
}
