//! `Browser` domain payloads.

use serde::{Deserialize, Serialize};

/// Result of `Browser.getVersion`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetVersionResult {
	pub protocol_version: String,
	#[serde(default)]
	pub product: String,
	#[serde(default)]
	pub user_agent: String,
}
