//! Config file types.

use serde::{Deserialize, Serialize};

/// Schema version for the config file.
pub const SCHEMA_VERSION: u32 = 1;

/// Where to find the browser.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDefaults {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub host: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub port: Option<u16>,
	/// Browser-level WebSocket URL; skips `/json/version` discovery.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ws_url: Option<String>,
}

/// Inspector settings applied to every `inspect` run.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InspectorDefaults {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub preserve_log: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub hide_own_traffic: Option<bool>,
	/// Extra URL prefixes treated as the inspector's own traffic.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub own_origins: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub surface_url: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub surface_width: Option<u32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub surface_height: Option<u32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub attach_backoff_ms: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub frame_interval_ms: Option<u64>,
}

/// Durable CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
	#[serde(default)]
	pub schema: u32,
	#[serde(default)]
	pub endpoint: EndpointDefaults,
	#[serde(default)]
	pub inspector: InspectorDefaults,
}

impl CliConfig {
	/// Creates a config with current [`SCHEMA_VERSION`].
	pub fn new() -> Self {
		Self {
			schema: SCHEMA_VERSION,
			..Default::default()
		}
	}
}
