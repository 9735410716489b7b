//! `Debugger` domain payloads.

use serde::{Deserialize, Serialize};

use crate::ScriptId;

/// `Debugger.scriptParsed`. Inline and eval'd scripts arrive with an empty `url`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptParsed {
	pub script_id: ScriptId,
	#[serde(default)]
	pub url: String,
}

/// Result of `Debugger.getScriptSource`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetScriptSourceResult {
	pub script_source: String,
}
