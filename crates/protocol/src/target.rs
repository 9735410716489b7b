//! `Target` domain payloads: discovery, attachment and window lifecycle.

use serde::{Deserialize, Serialize};

use crate::{SessionId, TargetId};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
	pub target_id: TargetId,
	#[serde(rename = "type")]
	pub target_type: String,
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub url: String,
	#[serde(default)]
	pub attached: bool,
}

impl TargetInfo {
	pub fn is_page(&self) -> bool {
		self.target_type == "page"
	}
}

/// Result of `Target.getTargets`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTargetsResult {
	#[serde(default)]
	pub target_infos: Vec<TargetInfo>,
}

/// Result of `Target.attachToTarget`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachToTargetResult {
	pub session_id: SessionId,
}

/// Result of `Target.createTarget`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTargetResult {
	pub target_id: TargetId,
}

/// `Target.detachedFromTarget`: the flat session was torn down, possibly by another client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetachedFromTarget {
	pub session_id: SessionId,
	#[serde(default)]
	pub target_id: Option<TargetId>,
}

/// `Target.targetDestroyed`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetDestroyed {
	pub target_id: TargetId,
}
