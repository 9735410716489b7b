//! `Page` domain payloads: frames, navigation and the resource tree.

use serde::{Deserialize, Serialize};

use crate::FrameId;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
	pub id: FrameId,
	/// Absent for the top-level frame.
	#[serde(default)]
	pub parent_id: Option<FrameId>,
	pub url: String,
	#[serde(default)]
	pub security_origin: String,
	#[serde(default)]
	pub mime_type: String,
}

impl Frame {
	pub fn is_main(&self) -> bool {
		self.parent_id.is_none()
	}
}

/// `Page.frameNavigated`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FrameNavigated {
	pub frame: Frame,
}

/// A sub-resource loaded by a frame.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameResource {
	pub url: String,
	#[serde(rename = "type")]
	pub resource_type: String,
	#[serde(default)]
	pub mime_type: String,
	#[serde(default)]
	pub failed: Option<bool>,
	#[serde(default)]
	pub canceled: Option<bool>,
}

/// One frame with its resources and child frames.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameResourceTree {
	pub frame: Frame,
	#[serde(default)]
	pub child_frames: Vec<FrameResourceTree>,
	#[serde(default)]
	pub resources: Vec<FrameResource>,
}

/// Result of `Page.getResourceTree`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetResourceTreeResult {
	pub frame_tree: FrameResourceTree,
}

/// Result of `Page.getResourceContent`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetResourceContentResult {
	pub content: String,
	#[serde(default)]
	pub base64_encoded: bool,
}
