//! `DOMStorage` domain payloads.

use serde::{Deserialize, Serialize};

/// Addresses the local or session storage area of one origin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageId {
	pub security_origin: String,
	pub is_local_storage: bool,
}

/// Result of `DOMStorage.getDOMStorageItems`. Each entry is a `[key, value]` pair.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GetDomStorageItemsResult {
	#[serde(default)]
	pub entries: Vec<Vec<String>>,
}

impl GetDomStorageItemsResult {
	/// Entries as key/value pairs, skipping malformed ones.
	pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
		self.entries.iter().filter_map(|entry| match entry.as_slice() {
			[key, value, ..] => Some((key.as_str(), value.as_str())),
			_ => None,
		})
	}
}
