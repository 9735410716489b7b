//! Cookie and DOM storage access for the inspected page.
//!
//! Every operation re-reads the main frame from `Page.getResourceTree`, so a
//! navigation between calls is always picked up.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::json;
use tabscope_protocol::methods;
use tabscope_protocol::network::{Cookie, GetCookiesResult};
use tabscope_protocol::page::Frame;
use tabscope_protocol::storage::{GetDomStorageItemsResult, StorageId};
use tracing::debug;

use crate::channel::CommandChannel;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageArea {
	Local,
	Session,
	Cookies,
}

impl StorageArea {
	fn storage_id(self, frame: &Frame) -> StorageId {
		StorageId {
			security_origin: frame.security_origin.clone(),
			is_local_storage: self == StorageArea::Local,
		}
	}
}

impl fmt::Display for StorageArea {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			StorageArea::Local => "local",
			StorageArea::Session => "session",
			StorageArea::Cookies => "cookies",
		})
	}
}

impl FromStr for StorageArea {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"local" | "localstorage" => Ok(StorageArea::Local),
			"session" | "sessionstorage" => Ok(StorageArea::Session),
			"cookie" | "cookies" => Ok(StorageArea::Cookies),
			other => Err(format!("unknown storage area '{other}' (expected local, session or cookies)")),
		}
	}
}

/// One key/value item. `domain` and `path` are only set for cookies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageEntry {
	pub key: String,
	pub value: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub domain: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub path: Option<String>,
}

impl From<Cookie> for StorageEntry {
	fn from(cookie: Cookie) -> Self {
		Self {
			key: cookie.name,
			value: cookie.value,
			domain: Some(cookie.domain),
			path: Some(cookie.path),
		}
	}
}

async fn main_frame(channel: &CommandChannel) -> Result<Frame> {
	Ok(channel.resource_tree().await?.frame)
}

async fn cookies(channel: &CommandChannel, frame: &Frame) -> Result<Vec<Cookie>> {
	let result: GetCookiesResult = channel
		.send(methods::GET_COOKIES, json!({ "urls": [frame.url] }))
		.await?;
	Ok(result.cookies)
}

/// Lists the items of `area` for the current main frame.
pub async fn list(channel: &CommandChannel, area: StorageArea) -> Result<Vec<StorageEntry>> {
	let frame = main_frame(channel).await?;
	match area {
		StorageArea::Cookies => Ok(cookies(channel, &frame)
			.await?
			.into_iter()
			.map(StorageEntry::from)
			.collect()),
		StorageArea::Local | StorageArea::Session => {
			let result: GetDomStorageItemsResult = channel
				.send(
					methods::GET_DOM_STORAGE_ITEMS,
					json!({ "storageId": area.storage_id(&frame) }),
				)
				.await?;
			Ok(result
				.pairs()
				.map(|(key, value)| StorageEntry {
					key: key.to_string(),
					value: value.to_string(),
					domain: None,
					path: None,
				})
				.collect())
		}
	}
}

/// Deletes one item. For cookies, every cookie named `key` visible to the page is removed.
pub async fn delete(channel: &CommandChannel, area: StorageArea, key: &str) -> Result<()> {
	let frame = main_frame(channel).await?;
	match area {
		StorageArea::Cookies => {
			for cookie in cookies(channel, &frame).await?.into_iter().filter(|c| c.name == key) {
				delete_cookie(channel, &cookie).await?;
			}
			Ok(())
		}
		StorageArea::Local | StorageArea::Session => {
			channel
				.send_no_result(
					methods::REMOVE_DOM_STORAGE_ITEM,
					json!({ "storageId": area.storage_id(&frame), "key": key }),
				)
				.await
		}
	}
}

/// Removes every item of `area`. Cookies are deleted one by one as listed.
pub async fn clear(channel: &CommandChannel, area: StorageArea) -> Result<()> {
	let frame = main_frame(channel).await?;
	match area {
		StorageArea::Cookies => {
			let cookies = cookies(channel, &frame).await?;
			debug!(count = cookies.len(), "clearing cookies");
			for cookie in &cookies {
				delete_cookie(channel, cookie).await?;
			}
			Ok(())
		}
		StorageArea::Local | StorageArea::Session => {
			channel
				.send_no_result(
					methods::CLEAR_DOM_STORAGE,
					json!({ "storageId": area.storage_id(&frame) }),
				)
				.await
		}
	}
}

async fn delete_cookie(channel: &CommandChannel, cookie: &Cookie) -> Result<()> {
	channel
		.send_no_result(
			methods::DELETE_COOKIES,
			json!({ "name": cookie.name, "domain": cookie.domain, "path": cookie.path }),
		)
		.await
}
