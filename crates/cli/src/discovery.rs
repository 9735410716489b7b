//! Endpoint and target discovery over the browser's HTTP debugging interface.

#[cfg(test)]
mod tests;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tabscope::{CdpHost, TargetId};
use tracing::debug;

use crate::config::Endpoint;
use crate::error::{CliError, Result};

const HTTP_TIMEOUT: Duration = Duration::from_millis(1500);

/// `/json/version` response subset.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdpVersionInfo {
	#[serde(rename = "webSocketDebuggerUrl")]
	pub web_socket_debugger_url: String,
	#[serde(rename = "Browser")]
	pub browser: Option<String>,
}

/// A page target as listed to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageTarget {
	pub id: TargetId,
	#[serde(rename = "type", default)]
	pub kind: String,
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub url: String,
}

impl PageTarget {
	pub fn is_page(&self) -> bool {
		self.kind == "page"
	}
}

fn client() -> Result<reqwest::Client> {
	reqwest::Client::builder()
		.timeout(HTTP_TIMEOUT)
		.build()
		.map_err(|e| CliError::Discovery {
			url: String::new(),
			reason: format!("failed to create HTTP client: {e}"),
		})
}

async fn get_json<T: serde::de::DeserializeOwned>(url: &str) -> Result<T> {
	let discovery = |reason: String| CliError::Discovery {
		url: url.to_string(),
		reason,
	};

	debug!(url, "discovery request");
	let response = client()?.get(url).send().await.map_err(|e| discovery(e.to_string()))?;
	if !response.status().is_success() {
		return Err(discovery(format!("unexpected status {}", response.status())));
	}
	response
		.json()
		.await
		.map_err(|e| discovery(format!("unparseable response: {e}")))
}

/// Browser-level WebSocket URL for `endpoint`.
pub async fn resolve_ws_url(endpoint: &Endpoint) -> Result<String> {
	match endpoint {
		Endpoint::WebSocket(url) => Ok(url.clone()),
		Endpoint::Discover { .. } => {
			let base = endpoint.http_base().unwrap_or_default();
			let info: CdpVersionInfo = get_json(&format!("{base}/json/version")).await?;
			debug!(browser = ?info.browser, ws = %info.web_socket_debugger_url, "discovered endpoint");
			Ok(info.web_socket_debugger_url)
		}
	}
}

/// Page targets from `/json/list`, or from `Target.getTargets` when only a
/// WebSocket URL is known.
pub async fn list_targets(endpoint: &Endpoint, host: Option<&CdpHost>) -> Result<Vec<PageTarget>> {
	if let Some(base) = endpoint.http_base() {
		let listed: Vec<PageTarget> = get_json(&format!("{base}/json/list")).await?;
		return Ok(listed.into_iter().filter(PageTarget::is_page).collect());
	}

	let Some(host) = host else {
		return Ok(Vec::new());
	};
	Ok(host
		.targets()
		.await?
		.into_iter()
		.map(|info| PageTarget {
			id: info.target_id,
			kind: info.target_type,
			title: info.title,
			url: info.url,
		})
		.collect())
}

/// Finds the target whose id equals `query` or uniquely starts with it
/// (case-insensitive).
pub fn resolve_target<'a>(targets: &'a [PageTarget], query: &str) -> Result<&'a PageTarget> {
	if let Some(exact) = targets.iter().find(|t| t.id.as_str() == query) {
		return Ok(exact);
	}

	let needle = query.to_ascii_lowercase();
	let matches: Vec<_> = if needle.is_empty() {
		Vec::new()
	} else {
		targets
			.iter()
			.filter(|t| t.id.as_str().to_ascii_lowercase().starts_with(&needle))
			.collect()
	};

	match matches.as_slice() {
		[] => Err(CliError::TargetNotFound(query.to_string())),
		[only] => Ok(*only),
		many => Err(CliError::AmbiguousTarget {
			prefix: query.to_string(),
			candidates: many.iter().map(|t| t.id.as_str()).collect::<Vec<_>>().join(", "),
		}),
	}
}
