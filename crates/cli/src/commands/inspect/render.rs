//! Text and JSON views of the ledger, the resource tree and fetched content.

use serde::Serialize;
use tabscope::{
	ExchangeRecord, NodeKind, ResourceContent, ResourceType, ResponseBody, Status, StorageEntry, TreeRow, format_bytes,
	format_duration,
};

use crate::styles;

/// One row of the network log as shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRow {
	/// 1-based position in the visible log, usable as `#n`.
	pub row: usize,
	pub id: String,
	pub method: String,
	pub name: String,
	pub url: String,
	pub resource_type: ResourceType,
	pub status: Status,
	pub size: String,
	pub duration: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

impl ExchangeRow {
	pub fn new(row: usize, record: &ExchangeRecord) -> Self {
		Self {
			row,
			id: record.id.to_string(),
			method: record.method.clone(),
			name: record.name.clone(),
			url: record.url.clone(),
			resource_type: record.resource_type,
			status: record.status,
			size: format_bytes(record.encoded_size),
			duration: format_duration(record.duration_ms),
			error: record.error_text.clone(),
		}
	}

	pub fn line(&self) -> String {
		let mut line = format!(
			"{:>4}  {}  {:<7} {:<10} {:>10} {:>10}  {}",
			self.row,
			styles::status(self.status, 7),
			self.method,
			self.resource_type.label(),
			self.size,
			self.duration,
			self.name
		);
		if let Some(error) = &self.error {
			line.push_str(&format!("  ({error})"));
		}
		line
	}
}

/// A ledger update pushed by the frame ticker.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerView {
	/// The rows replace everything shown before.
	pub reset: bool,
	pub rows: Vec<ExchangeRow>,
}

impl LedgerView {
	pub fn lines(&self) -> Vec<String> {
		let mut lines = Vec::with_capacity(self.rows.len() + 1);
		if self.reset {
			lines.push(ledger_header());
		}
		lines.extend(self.rows.iter().map(ExchangeRow::line));
		lines
	}
}

pub fn ledger_header() -> String {
	styles::heading(&format!(
		"{:>4}  {:>7}  {:<7} {:<10} {:>10} {:>10}  {}",
		"#", "Status", "Method", "Type", "Size", "Time", "Name"
	))
	.to_string()
}

/// Rows for `records` (already in view order), numbered from 1, keeping only
/// those whose id is in `only` when given.
pub fn exchange_rows(records: &[&ExchangeRecord], only: Option<&[tabscope::RequestId]>) -> Vec<ExchangeRow> {
	records
		.iter()
		.enumerate()
		.filter(|(_, record)| only.is_none_or(|ids| ids.contains(&record.id)))
		.map(|(index, record)| ExchangeRow::new(index + 1, record))
		.collect()
}

pub fn tree_lines(rows: &[TreeRow]) -> Vec<String> {
	if rows.is_empty() {
		return vec![styles::hint("(no resources)").to_string()];
	}
	rows.iter()
		.map(|row| {
			let indent = "  ".repeat(row.depth);
			match (row.kind, row.expanded) {
				(NodeKind::File, _) => format!("{indent}  {}", row.name),
				(NodeKind::Domain, Some(expanded)) => {
					format!("{indent}{} {}", marker(expanded), styles::heading(&row.name))
				}
				(_, expanded) => format!("{indent}{} {}/", marker(expanded.unwrap_or(false)), row.name),
			}
		})
		.collect()
}

fn marker(expanded: bool) -> &'static str {
	if expanded { "v" } else { ">" }
}

pub fn body_lines(body: &ResponseBody) -> Vec<String> {
	match body {
		ResponseBody::Text { text } if text.is_empty() => vec![styles::hint("(empty body)").to_string()],
		ResponseBody::Text { text } => text.lines().map(str::to_string).collect(),
		ResponseBody::Binary { len, .. } => vec![
			styles::hint(&format!("(binary body, {})", format_bytes(len.map(|n| n as u64)))).to_string(),
		],
	}
}

pub fn content_lines(content: &ResourceContent) -> Vec<String> {
	if content.base64_encoded {
		return vec![styles::hint(&format!("(base64 content, {} chars)", content.text.len())).to_string()];
	}
	if content.text.is_empty() {
		return vec![styles::hint("(empty)").to_string()];
	}
	content.text.lines().map(str::to_string).collect()
}

pub fn storage_lines(entries: &[StorageEntry]) -> Vec<String> {
	if entries.is_empty() {
		return vec![styles::hint("(no entries)").to_string()];
	}
	entries
		.iter()
		.map(|entry| match (&entry.domain, &entry.path) {
			(Some(domain), Some(path)) => format!("{}={}  [{domain}{path}]", entry.key, entry.value),
			_ => format!("{}={}", entry.key, entry.value),
		})
		.collect()
}
