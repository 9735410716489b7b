//! Shell reproduction of a recorded request.

use std::collections::BTreeMap;

use tabscope_protocol::Headers;

use super::record::ExchangeRecord;

/// Builds a `curl` command reproducing `record`.
///
/// Request headers are merged with `supplementary` (the raw headers learned out
/// of band), which win on a case-insensitive key collision. Pseudo-headers are
/// dropped except `:authority`, which becomes `host` unless a literal host
/// header exists. Headers are emitted sorted by lowercase name.
pub fn curl_command(record: &ExchangeRecord, supplementary: Option<&Headers>) -> String {
	let mut merged: BTreeMap<String, (String, String)> = BTreeMap::new();
	let mut authority = None;

	let sources = std::iter::once(&record.request_headers).chain(supplementary);
	for headers in sources {
		for (name, value) in headers.iter() {
			if let Some(pseudo) = name.strip_prefix(':') {
				if pseudo.eq_ignore_ascii_case("authority") {
					authority = Some(value.to_string());
				}
				continue;
			}
			merged.insert(name.to_ascii_lowercase(), (name.to_string(), value.to_string()));
		}
	}

	if let Some(authority) = authority {
		merged
			.entry("host".to_string())
			.or_insert_with(|| ("host".to_string(), authority));
	}

	let mut command = format!("curl {}", shell_quote(&record.url));
	command.push_str(&format!(" \\\n  -X {}", shell_quote(&record.method)));

	for (name, value) in merged.values() {
		command.push_str(&format!(" \\\n  -H {}", shell_quote(&format!("{name}: {value}"))));
	}

	if let Some(body) = &record.post_data {
		command.push_str(&format!(" \\\n  --data-raw {}", shell_quote(body)));
	}

	command.push_str(" \\\n  --compressed");
	command
}

/// Wraps `text` in single quotes, escaping embedded quotes as `'\''`.
fn shell_quote(text: &str) -> String {
	format!("'{}'", text.replace('\'', r"'\''"))
}
