//! Human-readable sizes and durations.

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Formats a byte count with 1024-based units and at most two decimals.
///
/// `None` (size not known yet) renders as `-`.
pub fn format_bytes(bytes: Option<u64>) -> String {
	let Some(bytes) = bytes else {
		return "-".to_string();
	};
	if bytes == 0 {
		return "0 B".to_string();
	}

	let mut value = bytes as f64;
	let mut unit = 0;
	while value >= 1024.0 && unit < UNITS.len() - 1 {
		value /= 1024.0;
		unit += 1;
	}

	let fixed = format!("{value:.2}");
	let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
	format!("{trimmed} {}", UNITS[unit])
}

/// `Pending` until the exchange completes.
pub fn format_duration(duration_ms: Option<u64>) -> String {
	match duration_ms {
		Some(ms) => format!("{ms} ms"),
		None => "Pending".to_string(),
	}
}
