//! Machine-readable output.
//!
//! With `--format json` or `--format ndjson` commands print envelopes on stdout:
//!
//! ```json
//! { "schemaVersion": 1, "ok": true, "command": "body", "target": "9F2A11", "data": { "id": "R1" } }
//! ```
//!
//! One-shot commands print a single envelope carrying `durationMs`. `inspect`
//! streams one envelope per directive reply and per frame update. Text output
//! is rendered by the caller and written with [`print_lines`].

#[cfg(test)]
mod tests;

use std::fmt;
use std::io::{self, Write};
use std::time::Instant;

use serde::Serialize;
use tabscope::TargetId;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
	/// Human-readable lines
	#[default]
	Text,
	/// One pretty-printed JSON envelope per reply
	Json,
	/// One compact JSON envelope per line
	Ndjson,
}

impl OutputFormat {
	pub fn is_machine(self) -> bool {
		self != OutputFormat::Text
	}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T: Serialize> {
	pub schema_version: u32,
	pub ok: bool,
	pub command: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub target: Option<TargetId>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub duration_ms: Option<u64>,
}

impl<T: Serialize> Envelope<T> {
	pub fn success(command: impl Into<String>, data: T) -> Self {
		Self {
			schema_version: SCHEMA_VERSION,
			ok: true,
			command: command.into(),
			target: None,
			data: Some(data),
			error: None,
			duration_ms: None,
		}
	}

	pub fn failure(command: impl Into<String>, error: CommandError) -> Self {
		Self {
			schema_version: SCHEMA_VERSION,
			ok: false,
			command: command.into(),
			target: None,
			data: None,
			error: Some(error),
			duration_ms: None,
		}
	}

	pub fn for_target(mut self, target: &TargetId) -> Self {
		self.target = Some(target.clone());
		self
	}

	pub fn since(mut self, start: Instant) -> Self {
		self.duration_ms = Some(start.elapsed().as_millis() as u64);
		self
	}
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Stable error codes for scripted consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	/// Browser endpoint unreachable or incompatible
	ConnectionFailed,
	TargetNotFound,
	/// Attaching or opening the inspection window failed
	AttachFailed,
	NotAttached,
	/// Body or source could not be fetched
	ContentUnavailable,
	/// Unexpected reply from the browser
	ProtocolError,
	InvalidInput,
	ConfigError,
	IoError,
	InternalError,
}

impl ErrorCode {
	pub fn as_str(self) -> &'static str {
		match self {
			ErrorCode::ConnectionFailed => "CONNECTION_FAILED",
			ErrorCode::TargetNotFound => "TARGET_NOT_FOUND",
			ErrorCode::AttachFailed => "ATTACH_FAILED",
			ErrorCode::NotAttached => "NOT_ATTACHED",
			ErrorCode::ContentUnavailable => "CONTENT_UNAVAILABLE",
			ErrorCode::ProtocolError => "PROTOCOL_ERROR",
			ErrorCode::InvalidInput => "INVALID_INPUT",
			ErrorCode::ConfigError => "CONFIG_ERROR",
			ErrorCode::IoError => "IO_ERROR",
			ErrorCode::InternalError => "INTERNAL_ERROR",
		}
	}
}

impl fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Writes `envelope` in a machine format. Text output is the caller's job.
pub fn emit<T: Serialize>(envelope: &Envelope<T>, format: OutputFormat) {
	let encoded = match format {
		OutputFormat::Text => return,
		OutputFormat::Json => serde_json::to_string_pretty(envelope),
		OutputFormat::Ndjson => serde_json::to_string(envelope),
	};
	match encoded {
		Ok(json) => {
			let mut stdout = io::stdout().lock();
			let _ = writeln!(stdout, "{json}");
			let _ = stdout.flush();
		}
		Err(err) => tracing::error!(error = %err, command = %envelope.command, "unserializable envelope"),
	}
}

pub fn print_error_stderr(error: &CommandError) {
	eprintln!("error[{}]: {}", error.code, error.message);
}

/// Writes text lines to stdout in one locked batch.
pub fn print_lines<I, S>(lines: I)
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut stdout = io::stdout().lock();
	for line in lines {
		let _ = writeln!(stdout, "{}", line.as_ref());
	}
	let _ = stdout.flush();
}
