use std::time::Instant;

use clap::ValueEnum;
use serde_json::json;

use super::*;

#[test]
fn success_envelope() {
	let envelope = Envelope::success("targets", vec!["T1"]);

	assert!(envelope.ok);
	assert!(envelope.error.is_none());
	assert_eq!(
		serde_json::to_value(&envelope).unwrap(),
		json!({ "schemaVersion": 1, "ok": true, "command": "targets", "data": ["T1"] })
	);
}

#[test]
fn failure_envelope_carries_code() {
	let envelope: Envelope<()> = Envelope::failure(
		"inspect",
		CommandError {
			code: ErrorCode::AttachFailed,
			message: "target is already being debugged".to_string(),
			details: None,
		},
	);

	let value = serde_json::to_value(&envelope).unwrap();
	assert_eq!(value["ok"], false);
	assert_eq!(value["error"]["code"], "ATTACH_FAILED");
	assert!(value.get("data").is_none());
}

#[test]
fn target_and_duration_are_optional_fields() {
	let envelope = Envelope::success("body", json!({ "id": "R1" }))
		.for_target(&TargetId::new("9F2A11"))
		.since(Instant::now());

	let value = serde_json::to_value(&envelope).unwrap();
	assert_eq!(value["target"], "9F2A11");
	assert!(value["durationMs"].is_u64());
}

#[test]
fn error_code_display_matches_wire_name() {
	for code in [
		ErrorCode::ConnectionFailed,
		ErrorCode::TargetNotFound,
		ErrorCode::AttachFailed,
		ErrorCode::NotAttached,
		ErrorCode::ContentUnavailable,
		ErrorCode::ProtocolError,
		ErrorCode::InvalidInput,
		ErrorCode::ConfigError,
		ErrorCode::IoError,
		ErrorCode::InternalError,
	] {
		assert_eq!(json!(code), json!(code.to_string()));
	}
}

#[test]
fn format_parses_case_insensitively() {
	assert_eq!(OutputFormat::from_str("NDJSON", true).unwrap(), OutputFormat::Ndjson);
	assert!(OutputFormat::from_str("toon", true).is_err());
	assert!(!OutputFormat::Text.is_machine());
	assert!(OutputFormat::Json.is_machine());
}
