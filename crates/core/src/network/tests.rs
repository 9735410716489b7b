use serde_json::{Value, json};
use tabscope_protocol::methods;

use super::*;

fn request(id: &str, url: &str, method: &str, timestamp: f64) -> Value {
	json!({
		"requestId": id,
		"request": {"url": url, "method": method, "headers": {"Accept": "*/*"}},
		"timestamp": timestamp,
		"wallTime": 1700000000.0
	})
}

fn response(id: &str, status: u16, mime: &str) -> Value {
	json!({
		"requestId": id,
		"timestamp": 100.02,
		"type": "Other",
		"response": {"url": "https://a.test/", "status": status, "mimeType": mime, "headers": {"content-type": mime}}
	})
}

fn finished(id: &str, length: f64, timestamp: f64) -> Value {
	json!({"requestId": id, "timestamp": timestamp, "encodedDataLength": length})
}

fn failed(id: &str, error: &str) -> Value {
	json!({"requestId": id, "timestamp": 100.5, "errorText": error})
}

fn ledger() -> NetworkLedger {
	NetworkLedger::default()
}

fn id(raw: &str) -> RequestId {
	RequestId::from(raw)
}

#[test]
fn script_exchange_folds_into_finished_record() {
	let mut ledger = ledger();
	ledger
		.handle_event(methods::REQUEST_WILL_BE_SENT, request("1", "https://a.test/x.js", "GET", 100.0))
		.unwrap();
	ledger
		.handle_event(methods::RESPONSE_RECEIVED, response("1", 200, "application/javascript"))
		.unwrap();
	ledger
		.handle_event(methods::LOADING_FINISHED, finished("1", 1200.0, 100.05))
		.unwrap();

	let record = ledger.get(&id("1")).unwrap();
	assert_eq!(record.resource_type, ResourceType::Script);
	assert_eq!(record.status, Status::Code(200));
	assert_eq!(record.name, "x.js");
	assert_eq!(format_bytes(record.encoded_size), "1.17 KB");
	assert_eq!(format_duration(record.duration_ms), "50 ms");
	assert_eq!(record.phase, Phase::Finished);
}

#[test]
fn failure_is_terminal_and_not_overwritten() {
	let mut ledger = ledger();
	ledger
		.handle_event(methods::REQUEST_WILL_BE_SENT, request("2", "https://a.test/api?x=1", "GET", 100.0))
		.unwrap();
	ledger
		.handle_event(methods::LOADING_FAILED, failed("2", "net::ERR_FAILED"))
		.unwrap();

	// Spurious late events for the same exchange.
	ledger
		.handle_event(methods::RESPONSE_RECEIVED, response("2", 200, "application/json"))
		.unwrap();
	ledger
		.handle_event(methods::LOADING_FINISHED, finished("2", 10.0, 101.0))
		.unwrap();
	ledger
		.handle_event(methods::LOADING_FAILED, failed("2", "net::ERR_ABORTED"))
		.unwrap();

	let record = ledger.get(&id("2")).unwrap();
	assert_eq!(record.status, Status::Failed);
	assert_eq!(record.status.to_string(), "Failed");
	assert_eq!(record.error_text.as_deref(), Some("net::ERR_FAILED"));
	assert_eq!(record.name, "api?x=1");
	assert_eq!(record.phase, Phase::Failed);
}

#[test]
fn duplicate_finish_is_idempotent() {
	let mut ledger = ledger();
	ledger
		.handle_event(methods::REQUEST_WILL_BE_SENT, request("3", "https://a.test/a.css", "GET", 10.0))
		.unwrap();
	ledger
		.handle_event(methods::RESPONSE_RECEIVED, response("3", 304, "text/css"))
		.unwrap();
	ledger.handle_event(methods::LOADING_FINISHED, finished("3", 500.0, 10.1)).unwrap();
	let first = ledger.get(&id("3")).unwrap().clone();

	ledger.handle_event(methods::LOADING_FINISHED, finished("3", 900.0, 12.0)).unwrap();
	let second = ledger.get(&id("3")).unwrap();

	assert_eq!(second.status, Status::Code(304));
	assert_eq!(second.encoded_size, first.encoded_size);
	assert_eq!(second.duration_ms, first.duration_ms);
	assert_eq!(second.resource_type, ResourceType::Stylesheet);
}

#[test]
fn finish_without_response_defaults_to_success() {
	let mut ledger = ledger();
	ledger
		.handle_event(methods::REQUEST_WILL_BE_SENT, request("4", "https://a.test/cached.png", "GET", 5.0))
		.unwrap();
	ledger.handle_event(methods::LOADING_FINISHED, finished("4", 0.0, 5.0)).unwrap();

	let record = ledger.get(&id("4")).unwrap();
	assert_eq!(record.status, Status::Code(200));
	assert_eq!(format_bytes(record.encoded_size), "0 B");
	assert_eq!(format_duration(record.duration_ms), "0 ms");

	// A late response cannot move the defaulted status backwards or forwards.
	ledger
		.handle_event(methods::RESPONSE_RECEIVED, response("4", 404, "image/png"))
		.unwrap();
	let record = ledger.get(&id("4")).unwrap();
	assert_eq!(record.status, Status::Code(200));
	assert_eq!(record.mime_type.as_deref(), Some("image/png"));
	assert_eq!(record.resource_type, ResourceType::Image);
}

#[test]
fn events_for_unknown_exchanges_are_dropped() {
	let mut ledger = ledger();
	ledger
		.handle_event(methods::RESPONSE_RECEIVED, response("9", 200, "text/html"))
		.unwrap();
	ledger.handle_event(methods::LOADING_FINISHED, finished("9", 1.0, 1.0)).unwrap();
	ledger.handle_event(methods::LOADING_FAILED, failed("9", "x")).unwrap();
	assert!(ledger.is_empty());
}

#[test]
fn protocol_type_is_kept_over_mime() {
	let mut ledger = ledger();
	let mut event = request("5", "https://a.test/api", "POST", 1.0);
	event["type"] = json!("XHR");
	ledger.handle_event(methods::REQUEST_WILL_BE_SENT, event).unwrap();
	ledger
		.handle_event(methods::RESPONSE_RECEIVED, response("5", 201, "text/html"))
		.unwrap();

	assert_eq!(ledger.get(&id("5")).unwrap().resource_type, ResourceType::Xhr);
}

#[test]
fn mime_precedence_table() {
	assert_eq!(ResourceType::from_mime("text/javascript"), ResourceType::Script);
	assert_eq!(ResourceType::from_mime("text/html; charset=utf-8"), ResourceType::Document);
	assert_eq!(ResourceType::from_mime("text/css"), ResourceType::Stylesheet);
	assert_eq!(ResourceType::from_mime("image/svg+xml"), ResourceType::Image);
	assert_eq!(ResourceType::from_mime("application/xhtml+xml"), ResourceType::Document);
	assert_eq!(ResourceType::from_mime("application/json"), ResourceType::Fetch);
	assert_eq!(ResourceType::from_mime("text/xml"), ResourceType::Fetch);
	assert_eq!(ResourceType::from_mime("font/woff2"), ResourceType::Other);
	assert_eq!(ResourceType::from_mime(""), ResourceType::Other);
}

#[test]
fn redirect_records_hop_and_follows_new_url() {
	let mut ledger = ledger();
	ledger
		.handle_event(methods::REQUEST_WILL_BE_SENT, request("6", "http://a.test/old", "GET", 1.0))
		.unwrap();
	let mut hop = request("6", "https://a.test/new", "GET", 1.1);
	hop["redirectResponse"] = json!({"url": "http://a.test/old", "status": 301, "mimeType": ""});
	ledger.handle_event(methods::REQUEST_WILL_BE_SENT, hop).unwrap();

	let record = ledger.get(&id("6")).unwrap();
	assert_eq!(ledger.len(), 1);
	assert_eq!(record.url, "https://a.test/new");
	assert_eq!(record.status, Status::Pending);
	assert_eq!(
		record.redirects,
		vec![RedirectHop {
			url: "http://a.test/old".to_string(),
			method: "GET".to_string(),
			status: 301,
		}]
	);
	// Start time stays with the first hop.
	assert_eq!(record.start, 1.0);
}

#[test]
fn navigation_clears_unless_preserved() {
	let mut ledger = ledger();
	ledger
		.handle_event(methods::REQUEST_WILL_BE_SENT, request("1", "https://a.test/", "GET", 1.0))
		.unwrap();

	ledger.set_preserve_log(true);
	assert!(!ledger.on_navigation());
	assert_eq!(ledger.len(), 1);

	ledger.set_preserve_log(false);
	assert!(ledger.on_navigation());
	assert!(ledger.is_empty());
	assert!(ledger.take_changes().reset);
}

#[test]
fn fetch_filter_admits_xhr() {
	let mut ledger = ledger();
	let mut xhr = request("1", "https://a.test/api", "GET", 1.0);
	xhr["type"] = json!("XHR");
	let mut fetch = request("2", "https://a.test/data", "GET", 2.0);
	fetch["type"] = json!("Fetch");
	let mut script = request("3", "https://a.test/app.js", "GET", 3.0);
	script["type"] = json!("Script");
	for event in [xhr, fetch, script] {
		ledger.handle_event(methods::REQUEST_WILL_BE_SENT, event).unwrap();
	}

	ledger.set_filter("fetch".parse().unwrap());
	let ids: Vec<_> = ledger.visible().iter().map(|r| r.id.as_str().to_string()).collect();
	assert_eq!(ids, vec!["1", "2"]);

	ledger.set_filter(TypeFilter::Only(ResourceType::Xhr));
	assert_eq!(ledger.visible().len(), 1);

	ledger.set_filter(TypeFilter::All);
	assert_eq!(ledger.visible().len(), 3);
}

#[test]
fn hide_own_traffic_only_changes_visibility() {
	let mut ledger = NetworkLedger::new(OwnOrigins::default());
	ledger
		.handle_event(methods::REQUEST_WILL_BE_SENT, request("1", "https://a.test/", "GET", 1.0))
		.unwrap();
	ledger
		.handle_event(
			methods::REQUEST_WILL_BE_SENT,
			request("2", "chrome-extension://abc/panel.js", "GET", 2.0),
		)
		.unwrap();
	let before = ledger.get(&id("2")).unwrap().clone();

	ledger.set_hide_own_traffic(true);
	let visible: Vec<_> = ledger.visible().iter().map(|r| r.id.clone()).collect();
	assert_eq!(visible, vec![id("1")]);
	assert_eq!(ledger.len(), 2);

	ledger.set_hide_own_traffic(false);
	assert_eq!(ledger.visible().len(), 2);
	let after = ledger.get(&id("2")).unwrap();
	assert_eq!(after.url, before.url);
	assert_eq!(after.status, before.status);
	assert_eq!(after.sequence, before.sequence);
}

#[test]
fn visible_order_is_start_time_then_arrival() {
	let mut ledger = ledger();
	ledger
		.handle_event(methods::REQUEST_WILL_BE_SENT, request("late", "https://a.test/b", "GET", 5.0))
		.unwrap();
	ledger
		.handle_event(methods::REQUEST_WILL_BE_SENT, request("early", "https://a.test/a", "GET", 1.0))
		.unwrap();
	ledger
		.handle_event(methods::REQUEST_WILL_BE_SENT, request("tie", "https://a.test/c", "GET", 5.0))
		.unwrap();

	let ids: Vec<_> = ledger.visible().iter().map(|r| r.id.as_str().to_string()).collect();
	assert_eq!(ids, vec!["early", "late", "tie"]);
}

#[test]
fn changes_report_touched_rows_once() {
	let mut ledger = ledger();
	ledger
		.handle_event(methods::REQUEST_WILL_BE_SENT, request("1", "https://a.test/", "GET", 1.0))
		.unwrap();
	ledger
		.handle_event(methods::RESPONSE_RECEIVED, response("1", 200, "text/html"))
		.unwrap();

	let changes = ledger.take_changes();
	assert!(!changes.reset);
	assert_eq!(changes.touched, vec![id("1")]);
	assert!(ledger.take_changes().is_empty());
}

#[test]
fn curl_merges_supplementary_headers_in_key_order() {
	let mut ledger = ledger();
	ledger
		.handle_event(
			methods::REQUEST_WILL_BE_SENT,
			json!({
				"requestId": "7",
				"request": {
					"url": "https://a.test/api",
					"method": "POST",
					"headers": {"User-Agent": "ua", "Content-Type": "application/json", "Accept": "*/*"},
					"postData": "{\"name\":\"it's\"}"
				},
				"timestamp": 1.0
			}),
		)
		.unwrap();
	ledger
		.handle_event(
			methods::REQUEST_WILL_BE_SENT_EXTRA_INFO,
			json!({
				"requestId": "7",
				"headers": {
					":authority": "a.test",
					":method": "POST",
					":path": "/api",
					"accept": "application/json",
					"cookie": "sid=1"
				}
			}),
		)
		.unwrap();

	let curl = ledger.curl_command(&id("7")).unwrap();
	let expected = [
		"curl 'https://a.test/api'",
		"  -X 'POST'",
		"  -H 'accept: application/json'",
		"  -H 'Content-Type: application/json'",
		"  -H 'cookie: sid=1'",
		"  -H 'host: a.test'",
		"  -H 'User-Agent: ua'",
		r#"  --data-raw '{"name":"it'\''s"}'"#,
		"  --compressed",
	]
	.join(" \\\n");
	assert_eq!(curl, expected);
}

#[test]
fn supplementary_headers_before_request_are_kept() {
	let mut ledger = ledger();
	ledger
		.handle_event(
			methods::REQUEST_WILL_BE_SENT_EXTRA_INFO,
			json!({"requestId": "8", "headers": {"x-early": "1"}}),
		)
		.unwrap();
	ledger
		.handle_event(methods::REQUEST_WILL_BE_SENT, request("8", "https://a.test/", "GET", 1.0))
		.unwrap();

	assert!(ledger.curl_command(&id("8")).unwrap().contains("-H 'x-early: 1'"));
	assert!(matches!(
		ledger.curl_command(&id("missing")),
		Err(Error::UnknownExchange(_))
	));
}

#[test]
fn malformed_payload_is_reported() {
	let mut ledger = ledger();
	let err = ledger
		.handle_event(methods::LOADING_FINISHED, json!({"timestamp": "soon"}))
		.unwrap_err();
	assert!(matches!(err, Error::Payload { .. }));
}

#[test]
fn byte_formatting() {
	assert_eq!(format_bytes(None), "-");
	assert_eq!(format_bytes(Some(0)), "0 B");
	assert_eq!(format_bytes(Some(512)), "512 B");
	assert_eq!(format_bytes(Some(1024)), "1 KB");
	assert_eq!(format_bytes(Some(1536)), "1.5 KB");
	assert_eq!(format_bytes(Some(5 * 1024 * 1024)), "5 MB");
}

#[test]
fn json_bodies_are_pretty_printed_and_binary_is_distinct() {
	use tabscope_protocol::network::GetResponseBodyResult;

	let json_body = ResponseBody::from_protocol(
		GetResponseBodyResult {
			body: r#"{"a":1}"#.to_string(),
			base64_encoded: false,
		},
		Some("application/json"),
	);
	assert_eq!(
		json_body,
		ResponseBody::Text {
			text: "{\n  \"a\": 1\n}".to_string()
		}
	);

	let broken = ResponseBody::from_protocol(
		GetResponseBodyResult {
			body: "{not json".to_string(),
			base64_encoded: false,
		},
		Some("application/json"),
	);
	assert_eq!(
		broken,
		ResponseBody::Text {
			text: "{not json".to_string()
		}
	);

	let binary = ResponseBody::from_protocol(
		GetResponseBodyResult {
			body: "iVBORw==".to_string(),
			base64_encoded: true,
		},
		Some("image/png"),
	);
	assert!(matches!(binary, ResponseBody::Binary { len: Some(4), .. }));
	assert_eq!(binary.bytes().unwrap(), vec![0x89, b'P', b'N', b'G']);
}
