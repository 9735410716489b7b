use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use super::*;

fn target(id: &str) -> PageTarget {
	PageTarget {
		id: TargetId::new(id),
		kind: "page".to_string(),
		title: format!("title {id}"),
		url: format!("https://{id}.test/"),
	}
}

/// Serves `body` as JSON to a single HTTP request and returns the port.
async fn serve_once(body: serde_json::Value) -> u16 {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let port = listener.local_addr().unwrap().port();
	tokio::spawn(async move {
		let (mut stream, _) = listener.accept().await.unwrap();
		let mut buf = [0u8; 2048];
		let _ = stream.read(&mut buf).await.unwrap();
		let body = body.to_string();
		let response = format!(
			"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
			body.len()
		);
		stream.write_all(response.as_bytes()).await.unwrap();
		stream.shutdown().await.unwrap();
	});
	port
}

#[test]
fn exact_id_wins_over_prefix() {
	let targets = vec![target("AB"), target("ABC")];

	assert_eq!(resolve_target(&targets, "AB").unwrap().id.as_str(), "AB");
}

#[test]
fn unique_prefix_is_case_insensitive() {
	let targets = vec![target("9F2A11"), target("77C0DE")];

	assert_eq!(resolve_target(&targets, "9f2").unwrap().id.as_str(), "9F2A11");
}

#[test]
fn ambiguous_prefix_lists_candidates() {
	let targets = vec![target("AB1"), target("AB2"), target("CD")];

	match resolve_target(&targets, "AB") {
		Err(CliError::AmbiguousTarget { prefix, candidates }) => {
			assert_eq!(prefix, "AB");
			assert_eq!(candidates, "AB1, AB2");
		}
		other => panic!("expected ambiguity, got {other:?}"),
	}
}

#[test]
fn unknown_and_empty_queries_are_not_found() {
	let targets = vec![target("AB1")];

	assert!(matches!(resolve_target(&targets, "ZZ"), Err(CliError::TargetNotFound(_))));
	assert!(matches!(resolve_target(&targets, ""), Err(CliError::TargetNotFound(_))));
}

#[test]
fn json_list_entry_deserializes() {
	let entry: PageTarget = serde_json::from_value(json!({
		"description": "",
		"devtoolsFrontendUrl": "/devtools/inspector.html?ws=...",
		"id": "C0FFEE",
		"title": "Example",
		"type": "page",
		"url": "https://example.com/",
		"webSocketDebuggerUrl": "ws://127.0.0.1:9222/devtools/page/C0FFEE"
	}))
	.unwrap();

	assert!(entry.is_page());
	assert_eq!(entry.id.as_str(), "C0FFEE");
	assert_eq!(entry.title, "Example");
}

#[tokio::test]
async fn websocket_endpoint_is_used_verbatim() {
	let endpoint = Endpoint::WebSocket("ws://127.0.0.1:1/devtools/browser/x".to_string());

	assert_eq!(resolve_ws_url(&endpoint).await.unwrap(), "ws://127.0.0.1:1/devtools/browser/x");
	assert!(list_targets(&endpoint, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn discovers_ws_url_from_json_version() {
	let port = serve_once(json!({
		"Browser": "Chrome/120.0.0.0",
		"Protocol-Version": "1.3",
		"webSocketDebuggerUrl": "ws://127.0.0.1:9222/devtools/browser/abc"
	}))
	.await;
	let endpoint = Endpoint::Discover {
		host: "127.0.0.1".to_string(),
		port,
	};

	assert_eq!(
		resolve_ws_url(&endpoint).await.unwrap(),
		"ws://127.0.0.1:9222/devtools/browser/abc"
	);
}

#[tokio::test]
async fn json_list_keeps_only_pages() {
	let port = serve_once(json!([
		{ "id": "P1", "type": "page", "title": "One", "url": "https://one.test/" },
		{ "id": "W1", "type": "service_worker", "title": "sw", "url": "https://one.test/sw.js" },
		{ "id": "P2", "type": "page", "title": "Two", "url": "https://two.test/" }
	]))
	.await;
	let endpoint = Endpoint::Discover {
		host: "127.0.0.1".to_string(),
		port,
	};

	let ids: Vec<_> = list_targets(&endpoint, None)
		.await
		.unwrap()
		.into_iter()
		.map(|t| t.id.as_str().to_string())
		.collect();

	assert_eq!(ids, ["P1", "P2"]);
}

#[tokio::test]
async fn unreachable_endpoint_is_a_discovery_error() {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let port = listener.local_addr().unwrap().port();
	drop(listener);
	let endpoint = Endpoint::Discover {
		host: "127.0.0.1".to_string(),
		port,
	};

	match resolve_ws_url(&endpoint).await {
		Err(CliError::Discovery { url, .. }) => assert_eq!(url, format!("http://127.0.0.1:{port}/json/version")),
		other => panic!("expected discovery error, got {other:?}"),
	}
}
