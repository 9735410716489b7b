use tabscope_protocol::{FrameId, ScriptId};

use super::*;

fn script(id: &str) -> ContentLocator {
	ContentLocator::Script {
		script_id: ScriptId::from(id),
	}
}

fn names(rows: &[TreeRow]) -> Vec<(usize, &str)> {
	rows.iter().map(|row| (row.depth, row.name.as_str())).collect()
}

#[test]
fn urls_build_domain_folder_file_tree() {
	let mut index = ResourceIndex::default();
	assert_eq!(index.insert("https://a.test/js/app.js", script("1")).unwrap(), Insertion::Added);
	assert_eq!(index.insert("https://a.test/js/util.js", script("2")).unwrap(), Insertion::Added);
	assert_eq!(index.insert("https://a.test/", script("3")).unwrap(), Insertion::Added);

	assert_eq!(index.node_count(), 5);

	// folders start collapsed
	let rows = index.rows();
	assert_eq!(names(&rows), vec![(0, "a.test"), (1, "js"), (1, "(index)")]);
	assert_eq!(rows[0].kind, NodeKind::Domain);
	assert_eq!(rows[0].expanded, Some(true));
	assert_eq!(rows[1].kind, NodeKind::Folder);
	assert_eq!(rows[1].expanded, Some(false));
	assert_eq!(rows[2].url.as_deref(), Some("https://a.test/"));

	assert_eq!(index.toggle_expanded("a.test/js"), Some(true));
	let rows = index.rows();
	assert_eq!(
		names(&rows),
		vec![(0, "a.test"), (1, "js"), (2, "app.js"), (2, "util.js"), (1, "(index)")]
	);
	assert_eq!(rows[2].path, "a.test/js/app.js");
}

#[test]
fn duplicate_url_replaces_locator_without_new_nodes() {
	let mut index = ResourceIndex::default();
	index.insert("https://a.test/js/app.js", script("1")).unwrap();
	let count = index.node_count();

	assert_eq!(index.insert("https://a.test/js/app.js", script("9")).unwrap(), Insertion::Replaced);
	assert_eq!(index.node_count(), count);
	assert_eq!(index.locator("https://a.test/js/app.js"), Some(&script("9")));
}

#[test]
fn query_is_part_of_leaf_name() {
	let mut index = ResourceIndex::default();
	index.insert("https://a.test/app.js?v=2", script("1")).unwrap();
	index.insert("https://a.test/app.js?v=3", script("2")).unwrap();
	index.insert("https://a.test/?page=1", script("3")).unwrap();

	let rows = index.rows();
	assert_eq!(
		names(&rows),
		vec![(0, "a.test"), (1, "(index)?page=1"), (1, "app.js?v=2"), (1, "app.js?v=3")]
	);
}

#[test]
fn domains_and_children_are_ordered() {
	let mut index = ResourceIndex::default();
	index.insert("https://b.test/z.js", script("1")).unwrap();
	index.insert("https://b.test/B.js", script("2")).unwrap();
	index.insert("https://b.test/a.js", script("3")).unwrap();
	index.insert("https://b.test/lib/x.js", script("4")).unwrap();
	index.insert("https://a.test/only.js", script("5")).unwrap();

	let rows = index.rows();
	assert_eq!(
		names(&rows),
		vec![
			(0, "a.test"),
			(1, "only.js"),
			(0, "b.test"),
			(1, "lib"),
			(1, "B.js"),
			(1, "a.js"),
			(1, "z.js"),
		]
	);
}

#[test]
fn port_is_not_part_of_domain() {
	let mut index = ResourceIndex::default();
	index.insert("http://localhost:8080/main.js", script("1")).unwrap();
	index.insert("http://localhost:3000/other.js", script("2")).unwrap();

	let rows = index.rows();
	assert_eq!(names(&rows), vec![(0, "localhost"), (1, "main.js"), (1, "other.js")]);
}

#[test]
fn folder_and_file_with_same_name_coexist() {
	let mut index = ResourceIndex::default();
	index.insert("https://a.test/docs", script("1")).unwrap();
	index.insert("https://a.test/docs/intro.js", script("2")).unwrap();

	let rows = index.rows();
	assert_eq!(rows[1].kind, NodeKind::Folder);
	assert_eq!(rows[2].kind, NodeKind::File);
	assert_eq!(rows[1].name, rows[2].name);
}

#[test]
fn own_internal_and_hostless_urls_are_skipped() {
	let mut index = ResourceIndex::new(OwnOrigins::default().with("http://127.0.0.1:9000/"));
	for url in [
		"",
		"chrome-extension://abc/panel.js",
		"devtools://devtools/bundled/inspector.js",
		"http://127.0.0.1:9000/ui.js",
		"data:text/javascript,1",
		"about:blank",
	] {
		assert_eq!(index.insert(url, script("1")).unwrap(), Insertion::Skipped, "{url}");
	}
	assert_eq!(index.node_count(), 0);
	assert!(index.rows().is_empty());
}

#[test]
fn malformed_url_is_rejected_and_tree_unchanged() {
	let mut index = ResourceIndex::default();
	index.insert("https://a.test/app.js", script("1")).unwrap();

	let err = index.insert("http://[::1", script("2")).unwrap_err();
	assert!(matches!(err, Error::MalformedUrl { .. }));
	assert_eq!(index.node_count(), 2);
}

#[test]
fn toggle_unknown_or_file_path_is_none() {
	let mut index = ResourceIndex::default();
	index.insert("https://a.test/js/app.js", script("1")).unwrap();

	assert_eq!(index.toggle_expanded(""), None);
	assert_eq!(index.toggle_expanded("nope.test"), None);
	assert_eq!(index.toggle_expanded("a.test/js/app.js"), None);
	assert_eq!(index.toggle_expanded("a.test"), Some(false));
	assert_eq!(names(&index.rows()), vec![(0, "a.test")]);
}

#[test]
fn frame_tree_inserts_documents_and_resources() {
	let tree: FrameResourceTree = serde_json::from_value(serde_json::json!({
		"frame": {"id": "F1", "url": "https://a.test/"},
		"resources": [
			{"url": "https://a.test/site.css", "type": "Stylesheet", "mimeType": "text/css"},
			{"url": "https://cdn.test/lib.js", "type": "Script", "mimeType": "text/javascript"}
		],
		"childFrames": [{
			"frame": {"id": "F2", "parentId": "F1", "url": "https://ads.test/frame.html"},
			"resources": []
		}]
	}))
	.unwrap();

	let mut index = ResourceIndex::default();
	assert_eq!(index.insert_frame_tree(&tree), 4);
	assert_eq!(
		index.locator("https://cdn.test/lib.js"),
		Some(&ContentLocator::FrameResource {
			frame_id: FrameId::from("F1"),
			url: "https://cdn.test/lib.js".to_string(),
		})
	);
	assert!(matches!(
		index.locator("https://ads.test/frame.html"),
		Some(ContentLocator::FrameResource { frame_id, .. }) if frame_id.as_str() == "F2"
	));

	// snapshot again: nothing new
	assert_eq!(index.insert_frame_tree(&tree), 0);
}

#[test]
fn burst_of_inserts_renders_once() {
	let mut index = ResourceIndex::default();
	for i in 0..50 {
		index.insert(&format!("https://a.test/chunk-{i}.js"), script("1")).unwrap();
	}

	assert!(index.take_render());
	assert!(!index.take_render());

	index.insert("https://a.test/chunk-1.js", script("2")).unwrap();
	assert!(!index.take_render());
}

#[test]
fn render_gate_coalesces_requests() {
	let mut gate = RenderGate::default();
	assert!(gate.request());
	assert!(!gate.request());
	assert!(gate.is_pending());
	assert!(gate.take());
	assert!(!gate.take());
}
