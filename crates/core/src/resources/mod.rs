//! Resource index: a host / path-segment tree of every script and frame
//! resource the target has loaded.
//!
//! URLs arrive in any order from `Debugger.scriptParsed` and from
//! `Page.getResourceTree` snapshots. Each is split into host, path segments and
//! query; intermediate segments become folders (collapsed), the final segment
//! (or `(index)` for an empty path) becomes a file leaf named with its query.
//! Segments are compared verbatim, without percent-decoding.
//!
//! Nodes are never removed while the session lives.

#[cfg(test)]
mod tests;

mod node;
mod render;

use std::collections::HashMap;

use serde::Serialize;
use tabscope_protocol::page::FrameResourceTree;
use tracing::{debug, warn};
use url::Url;

pub use node::{ChildKey, Container, ContentLocator, FileLeaf, Node, NodeKind};
pub use render::RenderGate;

use crate::error::{Error, Result};
use crate::options::OwnOrigins;

/// Leaf name used when a URL has no path segments.
pub const INDEX_NAME: &str = "(index)";

/// Result of [`ResourceIndex::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
	Added,
	/// The leaf existed; its locator was overwritten.
	Replaced,
	/// Own-origin, internal or host-less URL; the tree is untouched.
	Skipped,
}

/// One visible line of the flattened tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeRow {
	pub depth: usize,
	pub kind: NodeKind,
	pub name: String,
	/// `host/segment/...`, usable with [`ResourceIndex::toggle_expanded`].
	pub path: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub expanded: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
}

/// Fetched file content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContent {
	pub text: String,
	pub base64_encoded: bool,
}

#[derive(Debug)]
pub struct ResourceIndex {
	root: Node,
	locators: HashMap<String, ContentLocator>,
	own_origins: OwnOrigins,
	node_count: usize,
	gate: RenderGate,
}

impl Default for ResourceIndex {
	fn default() -> Self {
		Self::new(OwnOrigins::default())
	}
}

impl ResourceIndex {
	pub fn new(own_origins: OwnOrigins) -> Self {
		Self {
			root: Node::Root(Container::new("", true)),
			locators: HashMap::new(),
			own_origins,
			node_count: 0,
			gate: RenderGate::default(),
		}
	}

	/// Inserts a discovered URL.
	///
	/// Unparseable URLs are rejected with [`Error::MalformedUrl`] and leave the
	/// tree untouched.
	pub fn insert(&mut self, raw: &str, locator: ContentLocator) -> Result<Insertion> {
		if raw.is_empty() || self.own_origins.matches(raw) || raw.starts_with("devtools:") {
			return Ok(Insertion::Skipped);
		}

		let url = Url::parse(raw).map_err(|source| Error::MalformedUrl {
			url: raw.to_string(),
			source,
		})?;
		let Some(host) = url.host_str() else {
			debug!(url = raw, "skipping url without host");
			return Ok(Insertion::Skipped);
		};

		let segments: Vec<&str> = url
			.path_segments()
			.map(|segments| segments.filter(|s| !s.is_empty()).collect())
			.unwrap_or_default();
		let query = url.query().filter(|q| !q.is_empty());

		let (folders, file) = match segments.split_last() {
			Some((last, folders)) => (folders, *last),
			None => (&[][..], INDEX_NAME),
		};
		let leaf_name = match query {
			Some(query) => format!("{file}?{query}"),
			None => file.to_string(),
		};

		let mut created = 0;
		let Some(root) = self.root.container_mut() else {
			return Ok(Insertion::Skipped);
		};

		let Some(mut current) = ensure_container(root, host, Node::Domain, true, &mut created) else {
			return Ok(Insertion::Skipped);
		};
		for folder in folders {
			let Some(next) = ensure_container(current, folder, Node::Folder, false, &mut created) else {
				return Ok(Insertion::Skipped);
			};
			current = next;
		}

		let leaf = Node::File(FileLeaf {
			name: leaf_name.clone(),
			url: raw.to_string(),
			locator: locator.clone(),
		});
		let outcome = match current.children.insert(ChildKey::File(leaf_name), leaf) {
			Some(_) => Insertion::Replaced,
			None => {
				created += 1;
				Insertion::Added
			}
		};

		self.node_count += created;
		self.locators.insert(raw.to_string(), locator);
		if outcome == Insertion::Added {
			self.gate.request();
		}
		Ok(outcome)
	}

	/// Inserts every frame document and sub-resource of a resource tree snapshot.
	/// Returns how many leaves were added. Malformed URLs are logged and skipped.
	pub fn insert_frame_tree(&mut self, tree: &FrameResourceTree) -> usize {
		let mut added = 0;
		let frame_id = &tree.frame.id;
		let urls = std::iter::once(tree.frame.url.as_str()).chain(tree.resources.iter().map(|r| r.url.as_str()));

		for url in urls {
			let locator = ContentLocator::FrameResource {
				frame_id: frame_id.clone(),
				url: url.to_string(),
			};
			match self.insert(url, locator) {
				Ok(Insertion::Added) => added += 1,
				Ok(_) => {}
				Err(err) => warn!(error = %err, "dropping resource"),
			}
		}

		for child in &tree.child_frames {
			added += self.insert_frame_tree(child);
		}
		added
	}

	pub fn locator(&self, url: &str) -> Option<&ContentLocator> {
		self.locators.get(url)
	}

	/// Nodes below the root (domains, folders and files).
	pub fn node_count(&self) -> usize {
		self.node_count
	}

	pub fn file_count(&self) -> usize {
		self.locators.len()
	}

	pub fn root(&self) -> &Node {
		&self.root
	}

	/// Looks up a node by `host/segment/...` path. Containers win over files of the same name.
	pub fn find(&self, path: &str) -> Option<&Node> {
		let mut current = &self.root;
		for part in path.split('/').filter(|p| !p.is_empty()) {
			let container = current.container()?;
			current = container
				.children
				.get(&ChildKey::Container(part.to_string()))
				.or_else(|| container.children.get(&ChildKey::File(part.to_string())))?;
		}
		Some(current)
	}

	/// Flips a domain or folder. Returns the new state, or `None` if `path` is not a container.
	pub fn toggle_expanded(&mut self, path: &str) -> Option<bool> {
		let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
		if parts.is_empty() {
			return None;
		}
		let mut current = self.root.container_mut()?;
		for part in parts {
			current = current
				.children
				.get_mut(&ChildKey::Container(part.to_string()))?
				.container_mut()?;
		}
		current.expanded = !current.expanded;
		let expanded = current.expanded;
		self.gate.request();
		Some(expanded)
	}

	/// Visible rows: domains by host, containers before files, collapsed
	/// containers hide their children.
	pub fn rows(&self) -> Vec<TreeRow> {
		let mut rows = Vec::new();
		if let Some(root) = self.root.container() {
			for child in root.children.values() {
				push_rows(child, 0, "", &mut rows);
			}
		}
		rows
	}

	/// Frame tick: true when something changed since the last render.
	pub fn take_render(&mut self) -> bool {
		self.gate.take()
	}
}

fn ensure_container<'a>(
	parent: &'a mut Container,
	name: &str,
	make: fn(Container) -> Node,
	expanded: bool,
	created: &mut usize,
) -> Option<&'a mut Container> {
	parent
		.children
		.entry(ChildKey::Container(name.to_string()))
		.or_insert_with(|| {
			*created += 1;
			make(Container::new(name, expanded))
		})
		.container_mut()
}

fn push_rows(node: &Node, depth: usize, parent_path: &str, rows: &mut Vec<TreeRow>) {
	let path = if parent_path.is_empty() {
		node.name().to_string()
	} else {
		format!("{parent_path}/{}", node.name())
	};

	rows.push(TreeRow {
		depth,
		kind: node.kind(),
		name: node.name().to_string(),
		path: path.clone(),
		expanded: node.container().map(|c| c.expanded),
		url: node.file().map(|leaf| leaf.url.clone()),
	});

	if let Some(container) = node.container() {
		if container.expanded {
			for child in container.children.values() {
				push_rows(child, depth + 1, &path, rows);
			}
		}
	}
}
