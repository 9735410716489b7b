use std::collections::BTreeMap;

use serde::Serialize;
use tabscope_protocol::{FrameId, ScriptId};

/// Where a file leaf's content can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ContentLocator {
	/// Parsed script, fetched with `Debugger.getScriptSource`.
	Script { script_id: ScriptId },
	/// Frame resource, fetched with `Page.getResourceContent`.
	FrameResource { frame_id: FrameId, url: String },
}

/// Child key inside a container. Containers order before files, then by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChildKey {
	Container(String),
	File(String),
}

#[derive(Debug, Clone)]
pub struct Container {
	pub name: String,
	pub children: BTreeMap<ChildKey, Node>,
	pub expanded: bool,
}

impl Container {
	pub(crate) fn new(name: impl Into<String>, expanded: bool) -> Self {
		Self {
			name: name.into(),
			children: BTreeMap::new(),
			expanded,
		}
	}
}

#[derive(Debug, Clone)]
pub struct FileLeaf {
	pub name: String,
	pub url: String,
	pub locator: ContentLocator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
	Root,
	Domain,
	Folder,
	File,
}

/// Resource tree node. Every variant except `File` is a [`Container`].
#[derive(Debug, Clone)]
pub enum Node {
	Root(Container),
	Domain(Container),
	Folder(Container),
	File(FileLeaf),
}

impl Node {
	pub fn kind(&self) -> NodeKind {
		match self {
			Node::Root(_) => NodeKind::Root,
			Node::Domain(_) => NodeKind::Domain,
			Node::Folder(_) => NodeKind::Folder,
			Node::File(_) => NodeKind::File,
		}
	}

	pub fn name(&self) -> &str {
		match self {
			Node::Root(c) | Node::Domain(c) | Node::Folder(c) => &c.name,
			Node::File(leaf) => &leaf.name,
		}
	}

	pub fn container(&self) -> Option<&Container> {
		match self {
			Node::Root(c) | Node::Domain(c) | Node::Folder(c) => Some(c),
			Node::File(_) => None,
		}
	}

	pub fn container_mut(&mut self) -> Option<&mut Container> {
		match self {
			Node::Root(c) | Node::Domain(c) | Node::Folder(c) => Some(c),
			Node::File(_) => None,
		}
	}

	pub fn file(&self) -> Option<&FileLeaf> {
		match self {
			Node::File(leaf) => Some(leaf),
			_ => None,
		}
	}
}
