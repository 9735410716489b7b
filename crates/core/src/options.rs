//! Inspector configuration.

use std::time::Duration;

use tabscope_protocol::{PROTOCOL_VERSION, TargetId};

use crate::host::SurfaceSpec;

/// Pause between the forced detach and the single attach retry.
pub const DEFAULT_ATTACH_BACKOFF: Duration = Duration::from_millis(250);

/// Knobs for a [`SessionRegistry`](crate::SessionRegistry).
#[derive(Debug, Clone)]
pub struct InspectorOptions {
	pub protocol_version: String,
	pub attach_backoff: Duration,
	pub surface: SurfaceTemplate,
	pub own_origins: OwnOrigins,
	/// Initial "preserve log" state of new ledgers.
	pub preserve_log: bool,
	/// Initial "hide own traffic" state of new ledgers.
	pub hide_own_traffic: bool,
}

impl Default for InspectorOptions {
	fn default() -> Self {
		Self {
			protocol_version: PROTOCOL_VERSION.to_string(),
			attach_backoff: DEFAULT_ATTACH_BACKOFF,
			surface: SurfaceTemplate::default(),
			own_origins: OwnOrigins::default(),
			preserve_log: false,
			hide_own_traffic: false,
		}
	}
}

impl InspectorOptions {
	/// Own-origin prefixes, including the surface's origin when it is served over http(s).
	pub fn effective_own_origins(&self) -> OwnOrigins {
		match url::Url::parse(&self.surface.url) {
			Ok(surface) if matches!(surface.scheme(), "http" | "https") => self
				.own_origins
				.clone()
				.with(format!("{}/", surface.origin().ascii_serialization())),
			_ => self.own_origins.clone(),
		}
	}
}

/// How inspection windows are created. `{target}` in `url` is replaced by the
/// inspected target id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceTemplate {
	pub url: String,
	pub width: u32,
	pub height: u32,
}

impl Default for SurfaceTemplate {
	fn default() -> Self {
		Self {
			url: "about:blank#tabscope={target}".to_string(),
			width: 800,
			height: 600,
		}
	}
}

impl SurfaceTemplate {
	pub fn for_target(&self, target: &TargetId) -> SurfaceSpec {
		SurfaceSpec {
			url: self.url.replace("{target}", target.as_str()),
			width: self.width,
			height: self.height,
		}
	}
}

/// URL prefixes that belong to the inspector itself rather than the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnOrigins {
	prefixes: Vec<String>,
}

impl Default for OwnOrigins {
	fn default() -> Self {
		Self::new(["chrome-extension://", "devtools://"])
	}
}

impl OwnOrigins {
	pub fn new<I, S>(prefixes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			prefixes: prefixes.into_iter().map(Into::into).collect(),
		}
	}

	pub fn with(mut self, prefix: impl Into<String>) -> Self {
		let prefix = prefix.into();
		if !prefix.is_empty() && !self.prefixes.contains(&prefix) {
			self.prefixes.push(prefix);
		}
		self
	}

	pub fn matches(&self, url: &str) -> bool {
		self.prefixes.iter().any(|prefix| url.starts_with(prefix.as_str()))
	}

	pub fn prefixes(&self) -> &[String] {
		&self.prefixes
	}
}
