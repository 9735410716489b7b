//! CLI configuration: a JSON file overlaid by command line flags.
//!
//! Precedence is flag, then config file, then built-in default. A `--ws-url`
//! (flag or file) skips HTTP discovery entirely, but host/port flags beat a
//! WebSocket URL that only comes from the file.

#[cfg(test)]
mod tests;

pub mod storage;
pub mod types;

use std::time::Duration;

use tabscope::{InspectorOptions, OwnOrigins};

pub use storage::{LoadedConfig, default_config_path};
pub use types::{CliConfig, EndpointDefaults, InspectorDefaults, SCHEMA_VERSION};

use crate::cli::{EndpointArgs, InspectArgs};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 9222;
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// How to reach the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
	/// Browser-level WebSocket URL, used as is.
	WebSocket(String),
	/// Discover the WebSocket URL from `http://host:port/json/version`.
	Discover { host: String, port: u16 },
}

impl Endpoint {
	/// `host:port` for HTTP discovery, when known.
	pub fn http_base(&self) -> Option<String> {
		match self {
			Endpoint::WebSocket(_) => None,
			Endpoint::Discover { host, port } => Some(format!("http://{host}:{port}")),
		}
	}
}

pub fn resolve_endpoint(args: &EndpointArgs, config: &CliConfig) -> Endpoint {
	if let Some(ws_url) = &args.ws_url {
		return Endpoint::WebSocket(ws_url.clone());
	}

	let flags_address = args.host.is_some() || args.port.is_some();
	if !flags_address {
		if let Some(ws_url) = &config.endpoint.ws_url {
			return Endpoint::WebSocket(ws_url.clone());
		}
	}

	Endpoint::Discover {
		host: args
			.host
			.clone()
			.or_else(|| config.endpoint.host.clone())
			.unwrap_or_else(|| DEFAULT_HOST.to_string()),
		port: args.port.or(config.endpoint.port).unwrap_or(DEFAULT_PORT),
	}
}

pub fn inspector_options(args: &InspectArgs, config: &CliConfig) -> InspectorOptions {
	let defaults = &config.inspector;
	let mut options = InspectorOptions::default();

	options.preserve_log = args.preserve_log || defaults.preserve_log.unwrap_or(false);
	options.hide_own_traffic = args.hide_own || defaults.hide_own_traffic.unwrap_or(false);

	if let Some(url) = args.surface_url.clone().or_else(|| defaults.surface_url.clone()) {
		options.surface.url = url;
	}
	if let Some(width) = args.width.or(defaults.surface_width) {
		options.surface.width = width;
	}
	if let Some(height) = args.height.or(defaults.surface_height) {
		options.surface.height = height;
	}
	if let Some(ms) = defaults.attach_backoff_ms {
		options.attach_backoff = Duration::from_millis(ms);
	}

	options.own_origins = defaults
		.own_origins
		.iter()
		.fold(OwnOrigins::default(), |origins, prefix| origins.with(prefix.as_str()));
	options
}

pub fn frame_interval(args: &InspectArgs, config: &CliConfig) -> Duration {
	args.frame_interval_ms
		.or(config.inspector.frame_interval_ms)
		.filter(|ms| *ms > 0)
		.map(Duration::from_millis)
		.unwrap_or(DEFAULT_FRAME_INTERVAL)
}
