use std::time::Duration;

use clap::Parser;
use tempfile::TempDir;

use super::storage::{load_json, save_json};
use super::*;
use crate::cli::{Cli, Commands};

fn inspect_args(argv: &[&str]) -> (EndpointArgs, InspectArgs) {
	let cli = Cli::try_parse_from(argv).unwrap();
	match cli.command {
		Commands::Inspect(args) => (cli.endpoint, args),
		other => panic!("expected inspect, got {other:?}"),
	}
}

#[test]
fn endpoint_defaults_to_local_discovery() {
	let (endpoint, _) = inspect_args(&["tabscope", "inspect", "T1"]);

	assert_eq!(
		resolve_endpoint(&endpoint, &CliConfig::new()),
		Endpoint::Discover {
			host: DEFAULT_HOST.to_string(),
			port: DEFAULT_PORT,
		}
	);
}

#[test]
fn ws_flag_wins_over_everything() {
	let (endpoint, _) = inspect_args(&[
		"tabscope",
		"--port",
		"9333",
		"--ws-url",
		"ws://127.0.0.1:9333/devtools/browser/x",
		"inspect",
		"T1",
	]);
	let mut config = CliConfig::new();
	config.endpoint.ws_url = Some("ws://config".to_string());

	assert_eq!(
		resolve_endpoint(&endpoint, &config),
		Endpoint::WebSocket("ws://127.0.0.1:9333/devtools/browser/x".to_string())
	);
}

#[test]
fn address_flags_beat_configured_ws_url() {
	let (endpoint, _) = inspect_args(&["tabscope", "--port", "9333", "inspect", "T1"]);
	let mut config = CliConfig::new();
	config.endpoint.ws_url = Some("ws://config".to_string());
	config.endpoint.host = Some("10.0.0.2".to_string());

	let resolved = resolve_endpoint(&endpoint, &config);

	assert_eq!(
		resolved,
		Endpoint::Discover {
			host: "10.0.0.2".to_string(),
			port: 9333,
		}
	);
	assert_eq!(resolved.http_base().as_deref(), Some("http://10.0.0.2:9333"));
}

#[test]
fn configured_ws_url_used_without_flags() {
	let (endpoint, _) = inspect_args(&["tabscope", "inspect", "T1"]);
	let mut config = CliConfig::new();
	config.endpoint.ws_url = Some("ws://config".to_string());

	assert_eq!(resolve_endpoint(&endpoint, &config), Endpoint::WebSocket("ws://config".to_string()));
}

#[test]
fn inspector_options_merge_flags_over_file() {
	let (_, args) = inspect_args(&["tabscope", "inspect", "T1", "--hide-own", "--width", "1024"]);
	let mut config = CliConfig::new();
	config.inspector = InspectorDefaults {
		preserve_log: Some(true),
		hide_own_traffic: Some(false),
		own_origins: vec!["http://localhost:5000/".to_string()],
		surface_url: Some("http://localhost:5000/panel?t={target}".to_string()),
		surface_width: Some(640),
		surface_height: Some(480),
		attach_backoff_ms: Some(50),
		frame_interval_ms: None,
	};

	let options = inspector_options(&args, &config);

	assert!(options.preserve_log);
	assert!(options.hide_own_traffic);
	assert_eq!(options.surface.width, 1024);
	assert_eq!(options.surface.height, 480);
	assert_eq!(options.attach_backoff, Duration::from_millis(50));
	assert!(options.own_origins.matches("http://localhost:5000/app.js"));
	assert!(options.own_origins.matches("chrome-extension://abc/x.js"));
	assert!(options.effective_own_origins().matches("http://localhost:5000/panel"));
}

#[test]
fn frame_interval_ignores_zero() {
	let (_, args) = inspect_args(&["tabscope", "inspect", "T1", "--frame-interval-ms", "0"]);
	let mut config = CliConfig::new();
	config.inspector.frame_interval_ms = Some(250);

	assert_eq!(frame_interval(&args, &config), DEFAULT_FRAME_INTERVAL);

	let (_, args) = inspect_args(&["tabscope", "inspect", "T1"]);
	assert_eq!(frame_interval(&args, &config), Duration::from_millis(250));
}

#[test]
fn default_path_ends_with_tabscope_config() {
	assert!(default_config_path().ends_with("tabscope/config.json"));
}

#[test]
fn missing_file_loads_defaults() {
	let tmp = TempDir::new().unwrap();
	let path = tmp.path().join("missing.json");

	let loaded = LoadedConfig::load(Some(&path)).unwrap();

	assert!(!loaded.from_file);
	assert_eq!(loaded.config, CliConfig::new());
}

#[test]
fn unparseable_file_is_an_error() {
	let tmp = TempDir::new().unwrap();
	let path = tmp.path().join("config.json");
	std::fs::write(&path, "{ not json").unwrap();

	let err = LoadedConfig::load(Some(&path)).unwrap_err();

	assert!(matches!(err, crate::error::CliError::Config { .. }));
}

#[test]
fn save_and_load_json() {
	let tmp = TempDir::new().unwrap();
	let path = tmp.path().join("nested/config.json");

	let mut config = CliConfig::new();
	config.endpoint.port = Some(9229);
	config.inspector.own_origins = vec!["http://localhost:8000/".to_string()];

	save_json(&path, &config).unwrap();
	let loaded: CliConfig = load_json(&path).unwrap();
	assert_eq!(loaded, config);

	let raw: serde_json::Value = load_json(&path).unwrap();
	assert_eq!(raw["endpoint"]["port"], 9229);
	assert_eq!(raw["inspector"]["ownOrigins"][0], "http://localhost:8000/");
}

#[test]
fn save_into_a_file_path_reports_io_with_context() {
	let tmp = TempDir::new().unwrap();
	let blocker = tmp.path().join("blocker");
	std::fs::write(&blocker, "not a directory").unwrap();
	let path = blocker.join("config.json");

	let err = save_json(&path, &CliConfig::new()).unwrap_err();

	assert!(matches!(err, crate::error::CliError::Anyhow(_)));
	assert!(err.to_string().contains("blocker"), "{err}");
	assert_eq!(err.to_command_error().code, crate::output::ErrorCode::IoError);
}
