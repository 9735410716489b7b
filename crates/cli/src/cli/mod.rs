
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tabscope::TypeFilter;

use crate::output::OutputFormat;
use crate::styles::cli_styles;

/// Root CLI for tabscope.
#[derive(Parser, Debug)]
#[command(name = "tabscope")]
#[command(about = "Inspect network traffic, resources and storage of a browser tab over the DevTools protocol")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format: text (default), json or ndjson
	#[arg(short = 'f', long, global = true, value_enum, default_value = "text")]
	pub format: OutputFormat,

	/// Config file (defaults to $XDG_CONFIG_HOME/tabscope/config.json)
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	#[command(flatten)]
	pub endpoint: EndpointArgs,

	#[command(subcommand)]
	pub command: Commands,
}

/// Where the browser's debugging endpoint lives.
#[derive(Args, Debug, Clone, Default)]
pub struct EndpointArgs {
	/// Debugging host for endpoint discovery
	#[arg(long, global = true, value_name = "HOST")]
	pub host: Option<String>,

	/// Debugging port for endpoint discovery
	#[arg(long, global = true, value_name = "PORT")]
	pub port: Option<u16>,

	/// Browser WebSocket URL; skips discovery
	#[arg(long, global = true, value_name = "URL")]
	pub ws_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// List page targets.
	Targets,
	/// Attach to a target and inspect it until detached.
	Inspect(InspectArgs),
	/// Show or create the config file.
	Config {
		#[command(subcommand)]
		action: ConfigAction,
	},
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
	/// Target id or unique id prefix.
	#[arg(value_name = "TARGET")]
	pub target: String,

	/// Keep the network log across navigations.
	#[arg(long)]
	pub preserve_log: bool,

	/// Hide requests made by the inspector itself.
	#[arg(long)]
	pub hide_own: bool,

	/// Initial category filter (all, doc, css, img, media, font, js, xhr, fetch, ws, other).
	#[arg(long, value_name = "TYPE")]
	pub filter: Option<TypeFilter>,

	/// Minimum interval between view updates.
	#[arg(long, value_name = "MS")]
	pub frame_interval_ms: Option<u64>,

	/// Inspection window URL; `{target}` is replaced by the target id.
	#[arg(long, value_name = "URL")]
	pub surface_url: Option<String>,

	/// Inspection window width.
	#[arg(long, value_name = "PX")]
	pub width: Option<u32>,

	/// Inspection window height.
	#[arg(long, value_name = "PX")]
	pub height: Option<u32>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
	/// Print the effective config.
	Show,
	/// Print the config file path.
	Path,
	/// Write a default config file if none exists.
	Init {
		/// Overwrite an existing file.
		#[arg(long)]
		force: bool,
	},
}
