use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Default directives per `-v` count. The runtime's per-frame chatter stays
/// hidden until `-vv`.
fn default_directives(verbosity: u8) -> &'static str {
	match verbosity {
		0 => "warn,tabscope_runtime=error",
		1 => "info,tabscope_runtime=warn",
		_ => "debug,tabscope_runtime=trace",
	}
}

/// Installs the stderr subscriber. `RUST_LOG` overrides the verbosity flags.
pub fn init_logging(verbosity: u8) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(std::io::stderr().is_terminal())
		.with_target(verbosity > 1)
		.compact()
		.init();
}
