use std::io;

use serde_json::json;

use crate::cli::ConfigAction;
use crate::config::LoadedConfig;
use crate::error::Result;
use crate::output::{Envelope, OutputFormat, emit, print_lines};

pub fn execute(action: ConfigAction, loaded: LoadedConfig, format: OutputFormat) -> Result<()> {
	let (data, lines) = match action {
		ConfigAction::Show => {
			let text = serde_json::to_string_pretty(&loaded.config)?;
			let source = if loaded.from_file { "" } else { " (defaults, file not found)" };
			let mut lines = vec![format!("# {}{source}", loaded.path.display())];
			lines.extend(text.lines().map(str::to_string));
			(
				json!({ "path": loaded.path, "fromFile": loaded.from_file, "config": loaded.config }),
				lines,
			)
		}
		ConfigAction::Path => (
			json!({ "path": loaded.path, "exists": loaded.path.exists() }),
			vec![loaded.path.display().to_string()],
		),
		ConfigAction::Init { force } => {
			if loaded.from_file && !force {
				return Err(io::Error::new(
					io::ErrorKind::AlreadyExists,
					format!("{} already exists (use --force to overwrite)", loaded.path.display()),
				)
				.into());
			}
			loaded.save()?;
			(
				json!({ "path": loaded.path, "written": true }),
				vec![format!("wrote {}", loaded.path.display())],
			)
		}
	};

	match format {
		OutputFormat::Text => print_lines(lines),
		format => emit(&Envelope::success("config", data), format),
	}
	Ok(())
}
