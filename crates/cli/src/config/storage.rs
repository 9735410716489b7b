//! Config file location and persistence.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use super::types::CliConfig;
use crate::error::{CliError, Result};

/// `$XDG_CONFIG_HOME/tabscope/config.json`, falling back to the platform config dir.
pub fn default_config_path() -> PathBuf {
	std::env::var_os("XDG_CONFIG_HOME")
		.map(PathBuf::from)
		.or_else(dirs::config_dir)
		.unwrap_or_else(|| PathBuf::from("."))
		.join("tabscope")
		.join("config.json")
}

/// Loaded config and where it came from.
#[derive(Debug)]
pub struct LoadedConfig {
	pub config: CliConfig,
	pub path: PathBuf,
	/// False when the file did not exist and defaults are in use.
	pub from_file: bool,
}

impl LoadedConfig {
	/// Loads `explicit` or the default path. A missing file yields defaults;
	/// a file that exists but does not parse is an error.
	pub fn load(explicit: Option<&Path>) -> Result<Self> {
		let path = explicit.map(Path::to_path_buf).unwrap_or_else(default_config_path);
		let content = match fs::read_to_string(&path) {
			Ok(content) => content,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
				return Ok(Self {
					config: CliConfig::new(),
					path,
					from_file: false,
				});
			}
			Err(err) => {
				return Err(anyhow::Error::new(err)
					.context(format!("failed to read config {}", path.display()))
					.into());
			}
		};

		let config = serde_json::from_str(&content).map_err(|source| CliError::Config {
			path: path.clone(),
			source,
		})?;
		Ok(Self {
			config,
			path,
			from_file: true,
		})
	}

	pub fn save(&self) -> Result<()> {
		save_json(&self.path, &self.config)
	}
}

pub(crate) fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
	fs::read_to_string(path)
		.ok()
		.and_then(|content| serde_json::from_str(&content).ok())
}

pub(crate) fn save_json<T: serde::Serialize>(path: &Path, data: &T) -> Result<()> {
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
	}
	let content = serde_json::to_string_pretty(data)?;
	fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
	Ok(())
}
