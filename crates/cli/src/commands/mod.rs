mod configure;
pub mod inspect;
mod targets;

use crate::cli::{Cli, Commands};
use crate::config::{self, LoadedConfig};
use crate::error::Result;

pub async fn dispatch(cli: Cli) -> Result<()> {
	let format = cli.format;
	let loaded = LoadedConfig::load(cli.config.as_deref())?;
	let endpoint = config::resolve_endpoint(&cli.endpoint, &loaded.config);

	match cli.command {
		Commands::Targets => targets::execute(&endpoint, format).await,
		Commands::Inspect(args) => inspect::execute(&endpoint, args, &loaded.config, format).await,
		Commands::Config { action } => configure::execute(action, loaded, format),
	}
}
