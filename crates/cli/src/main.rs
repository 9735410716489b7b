mod cli;
mod commands;
mod config;
mod discovery;
mod error;
mod logging;
mod output;
mod styles;

use clap::Parser;

use crate::cli::Cli;
use crate::error::CliError;
use crate::output::{Envelope, OutputFormat};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let format = cli.format;

	if let Err(err) = commands::dispatch(cli).await {
		handle_error(err, format);
		std::process::exit(1);
	}
}

fn handle_error(err: CliError, format: OutputFormat) {
	let cmd_error = err.to_command_error();

	// Always print to stderr for humans
	output::print_error_stderr(&cmd_error);

	// Also emit the envelope on stdout with ok=false for machine consumers
	let envelope: Envelope<()> = Envelope::failure("tabscope", cmd_error);
	output::emit(&envelope, format);
}
