//! Help and directive output styling.

use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use colored::{ColoredString, Colorize};
use tabscope::Status;

/// Returns clap Styles configured to match cargo's help output colors.
///
/// - Headers and usage: Green + Bold
/// - Literals, placeholders and valid values: Cyan
pub fn cli_styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default().bold())
		.usage(AnsiColor::Green.on_default().bold())
		.literal(AnsiColor::Cyan.on_default())
		.placeholder(AnsiColor::Cyan.on_default())
		.valid(AnsiColor::Cyan.on_default())
}

/// Status cell right-aligned to `width`: errors red, pending dimmed, everything else green.
pub fn status(status: Status, width: usize) -> ColoredString {
	let text = format!("{:>width$}", status.to_string());
	match status {
		Status::Pending => text.dimmed(),
		s if s.is_error() => text.red(),
		_ => text.green(),
	}
}

pub fn heading(text: &str) -> ColoredString {
	text.green().bold()
}

pub fn hint(text: &str) -> ColoredString {
	text.cyan()
}
