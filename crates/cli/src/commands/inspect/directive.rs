//! Operator directives read from stdin, one per line.

use std::path::PathBuf;
use std::str::FromStr;

use tabscope::{RequestId, StorageArea, TypeFilter};

use crate::error::{CliError, Result};

pub const HELP: &[(&str, &str)] = &[
	("status", "session and view state"),
	("toggle", "detach the target"),
	("clear", "discard the network log"),
	("filter <type|all>", "show one category (doc, css, img, media, font, js, xhr, fetch, ws, other)"),
	("preserve [on|off]", "keep the log across navigations"),
	("hide-own [on|off]", "hide the inspector's own requests"),
	("list", "print the visible network log"),
	("tree", "print the resource tree"),
	("expand <path>", "expand or collapse a tree folder (host/dir/...)"),
	("open <url>", "print a resource's content"),
	("body <#n|id>", "print a response body"),
	("curl <#n|id> [file]", "print or save a curl command reproducing a request"),
	("storage <local|session|cookies> [list|delete <key>|clear]", "inspect or edit storage"),
	("refresh", "re-read the page's resource tree"),
	("help", "this list"),
	("quit", "detach and exit"),
];

/// An exchange as the operator names it: a 1-based row in the visible log, or a raw id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeRef {
	Row(usize),
	Id(RequestId),
}

impl FromStr for ExchangeRef {
	type Err = CliError;

	fn from_str(s: &str) -> Result<Self> {
		let digits = s.strip_prefix('#').unwrap_or(s);
		match digits.parse::<usize>() {
			Ok(0) => Err(CliError::Directive("rows are numbered from 1".to_string())),
			Ok(row) => Ok(ExchangeRef::Row(row)),
			Err(_) if s.starts_with('#') => Err(CliError::Directive(format!("invalid row '{s}'"))),
			Err(_) => Ok(ExchangeRef::Id(RequestId::new(s))),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageAction {
	List,
	Delete(String),
	Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
	Status,
	Toggle,
	Clear,
	Filter(TypeFilter),
	/// `None` flips the current value.
	Preserve(Option<bool>),
	HideOwn(Option<bool>),
	List,
	Tree,
	Expand(String),
	Open(String),
	Body(ExchangeRef),
	Curl { exchange: ExchangeRef, file: Option<PathBuf> },
	Storage { area: StorageArea, action: StorageAction },
	Refresh,
	Help,
	Quit,
}

impl Directive {
	pub fn name(&self) -> &'static str {
		match self {
			Directive::Status => "status",
			Directive::Toggle => "toggle",
			Directive::Clear => "clear",
			Directive::Filter(_) => "filter",
			Directive::Preserve(_) => "preserve",
			Directive::HideOwn(_) => "hide-own",
			Directive::List => "list",
			Directive::Tree => "tree",
			Directive::Expand(_) => "expand",
			Directive::Open(_) => "open",
			Directive::Body(_) => "body",
			Directive::Curl { .. } => "curl",
			Directive::Storage { .. } => "storage",
			Directive::Refresh => "refresh",
			Directive::Help => "help",
			Directive::Quit => "quit",
		}
	}

	/// Parses one input line. Blank lines and `#` comments yield `None`.
	pub fn parse(line: &str) -> Result<Option<Self>> {
		let line = line.trim();
		if line.is_empty() || line.starts_with("# ") || line == "#" {
			return Ok(None);
		}

		let mut words = line.split_whitespace();
		let Some(verb) = words.next() else {
			return Ok(None);
		};
		let args: Vec<&str> = words.collect();

		let directive = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
			("status", []) => Directive::Status,
			("toggle", []) => Directive::Toggle,
			("clear", []) => Directive::Clear,
			("filter", [kind]) => Directive::Filter(kind.parse().map_err(CliError::Directive)?),
			("preserve", rest) => Directive::Preserve(switch(rest)?),
			("hide-own", rest) => Directive::HideOwn(switch(rest)?),
			("list" | "ls", []) => Directive::List,
			("tree", []) => Directive::Tree,
			("expand", [path]) => Directive::Expand(path.trim_end_matches('/').to_string()),
			("open", [url]) => Directive::Open((*url).to_string()),
			("body", [exchange]) => Directive::Body(exchange.parse()?),
			("curl", [exchange]) => Directive::Curl {
				exchange: exchange.parse()?,
				file: None,
			},
			("curl", [exchange, file]) => Directive::Curl {
				exchange: exchange.parse()?,
				file: Some(PathBuf::from(file)),
			},
			("storage", [area, rest @ ..]) => Directive::Storage {
				area: area.parse().map_err(CliError::Directive)?,
				action: storage_action(rest)?,
			},
			("refresh", []) => Directive::Refresh,
			("help" | "?", []) => Directive::Help,
			("quit" | "exit" | "q", []) => Directive::Quit,
			(verb, _) if HELP.iter().any(|(usage, _)| usage.split(' ').next() == Some(verb)) => {
				return Err(CliError::Directive(format!("wrong arguments for '{verb}', see 'help'")));
			}
			(verb, _) => return Err(CliError::Directive(format!("unknown directive '{verb}', see 'help'"))),
		};
		Ok(Some(directive))
	}
}

fn switch(args: &[&str]) -> Result<Option<bool>> {
	match args {
		[] => Ok(None),
		[value] => match value.to_ascii_lowercase().as_str() {
			"on" | "true" | "yes" | "1" => Ok(Some(true)),
			"off" | "false" | "no" | "0" => Ok(Some(false)),
			other => Err(CliError::Directive(format!("expected on or off, got '{other}'"))),
		},
		_ => Err(CliError::Directive("expected at most one of on/off".to_string())),
	}
}

fn storage_action(args: &[&str]) -> Result<StorageAction> {
	match args {
		[] | ["list"] => Ok(StorageAction::List),
		["delete", key] => Ok(StorageAction::Delete((*key).to_string())),
		["clear"] => Ok(StorageAction::Clear),
		_ => Err(CliError::Directive("expected list, delete <key> or clear".to_string())),
	}
}
