use std::path::PathBuf;

use thiserror::Error;

use crate::output::{CommandError, ErrorCode};

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	#[error("no page target matches '{0}'")]
	TargetNotFound(String),

	#[error("target prefix '{prefix}' is ambiguous: {candidates}")]
	AmbiguousTarget { prefix: String, candidates: String },

	#[error("endpoint discovery failed at {url}: {reason}")]
	Discovery { url: String, reason: String },

	#[error("invalid config file {}: {source}", path.display())]
	Config {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("{0}")]
	Directive(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Inspector(#[from] tabscope::Error),

	#[error(transparent)]
	Anyhow(#[from] anyhow::Error),
}

impl CliError {
	/// Convert this error to a CommandError for structured output
	pub fn to_command_error(&self) -> CommandError {
		let (code, details) = match self {
			CliError::TargetNotFound(target) => (ErrorCode::TargetNotFound, Some(serde_json::json!({ "target": target }))),
			CliError::AmbiguousTarget { prefix, .. } => {
				(ErrorCode::InvalidInput, Some(serde_json::json!({ "target": prefix })))
			}
			CliError::Discovery { url, .. } => (ErrorCode::ConnectionFailed, Some(serde_json::json!({ "url": url }))),
			CliError::Config { path, .. } => (ErrorCode::ConfigError, Some(serde_json::json!({ "path": path }))),
			CliError::Directive(_) => (ErrorCode::InvalidInput, None),
			CliError::Io(_) => (ErrorCode::IoError, None),
			CliError::Anyhow(err) if err.root_cause().is::<std::io::Error>() => (ErrorCode::IoError, None),
			CliError::Json(_) | CliError::Anyhow(_) => (ErrorCode::InternalError, None),
			CliError::Inspector(err) => (classify_inspector_error(err), None),
		};

		CommandError {
			code,
			message: self.to_string(),
			details,
		}
	}
}

fn classify_inspector_error(err: &tabscope::Error) -> ErrorCode {
	use tabscope::Error;

	match err {
		Error::AttachConflict { .. } | Error::Attach { .. } | Error::AttachAborted(_) | Error::Surface { .. } => {
			ErrorCode::AttachFailed
		}
		Error::UnsupportedProtocol { .. } => ErrorCode::ConnectionFailed,
		Error::NotAttached(_) => ErrorCode::NotAttached,
		Error::ContentUnavailable { .. } => ErrorCode::ContentUnavailable,
		Error::UnknownExchange(_) | Error::UnknownResource(_) | Error::MalformedUrl { .. } => ErrorCode::InvalidInput,
		Error::Transport(err) if err.is_closed() => ErrorCode::ConnectionFailed,
		Error::Transport(_) | Error::Payload { .. } => ErrorCode::ProtocolError,
	}
}
