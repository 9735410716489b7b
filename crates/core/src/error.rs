//! Error types for tabscope.

use tabscope_protocol::{RequestId, TargetId};
use thiserror::Error;

/// Result type alias for inspector operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	/// Another controller holds the target and the single forced retry did not help.
	#[error("target {target} is already being debugged by another client: {message}")]
	AttachConflict { target: TargetId, message: String },

	#[error("failed to attach to {target}: {source}")]
	Attach {
		target: TargetId,
		#[source]
		source: tabscope_runtime::Error,
	},

	/// The target was detached while the attach was still in flight.
	#[error("attach to {0} was cancelled before it completed")]
	AttachAborted(TargetId),

	/// Command addressed to a target without an attached session.
	#[error("target {0} is not attached")]
	NotAttached(TargetId),

	#[error("could not open inspection window for {target}: {reason}")]
	Surface { target: TargetId, reason: String },

	#[error("browser speaks protocol {actual}, expected {expected}")]
	UnsupportedProtocol { expected: String, actual: String },

	#[error("transport error: {0}")]
	Transport(#[from] tabscope_runtime::Error),

	/// A body or source could not be fetched. Distinct from an empty body.
	#[error("content unavailable for {subject}: {reason}")]
	ContentUnavailable { subject: String, reason: String },

	#[error("malformed url {url:?}: {source}")]
	MalformedUrl {
		url: String,
		#[source]
		source: url::ParseError,
	},

	#[error("no exchange with id {0}")]
	UnknownExchange(RequestId),

	#[error("no resource indexed for {0}")]
	UnknownResource(String),

	#[error("unexpected {method} payload: {source}")]
	Payload {
		method: String,
		#[source]
		source: serde_json::Error,
	},
}

impl Error {
	pub fn is_not_attached(&self) -> bool {
		matches!(self, Error::NotAttached(_))
	}

	pub fn is_content_unavailable(&self) -> bool {
		matches!(self, Error::ContentUnavailable { .. })
	}

	/// Human-readable diagnostic from the browser, when there is one.
	pub fn remote_message(&self) -> Option<&str> {
		match self {
			Error::Transport(e) | Error::Attach { source: e, .. } => e.remote_message(),
			_ => None,
		}
	}

	pub(crate) fn payload(method: &str, source: serde_json::Error) -> Self {
		Error::Payload {
			method: method.to_string(),
			source,
		}
	}
}
