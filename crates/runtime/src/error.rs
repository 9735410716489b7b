//! Runtime errors.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	/// The WebSocket handshake with the browser failed.
	#[error("cannot reach browser at {0}")]
	ConnectionFailed(String),

	/// WebSocket read or write failed on an established connection.
	#[error("websocket failure: {0}")]
	TransportError(String),

	/// A frame that does not fit the JSON-RPC exchange.
	#[error("unexpected frame: {0}")]
	ProtocolError(String),

	/// The browser rejected a command.
	#[error("{message} ({code})")]
	Remote {
		/// JSON-RPC error code, `-32000` for most domain failures
		code: i64,
		message: String,
		data: Option<String>,
	},

	/// The connection closed before the reply arrived, or was already closed.
	#[error("browser connection closed")]
	ChannelClosed,

	#[error("invalid JSON: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// The browser's diagnostic for a rejected command.
	pub fn remote_message(&self) -> Option<&str> {
		match self {
			Error::Remote { message, .. } => Some(message),
			_ => None,
		}
	}

	/// True when the connection is gone and retrying on it is pointless.
	pub fn is_closed(&self) -> bool {
		matches!(self, Error::ChannelClosed | Error::TransportError(_))
	}
}
