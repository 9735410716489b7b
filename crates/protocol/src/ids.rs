//! Opaque protocol identifiers.
//!
//! Each identifier is a transparent string newtype so that a request id can never
//! be passed where a target id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! protocol_id {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(String);

		impl $name {
			pub fn new(id: impl Into<String>) -> Self {
				Self(id.into())
			}

			pub fn as_str(&self) -> &str {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(&self.0)
			}
		}

		impl From<&str> for $name {
			fn from(id: &str) -> Self {
				Self(id.to_string())
			}
		}

		impl From<String> for $name {
			fn from(id: String) -> Self {
				Self(id)
			}
		}
	};
}

protocol_id!(
	/// A debuggable target (tab or window) as reported by the `Target` domain.
	TargetId
);
protocol_id!(
	/// Flattened session id returned by `Target.attachToTarget`.
	SessionId
);
protocol_id!(
	/// Network exchange id, unique for the lifetime of the exchange.
	RequestId
);
protocol_id!(
	/// Script id assigned by `Debugger.scriptParsed`.
	ScriptId
);
protocol_id!(
	/// Frame id from the `Page` domain.
	FrameId
);
