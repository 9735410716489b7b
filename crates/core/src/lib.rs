//! tabscope: live network, resource and storage inspection for browser tabs.
//!
//! A [`SessionRegistry`] attaches to targets over a [`Host`] (in production a
//! [`CdpHost`] speaking the DevTools protocol), opens one inspection window per
//! attached target and keeps an [`Inspection`] for it: the network ledger, the
//! resource index and a command channel for on-demand content.
//!
//! # Example
//!
//! ```ignore
//! use tabscope::{CdpHost, InspectorOptions, SessionRegistry};
//!
//! #[tokio::main]
//! async fn main() -> tabscope::Result<()> {
//!     let (host, mut events) = CdpHost::connect("ws://127.0.0.1:9222/devtools/browser/abc").await?;
//!     let registry = SessionRegistry::new(host.clone(), InspectorOptions::default());
//!
//!     let target = "5D3C1A".into();
//!     registry.toggle(&target).await?;
//!
//!     while let Some(event) = events.recv().await {
//!         if let Some(signal) = host.route(event) {
//!             registry.handle(signal).await;
//!         }
//!         if !registry.status(&target).attached {
//!             break;
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod cdp;
pub mod channel;
pub mod error;
pub mod host;
pub mod inspection;
pub mod network;
pub mod options;
pub mod registry;
pub mod resources;
pub mod storage;

#[cfg(test)]
mod testing;

pub use cdp::CdpHost;
pub use channel::CommandChannel;
pub use error::{Error, Result};
pub use host::{AttachFailure, DebuggerHost, Host, HostSignal, SurfaceHost, SurfaceId, SurfaceSpec};
pub use inspection::Inspection;
pub use network::{
	ExchangeRecord, LedgerChanges, NetworkLedger, ResourceType, ResponseBody, Status, TypeFilter, format_bytes,
	format_duration,
};
pub use options::{InspectorOptions, OwnOrigins, SurfaceTemplate};
pub use registry::{SessionRegistry, SessionState, SessionStatus};
pub use resources::{ContentLocator, NodeKind, ResourceContent, ResourceIndex, TreeRow};
pub use storage::{StorageArea, StorageEntry};
pub use tabscope_protocol::{PROTOCOL_VERSION, RequestId, TargetId};
