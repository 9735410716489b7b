//! Chrome DevTools Protocol wire types for tabscope.
//!
//! Only the slice of the protocol the inspector consumes is modelled here: the
//! `Target` domain for attaching and opening inspection windows, the `Network`,
//! `Debugger` and `Page` events that feed the ledger and the resource index, and
//! the `DOMStorage` commands behind the storage view.
//!
//! All payloads deserialize leniently: optional protocol fields are `Option`s and
//! unknown fields are ignored, so newer browsers keep working.
//!
//! # Main Types
//!
//! - [`TargetId`], [`SessionId`], [`RequestId`], [`ScriptId`], [`FrameId`] - opaque identifiers
//! - [`Headers`] - header map that tolerates non-string values
//! - [`network`], [`debugger`], [`page`], [`target`], [`storage`], [`browser`] - per-domain payloads


pub mod browser;
pub mod debugger;
pub mod headers;
pub mod ids;
pub mod network;
pub mod page;
pub mod storage;
pub mod target;

pub use headers::Headers;
pub use ids::{FrameId, RequestId, ScriptId, SessionId, TargetId};

/// Protocol version requested when attaching to a target.
pub const PROTOCOL_VERSION: &str = "1.3";

/// Event and command method names.
pub mod methods {
	pub const REQUEST_WILL_BE_SENT: &str = "Network.requestWillBeSent";
	pub const REQUEST_WILL_BE_SENT_EXTRA_INFO: &str = "Network.requestWillBeSentExtraInfo";
	pub const RESPONSE_RECEIVED: &str = "Network.responseReceived";
	pub const LOADING_FINISHED: &str = "Network.loadingFinished";
	pub const LOADING_FAILED: &str = "Network.loadingFailed";
	pub const SCRIPT_PARSED: &str = "Debugger.scriptParsed";
	pub const FRAME_NAVIGATED: &str = "Page.frameNavigated";
	pub const DETACHED_FROM_TARGET: &str = "Target.detachedFromTarget";
	pub const TARGET_DESTROYED: &str = "Target.targetDestroyed";

	pub const NETWORK_ENABLE: &str = "Network.enable";
	pub const PAGE_ENABLE: &str = "Page.enable";
	pub const DEBUGGER_ENABLE: &str = "Debugger.enable";
	pub const DOM_STORAGE_ENABLE: &str = "DOMStorage.enable";
	pub const GET_RESPONSE_BODY: &str = "Network.getResponseBody";
	pub const GET_COOKIES: &str = "Network.getCookies";
	pub const DELETE_COOKIES: &str = "Network.deleteCookies";
	pub const GET_SCRIPT_SOURCE: &str = "Debugger.getScriptSource";
	pub const GET_RESOURCE_TREE: &str = "Page.getResourceTree";
	pub const GET_RESOURCE_CONTENT: &str = "Page.getResourceContent";
	pub const GET_DOM_STORAGE_ITEMS: &str = "DOMStorage.getDOMStorageItems";
	pub const REMOVE_DOM_STORAGE_ITEM: &str = "DOMStorage.removeDOMStorageItem";
	pub const CLEAR_DOM_STORAGE: &str = "DOMStorage.clear";
	pub const ATTACH_TO_TARGET: &str = "Target.attachToTarget";
	pub const DETACH_FROM_TARGET: &str = "Target.detachFromTarget";
	pub const CREATE_TARGET: &str = "Target.createTarget";
	pub const CLOSE_TARGET: &str = "Target.closeTarget";
	pub const GET_TARGETS: &str = "Target.getTargets";
	pub const SET_DISCOVER_TARGETS: &str = "Target.setDiscoverTargets";
	pub const GET_VERSION: &str = "Browser.getVersion";
}
