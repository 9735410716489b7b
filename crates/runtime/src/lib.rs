//! tabscope runtime - transport and connection
//!
//! This crate provides the low-level plumbing for talking to a browser over the
//! Chrome DevTools Protocol:
//!
//! - **Transport**: bidirectional JSON messages over the browser WebSocket, plus an
//!   in-memory fake for tests
//! - **Connection**: JSON-RPC request/response correlation and the event stream
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │   tabscope   │  Session registry, ledger, resource index
//! └──────┬───────┘
//!        │ send_command / take_events
//! ┌──────▼───────┐
//! │   runtime    │  This crate
//! │  ┌────────┐  │
//! │  │ Conn   │  │  id correlation, event queue
//! │  └────────┘  │
//! │  ┌────────┐  │
//! │  │ Trans  │  │  WebSocket / fake
//! │  └────────┘  │
//! └──────────────┘
//! ```

pub mod connection;
pub mod error;
pub mod transport;

pub use connection::{Connection, ErrorPayload, Event, Message, Request, Response};
pub use error::{Error, Result};
pub use transport::fake::{FakeTransportBuilder, FakeTransportController};
pub use transport::{
	Transport, TransportParts, TransportReceiver, WebSocketTransport, WebSocketTransportReceiver,
	WebSocketTransportSender,
};
