//! Session Layer
//!
//! The JSON message protocol spoken over each WebSocket connection, and the
//! process-wide context every connection shares.

pub mod context;
pub mod handler;
pub mod messages;

pub use context::{AppContext, SessionSettings, Thresholds};
pub use handler::SessionHandler;
pub use messages::{InboundMessage, OutboundMessage, ParseError, ServerEvent};
