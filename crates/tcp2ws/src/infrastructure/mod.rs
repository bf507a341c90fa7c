//! Infrastructure layer for tcp2ws.
//!
//! Handles all I/O: the local TCP listener, the outbound WebSocket handshake,
//! and the two relay loops of every session.
//!
//! # Responsibilities
//!
//! - Binding the local TCP listener and accepting clients (`listener`)
//! - Dialing the upstream and negotiating the framing mode (`negotiator`)
//! - Capturing the raw handshake response for diagnostics (`transcript`)
//! - Relaying bytes in both directions until one side ends (`pump`)
//! - Tying one client to one upstream and tearing both down (`session`)

pub mod listener;
pub mod negotiator;
pub mod pump;
pub mod session;
pub mod transcript;

// Re-export the primary entry points.
pub use listener::{proxy, Proxy};
pub use negotiator::{negotiate, WsStream};
