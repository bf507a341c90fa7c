//! # tcp2ws-core
//!
//! Shared, I/O-free building blocks for the tcp2ws bridge.
//!
//! The bridge relays a raw TCP byte stream over a WebSocket connection.  Each
//! chunk read from TCP becomes exactly one WebSocket message, and each
//! WebSocket message becomes one write on the TCP side.  How the bytes look on
//! the wire depends on the *framing mode* the upstream server picks during the
//! handshake:
//!
//! - **`binary`** – the chunk travels unchanged in a binary message.
//! - **`base64`** – the chunk is base64-encoded and sent as a text message,
//!   for upstreams that only understand text frames.
//!
//! This crate defines that vocabulary ([`FramingMode`], the subprotocol
//! tokens) and the pure transforms between a TCP chunk and its wire payload
//! ([`encode`] / [`decode`]).  It has no dependencies on sockets, async
//! runtimes, or the WebSocket library, so every rule here is testable in
//! isolation.

pub mod protocol;

// Re-export the most-used items at the crate root so callers can write
// `tcp2ws_core::FramingMode` instead of the full module path.
pub use protocol::codec::{decode, encode, CodecError, DEFAULT_READ_BUFFER_SIZE};
pub use protocol::framing::{
    FramingMode, WirePayload, SUBPROTOCOL_BASE64, SUBPROTOCOL_BINARY, SUPPORTED_SUBPROTOCOLS,
};
