//! Framing modes and the WebSocket subprotocol tokens that select them.
//!
//! During the handshake the bridge offers both tokens in a single
//! `Sec-WebSocket-Protocol` request header, in this order:
//!
//! ```text
//! Sec-WebSocket-Protocol: binary,base64
//! ```
//!
//! The tokens are joined without whitespace: the WebSocket client splits the
//! offer on `,` and does not trim, so `binary, base64` would make it reject a
//! server that answers `base64`.
//!
//! The upstream server answers with the one it wants.  That answer is final
//! for the lifetime of the connection; there is no renegotiation.

use std::fmt;

/// Subprotocol token for raw binary framing.
pub const SUBPROTOCOL_BINARY: &str = "binary";

/// Subprotocol token for base64-in-text framing.
pub const SUBPROTOCOL_BASE64: &str = "base64";

/// Every subprotocol the bridge can speak, in the order it offers them.
pub const SUPPORTED_SUBPROTOCOLS: [&str; 2] = [SUBPROTOCOL_BINARY, SUBPROTOCOL_BASE64];

/// How application bytes are represented inside WebSocket messages.
///
/// # Examples
///
/// ```rust
/// use tcp2ws_core::FramingMode;
///
/// assert_eq!(FramingMode::from_subprotocol("base64"), Some(FramingMode::Base64Text));
/// assert_eq!(FramingMode::from_subprotocol("json"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramingMode {
    /// Bytes are carried unchanged in binary messages.
    Binary,
    /// Bytes are base64-encoded and carried in text messages.
    Base64Text,
}

impl FramingMode {
    /// Maps the server's chosen subprotocol token to a framing mode.
    ///
    /// Tokens are compared exactly (subprotocol names are case-sensitive).
    /// Surrounding whitespace is ignored because header values are often
    /// written as `binary, base64`.  Returns `None` for anything the bridge
    /// does not implement, including the empty string.
    pub fn from_subprotocol(token: &str) -> Option<Self> {
        match token.trim() {
            SUBPROTOCOL_BINARY => Some(Self::Binary),
            SUBPROTOCOL_BASE64 => Some(Self::Base64Text),
            _ => None,
        }
    }

    /// Returns the subprotocol token that selects this mode.
    pub fn subprotocol(self) -> &'static str {
        match self {
            Self::Binary => SUBPROTOCOL_BINARY,
            Self::Base64Text => SUBPROTOCOL_BASE64,
        }
    }

    /// Builds the `Sec-WebSocket-Protocol` request header value offering
    /// every supported mode.
    pub fn offer_header_value() -> String {
        SUPPORTED_SUBPROTOCOLS.join(",")
    }
}

impl fmt::Display for FramingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.subprotocol())
    }
}

/// One outbound WebSocket message payload, typed by the message kind it must
/// be sent as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WirePayload {
    /// Send as a binary message.
    Binary(Vec<u8>),
    /// Send as a text message.
    Text(String),
}

impl WirePayload {
    /// Length of the payload in bytes as it will appear on the wire.
    pub fn len(&self) -> usize {
        match self {
            Self::Binary(bytes) => bytes.len(),
            Self::Text(text) => text.len(),
        }
    }

    /// Returns `true` if the payload carries no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
