//! Frame codec: converts TCP chunks to WebSocket payloads and back.
//!
//! ```text
//! TCP → wire:  encode(mode, chunk)   -> WirePayload
//! wire → TCP:  decode(mode, payload) -> bytes
//! ```
//!
//! Both directions are one-to-one: a chunk is never split or merged.  The
//! size of outbound chunks is bounded by the pump's read buffer
//! ([`DEFAULT_READ_BUFFER_SIZE`] unless configured otherwise); inbound
//! messages are written to TCP at whatever size the server sent them.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

use crate::protocol::framing::{FramingMode, WirePayload};

/// Capacity of the TCP read buffer, and so the largest chunk carried by a
/// single outbound WebSocket message.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// Errors produced while decoding an inbound payload.
#[derive(Debug, Error, PartialEq)]
pub enum CodecError {
    /// A base64-mode message did not contain valid standard base64.
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes one TCP chunk into the payload of one outbound WebSocket message.
///
/// # Examples
///
/// ```rust
/// use tcp2ws_core::{encode, FramingMode, WirePayload};
///
/// assert_eq!(
///     encode(FramingMode::Base64Text, b"Hello"),
///     WirePayload::Text("SGVsbG8=".to_string())
/// );
/// assert_eq!(
///     encode(FramingMode::Binary, &[1, 2, 3]),
///     WirePayload::Binary(vec![1, 2, 3])
/// );
/// ```
pub fn encode(mode: FramingMode, chunk: &[u8]) -> WirePayload {
    match mode {
        FramingMode::Binary => WirePayload::Binary(chunk.to_vec()),
        // Standard alphabet with `=` padding, no line wrapping.
        FramingMode::Base64Text => WirePayload::Text(STANDARD.encode(chunk)),
    }
}

/// Decodes the payload of one inbound WebSocket message into the bytes to
/// write to TCP.
///
/// The payload is taken by value so binary mode can hand it straight through
/// without copying.  In base64 mode, CR and LF bytes are skipped before
/// decoding so line-wrapped encoders are accepted.
///
/// # Errors
///
/// Returns [`CodecError::InvalidBase64`] if a base64-mode payload is not
/// valid standard base64.
///
/// # Examples
///
/// ```rust
/// use tcp2ws_core::{decode, FramingMode};
///
/// assert_eq!(decode(FramingMode::Base64Text, b"AQID".to_vec()).unwrap(), vec![1, 2, 3]);
/// assert!(decode(FramingMode::Base64Text, b"not base64!".to_vec()).is_err());
/// ```
pub fn decode(mode: FramingMode, payload: Vec<u8>) -> Result<Vec<u8>, CodecError> {
    match mode {
        FramingMode::Binary => Ok(payload),
        FramingMode::Base64Text => {
            let result = if payload.iter().any(|b| *b == b'\r' || *b == b'\n') {
                let stripped: Vec<u8> = payload
                    .into_iter()
                    .filter(|b| *b != b'\r' && *b != b'\n')
                    .collect();
                STANDARD.decode(stripped)
            } else {
                STANDARD.decode(payload)
            };
            result.map_err(|e| CodecError::InvalidBase64(e.to_string()))
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
