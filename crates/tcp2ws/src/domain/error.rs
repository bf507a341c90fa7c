//! The proxy's error vocabulary.
//!
//! Errors fall into three stages, and the stage decides how far an error
//! travels:
//!
//! | Stage       | Variants                                           | Effect                        |
//! |-------------|----------------------------------------------------|-------------------------------|
//! | `Listener`  | `Bind`, `Accept`                                   | stops the whole proxy         |
//! | `Handshake` | `InvalidUrl`, `Dial`, `Handshake`, `UnsupportedProtocol` | ends one session, no relay |
//! | `Pump`      | `Decode`, `Read`, `Write`                          | ends one session mid-relay    |
//!
//! Session errors never reach the accept loop in forever mode.  In
//! single-shot mode the session's error is what `serve` returns.

use std::fmt;
use std::io;

use tcp2ws_core::CodecError;
use thiserror::Error;

/// Which connection of a session an I/O error happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The accepted local TCP connection.
    Tcp,
    /// The upstream WebSocket connection.
    WebSocket,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => f.write_str("TCP client"),
            Self::WebSocket => f.write_str("WebSocket upstream"),
        }
    }
}

/// Where in the proxy's lifecycle an error happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    /// Binding or accepting on the local listener.
    Listener,
    /// Opening and upgrading the upstream connection.
    Handshake,
    /// Relaying bytes after the handshake.
    Pump,
}

/// Every failure the proxy can report.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The local listen address could not be bound.
    #[error("failed to bind TCP listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// `accept()` on the local listener failed.
    #[error("failed to accept TCP connection: {0}")]
    Accept(#[source] io::Error),

    /// The remote URL cannot be used to reach an upstream.
    #[error("invalid remote URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The upstream's TCP endpoint could not be reached.
    #[error("failed to dial upstream {addr}: {source}")]
    Dial {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// The WebSocket upgrade failed (bad status, bad upgrade response, I/O).
    #[error("WebSocket handshake with {url} failed: {reason}")]
    Handshake { url: String, reason: String },

    /// The upstream chose a subprotocol other than `binary` or `base64`, or
    /// none at all.  `headers` holds the full response header list for
    /// diagnostics.
    #[error("upstream selected unsupported subprotocol {protocol:?} (expected \"binary\" or \"base64\")")]
    UnsupportedProtocol {
        protocol: String,
        headers: Vec<(String, String)>,
    },

    /// A base64-mode message could not be decoded.
    #[error("undecodable message from upstream: {0}")]
    Decode(#[from] CodecError),

    /// Reading from one side of the session failed.
    #[error("read from {side} failed: {reason}")]
    Read { side: Side, reason: String },

    /// Writing to one side of the session failed.
    #[error("write to {side} failed: {reason}")]
    Write { side: Side, reason: String },
}

impl ProxyError {
    /// Returns the lifecycle stage this error belongs to.
    pub fn stage(&self) -> ErrorStage {
        match self {
            Self::Bind { .. } | Self::Accept(_) => ErrorStage::Listener,
            Self::InvalidUrl { .. }
            | Self::Dial { .. }
            | Self::Handshake { .. }
            | Self::UnsupportedProtocol { .. } => ErrorStage::Handshake,
            Self::Decode(_) | Self::Read { .. } | Self::Write { .. } => ErrorStage::Pump,
        }
    }

    pub(crate) fn read(side: Side, reason: impl fmt::Display) -> Self {
        Self::Read {
            side,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(side: Side, reason: impl fmt::Display) -> Self {
        Self::Write {
            side,
            reason: reason.to_string(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
