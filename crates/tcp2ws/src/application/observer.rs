//! Session lifecycle observation.
//!
//! The listener and session code never log directly; they call a
//! [`SessionObserver`] handed to them at construction.  That keeps the
//! lifecycle reporting swappable (tests record events, embedders forward them
//! to their own telemetry) while the binary uses [`TracingObserver`].

use std::net::SocketAddr;

use tcp2ws_core::FramingMode;
use tracing::{debug, error, info, warn};

use crate::domain::{ErrorStage, ProxyError, SessionId};

/// Receives lifecycle events from the listener and its sessions.
///
/// Every method has an empty default so implementors only override what they
/// care about.  Methods are called from many tasks at once and must not block.
///
/// For each accepted connection the order is:
///
/// ```text
/// accepted → [established] → [session_failed] → closed
/// ```
///
/// `closed` is reported exactly once per accepted connection, whether or not
/// the handshake succeeded.
#[cfg_attr(test, mockall::automock)]
pub trait SessionObserver: Send + Sync {
    /// The listener is bound and about to accept.
    fn listening(&self, _local_addr: SocketAddr) {}

    /// `accept()` failed.  Whether the listener stops depends on the
    /// configured [`crate::AcceptErrorPolicy`].
    fn accept_failed(&self, _error: &ProxyError) {}

    /// A TCP client connected; a session has been created for it.
    fn accepted(&self, _session: SessionId, _peer: SocketAddr) {}

    /// The upstream handshake succeeded and relaying starts.
    fn established(&self, _session: SessionId, _mode: FramingMode) {}

    /// The session ended with an error.
    fn session_failed(&self, _session: SessionId, _error: &ProxyError) {}

    /// Both connections of the session are closed.
    fn closed(&self, _session: SessionId) {}
}

/// [`SessionObserver`] that emits `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SessionObserver for TracingObserver {
    fn listening(&self, local_addr: SocketAddr) {
        info!("listening on {local_addr}");
    }

    fn accept_failed(&self, error: &ProxyError) {
        error!("{error}");
    }

    fn accepted(&self, session: SessionId, peer: SocketAddr) {
        info!("session {session}: TCP connection received from {peer}");
    }

    fn established(&self, session: SessionId, mode: FramingMode) {
        info!("session {session}: WebSocket connection established ({mode} framing), proxying");
    }

    fn session_failed(&self, session: SessionId, error: &ProxyError) {
        match error.stage() {
            ErrorStage::Handshake => {
                warn!("session {session}: upstream handshake failed: {error}");
                if let ProxyError::UnsupportedProtocol { headers, .. } = error {
                    for (name, value) in headers {
                        debug!("session {session}:   {name}: {value}");
                    }
                }
            }
            ErrorStage::Pump | ErrorStage::Listener => {
                warn!("session {session}: closed with error: {error}");
            }
        }
    }

    fn closed(&self, session: SessionId) {
        info!("session {session}: connection closed");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
