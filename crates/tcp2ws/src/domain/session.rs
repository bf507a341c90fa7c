//! Session identity and pump results.

use std::fmt;

use uuid::Uuid;

use crate::domain::error::ProxyError;

/// Identifies one bridged TCP/WebSocket pair in log output.
///
/// Displayed as the first eight hex digits of a random UUID, which is short
/// enough to scan in logs and unique enough for correlating one session's
/// lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let simple = self.0.simple().to_string();
        f.write_str(&simple[..8])
    }
}

/// The two relay directions of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Local TCP client → upstream WebSocket.
    TcpToWs,
    /// Upstream WebSocket → local TCP client.
    WsToTcp,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TcpToWs => f.write_str("tcp→ws"),
            Self::WsToTcp => f.write_str("ws→tcp"),
        }
    }
}

/// How one pump loop ended.
///
/// Only the pump that fires the session's termination signal first reports
/// `PeerClosed` or `Failed`; the other one always reports `Stopped`.
#[derive(Debug)]
pub enum PumpOutcome {
    /// The pump's source closed cleanly (TCP EOF or a WebSocket Close).
    PeerClosed(Direction),
    /// The pump hit an error.
    Failed(ProxyError),
    /// The pump stopped because the other direction ended first.
    Stopped,
}

impl PumpOutcome {
    /// `true` if this pump ended the session.
    pub fn ended_session(&self) -> bool {
        !matches!(self, Self::Stopped)
    }

    /// Combines the outcomes of a session's two pumps into the session's
    /// result.  At most one of them ended the session; that one decides.
    pub fn into_session_result(self, other: PumpOutcome) -> Result<(), ProxyError> {
        let decisive = if self.ended_session() { self } else { other };
        match decisive {
            Self::Failed(err) => Err(err),
            Self::PeerClosed(_) | Self::Stopped => Ok(()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::Side;

    #[test]
    fn test_session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn test_session_id_displays_eight_hex_digits() {
        let shown = SessionId::new().to_string();
        assert_eq!(shown.len(), 8);
        assert!(shown.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_stopped_pump_did_not_end_session() {
        assert!(!PumpOutcome::Stopped.ended_session());
        assert!(PumpOutcome::PeerClosed(Direction::TcpToWs).ended_session());
    }

    #[test]
    fn test_peer_close_is_a_clean_session_end() {
        let result =
            PumpOutcome::PeerClosed(Direction::TcpToWs).into_session_result(PumpOutcome::Stopped);
        assert!(result.is_ok());
    }

    #[test]
    fn test_failure_from_either_pump_becomes_session_error() {
        let failed = || PumpOutcome::Failed(ProxyError::read(Side::WebSocket, "reset"));

        let first = PumpOutcome::Stopped.into_session_result(failed());
        let second = failed().into_session_result(PumpOutcome::Stopped);

        assert!(matches!(first, Err(ProxyError::Read { side: Side::WebSocket, .. })));
        assert!(matches!(second, Err(ProxyError::Read { .. })));
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::TcpToWs.to_string(), "tcp→ws");
        assert_eq!(Direction::WsToTcp.to_string(), "ws→tcp");
    }
}
