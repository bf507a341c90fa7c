//! Domain layer for tcp2ws.
//!
//! Pure types with no dependencies on sockets, async runtimes, or the
//! WebSocket library:
//!
//! - Configuration ([`ProxyConfig`], [`AcceptErrorPolicy`])
//! - The error vocabulary shared by every stage ([`ProxyError`])
//! - Session identity and pump results ([`SessionId`], [`PumpOutcome`])

pub mod config;
pub mod error;
pub mod session;

pub use config::{AcceptErrorPolicy, ProxyConfig, DEFAULT_LISTEN_ADDR};
pub use error::{ErrorStage, ProxyError, Side};
pub use session::{Direction, PumpOutcome, SessionId};
