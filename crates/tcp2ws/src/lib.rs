//! tcp2ws library crate.
//!
//! Bridges plain TCP connections to an upstream WebSocket server so legacy
//! TCP clients can talk through infrastructure that only carries WebSocket
//! traffic.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! TCP client (raw bytes)
//!         ↕
//! [tcp2ws]
//!   ├── domain/           Pure types: ProxyConfig, ProxyError, SessionId, PumpOutcome
//!   ├── application/      SessionObserver (lifecycle hooks), TerminationSignal
//!   └── infrastructure/
//!         ├── listener/   Accept loop, forever or single-shot
//!         ├── negotiator/ Outbound WebSocket handshake + subprotocol choice
//!         ├── transcript/ Raw handshake response capture for diagnostics
//!         ├── pump/       TCP→WS and WS→TCP relay loops
//!         └── session/    One bridged pair and its teardown
//!         ↕
//! Upstream WebSocket server (binary or base64 text messages)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async runtime types.
//! - `application` depends on `domain`; its only runtime type is the
//!   `tokio::sync::Notify` inside [`TerminationSignal`].
//! - `infrastructure` depends on all other layers plus `tokio` and
//!   `tokio-tungstenite`.
//!
//! # Entry point
//!
//! ```no_run
//! # async fn example() -> Result<(), tcp2ws::ProxyError> {
//! // Listen on localhost:3333 and bridge every connection to the upstream.
//! tcp2ws::proxy(true, "localhost:3333", "ws://127.0.0.1:8080/tunnel").await
//! # }
//! ```

/// Domain layer: configuration, errors and session vocabulary (no I/O).
pub mod domain;

/// Application layer: lifecycle observation and pump coordination.
pub mod application;

/// Infrastructure layer: sockets, handshake, relay loops.
pub mod infrastructure;

pub use application::{SessionObserver, TerminationSignal, TracingObserver};
pub use domain::{AcceptErrorPolicy, ProxyConfig, ProxyError, SessionId};
pub use infrastructure::listener::{proxy, Proxy};
pub use tcp2ws_core::FramingMode;
