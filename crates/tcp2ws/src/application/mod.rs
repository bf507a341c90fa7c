//! Application layer for tcp2ws.
//!
//! Decides *what* happens around a session without touching sockets:
//!
//! - [`SessionObserver`] – the lifecycle hooks every session reports through
//!   (listening, accepted, established, failed, closed).  The default
//!   [`TracingObserver`] turns them into `tracing` events; embedders can
//!   inject their own.
//! - [`TerminationSignal`] – the single-fire notification shared by the two
//!   pump loops of a session.

pub mod observer;
pub mod termination;

pub use observer::{SessionObserver, TracingObserver};
pub use termination::TerminationSignal;
