//! Single-fire termination signal shared by a session's two pumps.
//!
//! # Contract
//!
//! - [`TerminationSignal::fire`] flips the signal once.  It returns `true`
//!   only to the first caller, which is how a pump learns that *it* ended the
//!   session (first-failure-wins).
//! - [`TerminationSignal::fired`] resolves as soon as the signal has been
//!   fired, including when it was fired before the call.  Pumps race it
//!   against every read and write, so a pump blocked in I/O stops promptly.
//!
//! The flag is an `AtomicBool`; the wake-up is a `tokio::sync::Notify`.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Notification that stops both pumps of one session.
#[derive(Debug, Default)]
pub struct TerminationSignal {
    fired: AtomicBool,
    notify: Notify,
}

impl TerminationSignal {
    /// Creates an unfired signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the signal.  Returns `true` if this call was the one that fired
    /// it, `false` if it had already been fired.
    pub fn fire(&self) -> bool {
        let first = !self.fired.swap(true, Ordering::AcqRel);
        if first {
            self.notify.notify_waiters();
        }
        first
    }

    /// Returns `true` once the signal has been fired.
    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    /// Waits until the signal is fired.
    pub async fn fired(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register as a waiter before checking the flag, otherwise a fire()
        // between the check and the await would be missed.
        notified.as_mut().enable();
        if self.is_fired() {
            return;
        }
        notified.await;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
