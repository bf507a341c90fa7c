//! Local TCP listener and accept loop.
//!
//! Binding and serving are separate steps so callers (and tests) can bind to
//! port 0 and learn the real address via [`Proxy::local_addr`] before any
//! client connects.
//!
//! # Modes
//!
//! - **Forever**: each accepted connection runs in its own Tokio task and the
//!   loop accepts the next one immediately.  Session errors are reported to
//!   the observer and never reach the loop.
//! - **Single-shot**: the first accepted connection is served in place and
//!   its result is returned.  No further connections are accepted.
//!
//! Accept failures follow [`AcceptErrorPolicy`].

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};

use crate::application::{SessionObserver, TracingObserver};
use crate::domain::{AcceptErrorPolicy, ProxyConfig, ProxyError, SessionId};
use crate::infrastructure::session::run_session;

/// Pause after a failed `accept()` before trying again, so a persistent
/// failure (such as file-descriptor exhaustion) does not spin the loop.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

// ── Connection source ─────────────────────────────────────────────────────────

/// Where the accept loop takes its next client from.
///
/// [`TcpListener`] is the only production source.  Tests substitute sources
/// whose `accept()` fails on demand.
pub(crate) trait ConnectionSource: Send {
    fn next_connection(
        &mut self,
    ) -> impl Future<Output = io::Result<(TcpStream, SocketAddr)>> + Send;
}

impl ConnectionSource for TcpListener {
    fn next_connection(
        &mut self,
    ) -> impl Future<Output = io::Result<(TcpStream, SocketAddr)>> + Send {
        self.accept()
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Listens on a local address and bridges each client to the upstream.
pub async fn proxy(forever: bool, listen_address: &str, remote_url: &str) -> Result<(), ProxyError> {
    let config = ProxyConfig::new(listen_address, remote_url).with_run_forever(forever);
    Proxy::bind(config, Arc::new(TracingObserver)).await?.serve().await
}

/// A bound proxy, ready to serve.
pub struct Proxy {
    listener: TcpListener,
    local_addr: SocketAddr,
    config: Arc<ProxyConfig>,
    observer: Arc<dyn SessionObserver>,
}

impl Proxy {
    /// Binds the listener on `config.listen_addr` and reports `listening`.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Bind`] if the address cannot be resolved or
    /// bound.
    pub async fn bind(
        config: ProxyConfig,
        observer: Arc<dyn SessionObserver>,
    ) -> Result<Self, ProxyError> {
        let bind_error = |source| ProxyError::Bind {
            addr: config.listen_addr.clone(),
            source,
        };

        let listener = TcpListener::bind(config.listen_addr.as_str())
            .await
            .map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;

        observer.listening(local_addr);

        Ok(Self {
            listener,
            local_addr,
            config: Arc::new(config),
            observer,
        })
    }

    /// The address the listener is actually bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Runs the accept loop.
    ///
    /// In forever mode this returns only on a fatal accept error.  In
    /// single-shot mode it returns the result of the one session it serves.
    ///
    /// # Errors
    ///
    /// - [`ProxyError::Accept`] under [`AcceptErrorPolicy::Fatal`].
    /// - Any session error, in single-shot mode.
    pub async fn serve(self) -> Result<(), ProxyError> {
        accept_loop(self.listener, self.config, self.observer).await
    }
}

async fn accept_loop<L: ConnectionSource>(
    mut listener: L,
    config: Arc<ProxyConfig>,
    observer: Arc<dyn SessionObserver>,
) -> Result<(), ProxyError> {
    loop {
        let (stream, peer) = match listener.next_connection().await {
            Ok(pair) => pair,
            Err(e) => {
                let error = ProxyError::Accept(e);
                observer.accept_failed(&error);
                match config.accept_error_policy {
                    AcceptErrorPolicy::Fatal => return Err(error),
                    AcceptErrorPolicy::LogAndContinue => {
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                        continue;
                    }
                }
            }
        };

        let _ = stream.set_nodelay(true);
        let session = SessionId::new();
        observer.accepted(session, peer);

        let task = run_session(stream, session, Arc::clone(&config), Arc::clone(&observer));

        if !config.run_forever {
            // Stop listening before relaying; later clients are refused.
            drop(listener);
            return task.await;
        }

        // The outcome has already been reported to the observer.
        tokio::spawn(async move {
            let _ = task.await;
        });
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
