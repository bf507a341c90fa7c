//! One bridged TCP/WebSocket pair, from handshake to teardown.
//!
//! # Lifecycle
//!
//! 1. Negotiate with the upstream.  On failure the TCP client is closed
//!    without any data relayed.
//! 2. Split both connections and run the two pumps concurrently: TCP→WS in a
//!    spawned task, WS→TCP in the session's own task.
//! 3. When either pump ends, the shared [`TerminationSignal`] stops the other.
//! 4. Close each connection once: a WebSocket Close to the upstream, a write
//!    shutdown to the TCP client, then drop both.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::application::{SessionObserver, TerminationSignal};
use crate::domain::{ProxyConfig, ProxyError, PumpOutcome, SessionId, Side};
use crate::infrastructure::negotiator::negotiate;
use crate::infrastructure::pump::{tcp_to_ws, ws_to_tcp};

/// How long teardown waits for the WebSocket Close frame to be flushed.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Runs the whole lifecycle of the session for an accepted `tcp` connection.
///
/// Reports `established`, `session_failed` and `closed` to `observer`;
/// `closed` is reported exactly once, whatever the outcome.
///
/// Returns `Ok(())` when either peer closed cleanly, otherwise the error that
/// ended the session first.
pub async fn run_session(
    tcp: TcpStream,
    session: SessionId,
    config: Arc<ProxyConfig>,
    observer: Arc<dyn SessionObserver>,
) -> Result<(), ProxyError> {
    let result = bridge(tcp, session, &config, observer.as_ref()).await;
    if let Err(e) = &result {
        observer.session_failed(session, e);
    }
    observer.closed(session);
    result
}

async fn bridge(
    mut tcp: TcpStream,
    session: SessionId,
    config: &ProxyConfig,
    observer: &dyn SessionObserver,
) -> Result<(), ProxyError> {
    // ── Step 1: Handshake ─────────────────────────────────────────────────────
    let (ws, mode) = match negotiate(&config.remote_url).await {
        Ok(pair) => pair,
        Err(e) => {
            let _ = tcp.shutdown().await;
            return Err(e);
        }
    };
    observer.established(session, mode);

    // ── Step 2: Relay ─────────────────────────────────────────────────────────
    let signal = Arc::new(TerminationSignal::new());
    let (tcp_read, mut tcp_write) = tcp.into_split();
    let (mut ws_sink, mut ws_stream) = ws.split();

    let buffer_size = config.read_buffer_size;
    let upstream = tokio::spawn({
        let signal = Arc::clone(&signal);
        async move {
            // Stops the other pump even if this task unwinds.
            let _guard = FireOnDrop(Arc::clone(&signal));
            let outcome =
                tcp_to_ws(tcp_read, &mut ws_sink, mode, buffer_size, &signal, session).await;
            (outcome, ws_sink)
        }
    });

    let downstream = ws_to_tcp(&mut ws_stream, &mut tcp_write, mode, &signal, session).await;

    let (upstream, ws_sink) = match upstream.await {
        Ok((outcome, sink)) => (outcome, Some(sink)),
        Err(e) => (
            PumpOutcome::Failed(ProxyError::read(Side::Tcp, format!("relay task failed: {e}"))),
            None,
        ),
    };

    // ── Step 3: Teardown ──────────────────────────────────────────────────────
    if let Some(mut sink) = ws_sink {
        match timeout(CLOSE_TIMEOUT, sink.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!("session {session}: WebSocket close: {e}"),
            Err(_) => debug!("session {session}: WebSocket close timed out"),
        }
    }
    if let Err(e) = tcp_write.shutdown().await {
        debug!("session {session}: TCP shutdown: {e}");
    }

    upstream.into_session_result(downstream)
}

/// Fires the wrapped signal when dropped.
struct FireOnDrop(Arc<TerminationSignal>);

impl Drop for FireOnDrop {
    fn drop(&mut self) {
        self.0.fire();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
