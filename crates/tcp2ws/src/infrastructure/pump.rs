//! The two relay loops of a session.
//!
//! ```text
//!   TCP client ──read──► tcp_to_ws ──encode──► WebSocket sink
//!   TCP client ◄─write── ws_to_tcp ◄─decode─── WebSocket stream
//! ```
//!
//! Both loops race every read and write against the session's
//! [`TerminationSignal`], so whichever side ends first stops the other one
//! even while it is blocked in I/O.  A loop that ends on its own fires the
//! signal; only the first to fire reports its outcome, the other reports
//! [`PumpOutcome::Stopped`].

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tracing::{debug, trace};

use tcp2ws_core::{decode, encode, FramingMode, WirePayload};

use crate::application::TerminationSignal;
use crate::domain::{Direction, ProxyError, PumpOutcome, SessionId, Side};

// ── TCP → WebSocket ───────────────────────────────────────────────────────────

/// Reads chunks of at most `buffer_size` bytes from the TCP client and sends
/// each one to the upstream as a single message framed for `mode`.
///
/// Ends with [`PumpOutcome::PeerClosed`] on TCP EOF, or
/// [`PumpOutcome::Failed`] with a [`ProxyError::Read`] (TCP side) or
/// [`ProxyError::Write`] (WebSocket side).
pub async fn tcp_to_ws<R, S>(
    mut reader: R,
    sink: &mut S,
    mode: FramingMode,
    buffer_size: usize,
    signal: &TerminationSignal,
    session: SessionId,
) -> PumpOutcome
where
    R: AsyncRead + Unpin,
    S: Sink<WsMessage, Error = WsError> + Unpin,
{
    let mut buf = vec![0u8; buffer_size.max(1)];

    loop {
        let n = tokio::select! {
            biased;
            _ = signal.fired() => return PumpOutcome::Stopped,
            read = reader.read(&mut buf) => match read {
                Ok(0) => {
                    debug!("session {session}: TCP client closed");
                    return finish(signal, PumpOutcome::PeerClosed(Direction::TcpToWs));
                }
                Ok(n) => n,
                Err(e) => {
                    return finish(signal, PumpOutcome::Failed(ProxyError::read(Side::Tcp, e)))
                }
            },
        };

        trace!("session {session}: {} {n} bytes", Direction::TcpToWs);
        let message = into_message(encode(mode, &buf[..n]));

        tokio::select! {
            biased;
            _ = signal.fired() => return PumpOutcome::Stopped,
            sent = sink.send(message) => {
                if let Err(e) = sent {
                    return finish(
                        signal,
                        PumpOutcome::Failed(ProxyError::write(Side::WebSocket, e)),
                    );
                }
            }
        }
    }
}

// ── WebSocket → TCP ───────────────────────────────────────────────────────────

/// Receives upstream messages, decodes them for `mode` and writes the bytes
/// to the TCP client.
///
/// Binary and text messages are both decoded by the negotiated mode rather
/// than by their frame type.  Ping, pong and raw frames are skipped.  A
/// Close message, a closed connection or the end of the stream all end the
/// loop with [`PumpOutcome::PeerClosed`].
pub async fn ws_to_tcp<St, W>(
    stream: &mut St,
    writer: &mut W,
    mode: FramingMode,
    signal: &TerminationSignal,
    session: SessionId,
) -> PumpOutcome
where
    St: Stream<Item = Result<WsMessage, WsError>> + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        let next = tokio::select! {
            biased;
            _ = signal.fired() => return PumpOutcome::Stopped,
            next = stream.next() => next,
        };

        let payload = match next {
            Some(Ok(WsMessage::Binary(bytes))) => bytes,
            Some(Ok(WsMessage::Text(text))) => text.into_bytes(),
            Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_))) => continue,
            Some(Ok(WsMessage::Close(frame))) => {
                debug!("session {session}: upstream sent Close ({frame:?})");
                return finish(signal, PumpOutcome::PeerClosed(Direction::WsToTcp));
            }
            Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) | None => {
                debug!("session {session}: upstream connection ended");
                return finish(signal, PumpOutcome::PeerClosed(Direction::WsToTcp));
            }
            Some(Err(e)) => {
                return finish(
                    signal,
                    PumpOutcome::Failed(ProxyError::read(Side::WebSocket, e)),
                )
            }
        };

        let bytes = match decode(mode, payload) {
            Ok(bytes) => bytes,
            Err(e) => return finish(signal, PumpOutcome::Failed(e.into())),
        };
        if bytes.is_empty() {
            continue;
        }

        trace!("session {session}: {} {} bytes", Direction::WsToTcp, bytes.len());

        tokio::select! {
            biased;
            _ = signal.fired() => return PumpOutcome::Stopped,
            written = writer.write_all(&bytes) => {
                if let Err(e) = written {
                    return finish(signal, PumpOutcome::Failed(ProxyError::write(Side::Tcp, e)));
                }
            }
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Fires `signal` and keeps `outcome` only if this pump fired it first.
fn finish(signal: &TerminationSignal, outcome: PumpOutcome) -> PumpOutcome {
    if signal.fire() {
        outcome
    } else {
        PumpOutcome::Stopped
    }
}

fn into_message(payload: WirePayload) -> WsMessage {
    match payload {
        WirePayload::Binary(bytes) => WsMessage::Binary(bytes),
        WirePayload::Text(text) => WsMessage::Text(text),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
