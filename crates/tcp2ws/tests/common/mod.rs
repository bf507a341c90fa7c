//! Shared helpers for the bridge integration tests.
//!
//! - [`spawn_upstream`] starts a scripted WebSocket server on a loopback port
//!   that answers the handshake with a chosen `Sec-WebSocket-Protocol`.
//! - [`RecordingObserver`] collects the session lifecycle events a proxy
//!   reports.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use tcp2ws::{FramingMode, ProxyError, SessionId, SessionObserver};

/// Upper bound for any single wait in the integration tests.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

// ── Mock upstream ─────────────────────────────────────────────────────────────

/// What the mock upstream does once a client has upgraded.
#[derive(Debug, Clone)]
pub enum Behaviour {
    /// Send every binary or text message straight back.
    Echo,
    /// Send a Close frame right after the handshake.
    CloseImmediately,
    /// Send these messages, then echo like [`Behaviour::Echo`].
    SendThenEcho(Vec<WsMessage>),
    /// On the upstream's `n`th connection (counting from 0) send these
    /// messages first; every connection then echoes.
    SendOnConnectionThenEcho(usize, Vec<WsMessage>),
}

/// Something the mock upstream observed from a client.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamEvent {
    /// A binary or text message arrived.
    Message(WsMessage),
    /// The client sent Close or the connection ended.
    Closed,
}

/// Handle to a running mock upstream.
pub struct Upstream {
    /// `ws://` URL the upstream listens on.
    pub url: String,
    /// The `Sec-WebSocket-Protocol` request header of each handshake.
    pub offers: mpsc::UnboundedReceiver<Option<String>>,
    /// Everything the upstream saw after the handshake, in order.
    pub events: mpsc::UnboundedReceiver<UpstreamEvent>,
}

impl Upstream {
    /// Waits for the next handshake's offered subprotocol header.
    pub async fn next_offer(&mut self) -> Option<String> {
        tokio::time::timeout(TEST_TIMEOUT, self.offers.recv())
            .await
            .expect("timed out waiting for a handshake")
            .expect("upstream stopped")
    }

    /// Waits for the next event the upstream observed.
    pub async fn next_event(&mut self) -> UpstreamEvent {
        tokio::time::timeout(TEST_TIMEOUT, self.events.recv())
            .await
            .expect("timed out waiting for an upstream event")
            .expect("upstream stopped")
    }
}

/// Starts a mock upstream answering every handshake with `answer` as its
/// `Sec-WebSocket-Protocol` (or no such header for `None`).
pub async fn spawn_upstream(answer: Option<&'static str>, behaviour: Behaviour) -> Upstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let (offer_tx, offers) = mpsc::unbounded_channel();
    let (event_tx, events) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut index = 0usize;
        while let Ok((stream, _)) = listener.accept().await {
            let connection = index;
            index += 1;
            let offer_tx = offer_tx.clone();
            let event_tx = event_tx.clone();
            let behaviour = behaviour.clone();
            tokio::spawn(async move {
                let callback = |request: &Request, mut response: Response| {
                    let offered = request
                        .headers()
                        .get("sec-websocket-protocol")
                        .and_then(|value| value.to_str().ok())
                        .map(str::to_string);
                    let _ = offer_tx.send(offered);
                    if let Some(answer) = answer {
                        response
                            .headers_mut()
                            .insert("sec-websocket-protocol", HeaderValue::from_static(answer));
                    }
                    Ok::<Response, ErrorResponse>(response)
                };
                let Ok(mut ws) = accept_hdr_async(stream, callback).await else {
                    return;
                };

                match behaviour {
                    Behaviour::CloseImmediately => {
                        let _ = ws.close(None).await;
                    }
                    Behaviour::SendThenEcho(messages) => {
                        for message in messages {
                            if ws.send(message).await.is_err() {
                                return;
                            }
                        }
                    }
                    Behaviour::SendOnConnectionThenEcho(n, messages) if n == connection => {
                        for message in messages {
                            if ws.send(message).await.is_err() {
                                return;
                            }
                        }
                    }
                    Behaviour::SendOnConnectionThenEcho(..) | Behaviour::Echo => {}
                }

                while let Some(next) = ws.next().await {
                    match next {
                        Ok(message @ (WsMessage::Binary(_) | WsMessage::Text(_))) => {
                            let _ = event_tx.send(UpstreamEvent::Message(message.clone()));
                            if ws.send(message).await.is_err() {
                                break;
                            }
                        }
                        Ok(WsMessage::Close(_)) | Err(_) => break,
                        Ok(_) => {}
                    }
                }
                let _ = event_tx.send(UpstreamEvent::Closed);
            });
        }
    });

    Upstream {
        url: format!("ws://{addr}/tunnel"),
        offers,
        events,
    }
}

// ── Recording observer ────────────────────────────────────────────────────────

/// One lifecycle event, as reported to [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Accepted(SessionId),
    Established(SessionId, FramingMode),
    Failed(SessionId, String),
    Closed(SessionId),
}

/// Observer that stores every event for later assertions.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn closed_count(&self) -> usize {
        self.count(|event| matches!(event, Event::Closed(_)))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|event| matches!(event, Event::Failed(..)))
    }

    pub fn established_count(&self) -> usize {
        self.count(|event| matches!(event, Event::Established(..)))
    }

    /// Polls until `closed` has been reported `n` times.
    pub async fn wait_for_closed(&self, n: usize) {
        tokio::time::timeout(TEST_TIMEOUT, async {
            while self.closed_count() < n {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("timed out waiting for sessions to close");
    }

    fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| predicate(e)).count()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl SessionObserver for RecordingObserver {
    fn accepted(&self, session: SessionId, _peer: SocketAddr) {
        self.push(Event::Accepted(session));
    }

    fn established(&self, session: SessionId, mode: FramingMode) {
        self.push(Event::Established(session, mode));
    }

    fn session_failed(&self, session: SessionId, error: &ProxyError) {
        self.push(Event::Failed(session, error.to_string()));
    }

    fn closed(&self, session: SessionId) {
        self.push(Event::Closed(session));
    }
}
