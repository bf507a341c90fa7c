//! Outbound WebSocket handshake and framing-mode negotiation.
//!
//! ```text
//! remote_url ──parse──► host:port ──dial──► TcpStream
//!                                              │
//!            GET /path HTTP/1.1                ▼
//!            Sec-WebSocket-Protocol: binary,base64
//!            Sec-WebSocket-Version: 13
//!                                              │
//!            101 Switching Protocols           ▼
//!            Sec-WebSocket-Protocol: <choice> ──► FramingMode
//! ```
//!
//! The server's choice is final.  `binary` and `base64` select a mode; any
//! other answer, including none, fails with
//! [`ProxyError::UnsupportedProtocol`].  The bridge never guesses.

use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio_tungstenite::tungstenite::http::{HeaderMap, HeaderValue, Uri};
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::{client_async, WebSocketStream};
use tracing::debug;

use tcp2ws_core::FramingMode;

use crate::domain::ProxyError;
use crate::infrastructure::transcript::{
    first_header_value, HandshakeTranscript, RecordingStream,
};

/// The upgraded upstream connection.
pub type WsStream = WebSocketStream<RecordingStream<TcpStream>>;

/// Port used when a `ws://` URL does not name one.
const DEFAULT_WS_PORT: u16 = 80;

// ── Public API ────────────────────────────────────────────────────────────────

/// Dials the upstream named by `remote_url`, performs the WebSocket client
/// handshake and returns the upgraded stream with the negotiated mode.
///
/// # Errors
///
/// - [`ProxyError::InvalidUrl`] if `remote_url` is not a usable `ws://` URL.
/// - [`ProxyError::Dial`] if the upstream's TCP endpoint is unreachable.
/// - [`ProxyError::Handshake`] for any handshake-level failure.
/// - [`ProxyError::UnsupportedProtocol`] if the server picks a subprotocol
///   other than `binary` or `base64`, or none.
pub async fn negotiate(remote_url: &str) -> Result<(WsStream, FramingMode), ProxyError> {
    let request = build_request(remote_url)?;
    let addr = upstream_address(request.uri(), remote_url)?;

    let tcp = TcpStream::connect(&addr)
        .await
        .map_err(|source| ProxyError::Dial {
            addr: addr.clone(),
            source,
        })?;
    // Relayed chunks are small and latency-sensitive.
    let _ = tcp.set_nodelay(true);
    debug!("dialed upstream {addr}; sending WebSocket upgrade");

    let transcript = HandshakeTranscript::new();
    let stream = RecordingStream::new(tcp, transcript.clone());

    let (ws, response) = match client_async(request, stream).await {
        Ok(pair) => pair,
        // The library checks the answered subprotocol against the offer
        // before handing back the response; rebuild the diagnostic from the
        // recorded bytes.
        Err(WsError::Protocol(ProtocolError::SecWebSocketSubProtocolError(_))) => {
            let headers = transcript.response_headers();
            let protocol = first_header_value(&headers, SEC_WEBSOCKET_PROTOCOL.as_str())
                .unwrap_or_default()
                .to_string();
            return Err(ProxyError::UnsupportedProtocol { protocol, headers });
        }
        Err(e) => {
            return Err(ProxyError::Handshake {
                url: remote_url.to_string(),
                reason: e.to_string(),
            })
        }
    };

    let mode = select_framing_mode(response.headers())?;
    Ok((ws, mode))
}

/// Builds the upgrade request for `remote_url`, offering every supported
/// subprotocol.
///
/// The request also carries `Sec-WebSocket-Version: 13`, `Upgrade`,
/// `Connection` and a fresh `Sec-WebSocket-Key`.
///
/// # Errors
///
/// Returns [`ProxyError::InvalidUrl`] if the URL cannot be parsed, has no
/// host, or does not use the `ws` scheme.
pub fn build_request(remote_url: &str) -> Result<Request, ProxyError> {
    let invalid = |reason: String| ProxyError::InvalidUrl {
        url: remote_url.to_string(),
        reason,
    };

    let mut request = remote_url
        .into_client_request()
        .map_err(|e| invalid(e.to_string()))?;

    match request.uri().scheme_str() {
        Some("ws") => {}
        Some("wss") => {
            return Err(invalid(
                "wss:// needs TLS, which tcp2ws does not provide".to_string(),
            ))
        }
        Some(other) => return Err(invalid(format!("unsupported scheme '{other}'"))),
        None => return Err(invalid("missing scheme, expected ws://".to_string())),
    }

    let offer = HeaderValue::from_str(&FramingMode::offer_header_value())
        .map_err(|e| invalid(e.to_string()))?;
    request.headers_mut().insert(SEC_WEBSOCKET_PROTOCOL, offer);
    Ok(request)
}

/// Returns the `host:port` to dial for `uri`, defaulting the port to 80.
///
/// # Errors
///
/// Returns [`ProxyError::InvalidUrl`] if the URL has no host.
pub fn upstream_address(uri: &Uri, remote_url: &str) -> Result<String, ProxyError> {
    let host = uri
        .host()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| ProxyError::InvalidUrl {
            url: remote_url.to_string(),
            reason: "missing host".to_string(),
        })?;
    let port = uri.port_u16().unwrap_or(DEFAULT_WS_PORT);
    Ok(format!("{host}:{port}"))
}

/// Maps the response's `Sec-WebSocket-Protocol` header to a framing mode.
///
/// The header name is matched case-insensitively; if the header appears more
/// than once the first value counts; a missing header counts as empty.
///
/// # Errors
///
/// Returns [`ProxyError::UnsupportedProtocol`], carrying every response
/// header, for any value other than `binary` or `base64`.
pub fn select_framing_mode(headers: &HeaderMap) -> Result<FramingMode, ProxyError> {
    let protocol = headers
        .get(SEC_WEBSOCKET_PROTOCOL)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).trim().to_string())
        .unwrap_or_default();

    FramingMode::from_subprotocol(&protocol).ok_or_else(|| ProxyError::UnsupportedProtocol {
        protocol,
        headers: headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
