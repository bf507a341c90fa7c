//! Recording of the upstream's raw handshake response.
//!
//! The WebSocket library validates the server's `Sec-WebSocket-Protocol`
//! answer itself and, when it rejects it, returns an error that no longer
//! carries the response.  To still report the full header set, the upstream
//! TCP stream is wrapped in a [`RecordingStream`] that copies the bytes read
//! during the handshake into a shared [`HandshakeTranscript`].  Recording
//! stops at the blank line ending the response head, so relayed data is
//! never copied.

use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Upper bound on recorded bytes; a response head larger than this is cut.
const TRANSCRIPT_LIMIT: usize = 16 * 1024;

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Bytes received from the upstream while the handshake was in progress.
///
/// Cheap to clone; all clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct HandshakeTranscript {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl HandshakeTranscript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `data` and returns `true` once the response head is complete
    /// (or the size limit is reached).
    fn append(&self, data: &[u8]) -> bool {
        let mut bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        let room = TRANSCRIPT_LIMIT.saturating_sub(bytes.len());
        bytes.extend_from_slice(&data[..data.len().min(room)]);
        bytes.len() >= TRANSCRIPT_LIMIT || find_head_end(&bytes).is_some()
    }

    /// Returns the response header lines recorded so far, in order.
    pub fn response_headers(&self) -> Vec<(String, String)> {
        let bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        parse_response_headers(&bytes)
    }
}

fn find_head_end(bytes: &[u8]) -> Option<usize> {
    bytes
        .windows(HEAD_TERMINATOR.len())
        .position(|window| window == HEAD_TERMINATOR)
}

/// Parses the header lines of a raw HTTP response head.
///
/// The status line is skipped.  Lines without a `:` are ignored.  Parsing
/// stops at the first blank line, or at the end of the input for a truncated
/// head.  Names keep the case they were sent with.
pub fn parse_response_headers(raw: &[u8]) -> Vec<(String, String)> {
    let head = match find_head_end(raw) {
        Some(end) => &raw[..end],
        None => raw,
    };
    String::from_utf8_lossy(head)
        .split("\r\n")
        .skip(1)
        .take_while(|line| !line.is_empty())
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// Returns the first value of header `name`, compared case-insensitively.
pub fn first_header_value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(header, _)| header.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Stream wrapper that copies bytes read during the handshake into a
/// [`HandshakeTranscript`].  Writes pass straight through.
#[derive(Debug)]
pub struct RecordingStream<S> {
    inner: S,
    transcript: HandshakeTranscript,
    recording: bool,
}

impl<S> RecordingStream<S> {
    /// Wraps `inner`, recording into `transcript`.
    pub fn new(inner: S, transcript: HandshakeTranscript) -> Self {
        Self {
            inner,
            transcript,
            recording: true,
        }
    }

    /// Returns `true` while the response head is still being recorded.
    pub fn is_recording(&self) -> bool {
        self.recording
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for RecordingStream<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        let poll = Pin::new(&mut this.inner).poll_read(cx, buf);
        if this.recording {
            if let Poll::Ready(Ok(())) = &poll {
                let fresh = &buf.filled()[before..];
                if !fresh.is_empty() && this.transcript.append(fresh) {
                    this.recording = false;
                }
            }
        }
        poll
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for RecordingStream<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().inner).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }

    fn poll_write_vectored(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().inner).poll_write_vectored(cx, bufs)
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
