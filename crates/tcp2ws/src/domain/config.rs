//! Proxy configuration types.
//!
//! [`ProxyConfig`] is the single source of truth for runtime settings.  It is
//! a plain struct: the binary fills it from CLI arguments, embedders and tests
//! build it directly.  Nothing in here reads the environment.

use std::fmt;
use std::str::FromStr;

use tcp2ws_core::DEFAULT_READ_BUFFER_SIZE;

/// Local TCP address the proxy listens on when none is given.
pub const DEFAULT_LISTEN_ADDR: &str = "localhost:3333";

/// What the accept loop does when `accept()` itself fails.
///
/// Accept failures are often transient (a client resetting before the accept
/// completes, a short burst of file-descriptor exhaustion).  Stopping the
/// whole listener on the first one is still the default, matching the
/// behaviour of earlier releases of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcceptErrorPolicy {
    /// Stop the listener and return [`crate::ProxyError::Accept`].
    #[default]
    Fatal,
    /// Report the failure and keep accepting.
    LogAndContinue,
}

impl FromStr for AcceptErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fatal" => Ok(Self::Fatal),
            "continue" | "log-and-continue" => Ok(Self::LogAndContinue),
            other => Err(format!(
                "unknown accept error policy '{other}' (expected 'fatal' or 'continue')"
            )),
        }
    }
}

impl fmt::Display for AcceptErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fatal => f.write_str("fatal"),
            Self::LogAndContinue => f.write_str("continue"),
        }
    }
}

/// All runtime configuration for one proxy instance.
///
/// # Example
///
/// ```rust
/// use tcp2ws::{AcceptErrorPolicy, ProxyConfig};
///
/// let cfg = ProxyConfig::new("127.0.0.1:0", "ws://127.0.0.1:8080/")
///     .with_run_forever(false)
///     .with_accept_error_policy(AcceptErrorPolicy::LogAndContinue);
/// assert!(!cfg.run_forever);
/// assert_eq!(cfg.read_buffer_size, 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// `host:port` to bind the local TCP listener on.  Host names are
    /// resolved at bind time, so `localhost:3333` is accepted.
    pub listen_addr: String,

    /// Upstream WebSocket endpoint, `ws://host:port/path`.
    ///
    /// Only the authority is used to open the TCP connection; the full URL
    /// goes into the handshake request line and `Host` header.
    pub remote_url: String,

    /// `true`: every accepted connection gets its own task and the listener
    /// keeps accepting.  `false`: serve exactly one connection and return its
    /// result.
    pub run_forever: bool,

    /// Behaviour of the accept loop when `accept()` fails.
    pub accept_error_policy: AcceptErrorPolicy,

    /// Capacity of the TCP read buffer; the largest chunk one outbound
    /// WebSocket message carries.
    pub read_buffer_size: usize,
}

impl ProxyConfig {
    /// Creates a configuration that serves forever with fatal accept errors
    /// and the default 1024-byte read buffer.
    pub fn new(listen_addr: impl Into<String>, remote_url: impl Into<String>) -> Self {
        Self {
            listen_addr: listen_addr.into(),
            remote_url: remote_url.into(),
            run_forever: true,
            accept_error_policy: AcceptErrorPolicy::default(),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }

    /// Sets forever (`true`) or single-shot (`false`) mode.
    pub fn with_run_forever(mut self, run_forever: bool) -> Self {
        self.run_forever = run_forever;
        self
    }

    /// Sets the accept error policy.
    pub fn with_accept_error_policy(mut self, policy: AcceptErrorPolicy) -> Self {
        self.accept_error_policy = policy;
        self
    }

    /// Sets the read buffer size.  A size of zero is raised to one byte so
    /// the TCP→WebSocket pump can never mistake an empty buffer for EOF.
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.max(1);
        self
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults_to_forever_mode() {
        let cfg = ProxyConfig::new(DEFAULT_LISTEN_ADDR, "ws://example.com/");
        assert!(cfg.run_forever);
    }

    #[test]
    fn test_new_defaults_to_fatal_accept_errors() {
        let cfg = ProxyConfig::new(DEFAULT_LISTEN_ADDR, "ws://example.com/");
        assert_eq!(cfg.accept_error_policy, AcceptErrorPolicy::Fatal);
    }

    #[test]
    fn test_new_defaults_to_1024_byte_buffer() {
        let cfg = ProxyConfig::new(DEFAULT_LISTEN_ADDR, "ws://example.com/");
        assert_eq!(cfg.read_buffer_size, 1024);
    }

    #[test]
    fn test_default_listen_addr_is_localhost_3333() {
        assert_eq!(DEFAULT_LISTEN_ADDR, "localhost:3333");
    }

    #[test]
    fn test_builders_override_fields() {
        let cfg = ProxyConfig::new("0.0.0.0:9000", "ws://10.0.0.5:8080/tcp")
            .with_run_forever(false)
            .with_accept_error_policy(AcceptErrorPolicy::LogAndContinue)
            .with_read_buffer_size(4096);

        assert_eq!(cfg.listen_addr, "0.0.0.0:9000");
        assert_eq!(cfg.remote_url, "ws://10.0.0.5:8080/tcp");
        assert!(!cfg.run_forever);
        assert_eq!(cfg.accept_error_policy, AcceptErrorPolicy::LogAndContinue);
        assert_eq!(cfg.read_buffer_size, 4096);
    }

    #[test]
    fn test_zero_buffer_size_is_raised_to_one() {
        let cfg = ProxyConfig::new("a:1", "ws://b/").with_read_buffer_size(0);
        assert_eq!(cfg.read_buffer_size, 1);
    }

    #[test]
    fn test_accept_policy_parses_cli_spellings() {
        assert_eq!("fatal".parse::<AcceptErrorPolicy>(), Ok(AcceptErrorPolicy::Fatal));
        assert_eq!("continue".parse::<AcceptErrorPolicy>(), Ok(AcceptErrorPolicy::LogAndContinue));
        assert_eq!("Log-And-Continue".parse::<AcceptErrorPolicy>(), Ok(AcceptErrorPolicy::LogAndContinue));
    }

    #[test]
    fn test_accept_policy_rejects_unknown_value() {
        let result: Result<AcceptErrorPolicy, _> = "retry".parse();
        assert!(result.unwrap_err().contains("retry"));
    }

    #[test]
    fn test_accept_policy_display_round_trips_through_parse() {
        for policy in [AcceptErrorPolicy::Fatal, AcceptErrorPolicy::LogAndContinue] {
            assert_eq!(policy.to_string().parse::<AcceptErrorPolicy>(), Ok(policy));
        }
    }
}
