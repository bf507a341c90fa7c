//! tcp2ws: TCP to WebSocket bridge, entry point.
//!
//! Listens on a local TCP port and, for every client that connects, opens a
//! WebSocket connection to the upstream and relays bytes both ways until
//! either side closes.
//!
//! # Usage
//!
//! ```text
//! tcp2ws --rhost <URL> [OPTIONS]
//!
//! Options:
//!   --rhost <URL>            Upstream WebSocket URL, ws://host:port/path (required)
//!   --lhost <ADDR>           Local listen address [default: localhost:3333]
//!   --single-shot            Serve one connection, then exit with its result
//!   --accept-errors <POLICY> fatal | continue [default: fatal]
//!   --buffer-size <BYTES>    TCP read chunk size [default: 1024]
//! ```
//!
//! # Environment variable overrides
//!
//! CLI args take precedence when both are present.
//!
//! | Variable              | Default          | Description                 |
//! |-----------------------|------------------|-----------------------------|
//! | `TCP2WS_RHOST`        | (none)           | Upstream WebSocket URL      |
//! | `TCP2WS_LHOST`        | `localhost:3333` | Local listen address        |
//! | `TCP2WS_ACCEPT_ERRORS`| `fatal`          | Accept error policy         |
//! | `TCP2WS_BUFFER_SIZE`  | `1024`           | TCP read chunk size         |
//! | `RUST_LOG`            | `info`           | Log filter                  |

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tcp2ws::domain::DEFAULT_LISTEN_ADDR;
use tcp2ws::infrastructure::negotiator::build_request;
use tcp2ws::{AcceptErrorPolicy, Proxy, ProxyConfig, TracingObserver};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Bridge plain TCP clients to a WebSocket server.
#[derive(Debug, Parser)]
#[command(
    name = "tcp2ws",
    about = "Relay local TCP connections to an upstream WebSocket endpoint",
    version
)]
struct Cli {
    /// Upstream WebSocket URL, for example `ws://10.0.0.5:8080/tunnel`.
    #[arg(long, env = "TCP2WS_RHOST")]
    rhost: String,

    /// Local `host:port` to accept TCP clients on.
    #[arg(long, default_value = DEFAULT_LISTEN_ADDR, env = "TCP2WS_LHOST")]
    lhost: String,

    /// Serve exactly one connection and exit with its result.
    #[arg(long)]
    single_shot: bool,

    /// What to do when accepting a connection fails: `fatal` stops the
    /// listener, `continue` logs the error and keeps accepting.
    #[arg(long, default_value_t = AcceptErrorPolicy::Fatal, env = "TCP2WS_ACCEPT_ERRORS")]
    accept_errors: AcceptErrorPolicy,

    /// Maximum bytes read from a TCP client per WebSocket message.
    #[arg(long, default_value_t = tcp2ws_core::DEFAULT_READ_BUFFER_SIZE, env = "TCP2WS_BUFFER_SIZE")]
    buffer_size: usize,
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`ProxyConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if `--buffer-size` is zero or `--rhost` is not a
    /// usable `ws://` URL.
    fn into_proxy_config(self) -> anyhow::Result<ProxyConfig> {
        anyhow::ensure!(self.buffer_size > 0, "--buffer-size must be at least 1");
        build_request(&self.rhost)
            .with_context(|| format!("invalid --rhost '{}'", self.rhost))?;

        Ok(ProxyConfig::new(self.lhost, self.rhost)
            .with_run_forever(!self.single_shot)
            .with_accept_error_policy(self.accept_errors)
            .with_read_buffer_size(self.buffer_size))
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging setup ─────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_proxy_config()?;

    info!(
        "tcp2ws starting: {} -> {} ({}, accept errors {})",
        config.listen_addr,
        config.remote_url,
        if config.run_forever { "forever" } else { "single-shot" },
        config.accept_error_policy
    );

    let proxy = Proxy::bind(config, Arc::new(TracingObserver))
        .await
        .context("failed to start listener")?;

    // Ctrl+C stops the accept loop; sessions in flight are dropped with it.
    tokio::select! {
        result = proxy.serve() => result.context("proxy stopped")?,
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl+C")?;
            info!("received Ctrl+C, shutting down");
        }
    }

    info!("tcp2ws stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
