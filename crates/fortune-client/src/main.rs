//! fortune-client: fetches one fortune and prints it on stdout.
//!
//! # Usage
//!
//! ```text
//! fortune-client [OPTIONS] <LOCAL> <AUTH> <SECRET>
//!
//! Arguments:
//!   <LOCAL>   UDP address to bind, e.g. 127.0.0.1:0  [env: FORTUNE_CLIENT_LOCAL]
//!   <AUTH>    Authorization service UDP address       [env: FORTUNE_AUTH_ADDR]
//!   <SECRET>  Pre-shared secret integer               [env: FORTUNE_SECRET]
//!
//! Options:
//!   --timeout-ms <MS>     Per-reply wait; 0 or absent waits forever
//!   --config <PATH>       TOML file supplying any missing argument
//!   --log-level <LEVEL>   Default tracing filter [default: warn]
//! ```
//!
//! Logs go to stderr so stdout carries the fortune alone.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use fortune_client::{run_protocol, ClientConfig, ClientSettings};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Fetches a fortune from an authorization/content service pair.
#[derive(Debug, Parser)]
#[command(
    name = "fortune-client",
    about = "Authenticate and fetch a fortune",
    version,
    allow_negative_numbers = true
)]
struct Cli {
    /// UDP address to bind; port 0 picks a free port.
    #[arg(env = "FORTUNE_CLIENT_LOCAL")]
    local: Option<String>,

    /// UDP address of the authorization service.
    #[arg(env = "FORTUNE_AUTH_ADDR")]
    auth: Option<String>,

    /// Pre-shared secret; must match the authorization service's.
    #[arg(env = "FORTUNE_SECRET")]
    secret: Option<i64>,

    /// Milliseconds to wait for each reply.  Without it a lost reply hangs.
    #[arg(long, env = "FORTUNE_CLIENT_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// TOML config file supplying any setting not given above.
    #[arg(long, env = "FORTUNE_CLIENT_CONFIG")]
    config: Option<PathBuf>,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, default_value = "warn", env = "FORTUNE_LOG_LEVEL")]
    log_level: String,
}

impl Cli {
    /// Merges the arguments over the config file and validates the result.
    fn into_config(self) -> anyhow::Result<ClientConfig> {
        let file = match &self.config {
            Some(path) => ClientSettings::load(path)?,
            None => ClientSettings::default(),
        };
        let settings = ClientSettings {
            local: self.local,
            auth: self.auth,
            secret: self.secret,
            timeout_ms: self.timeout_ms,
        }
        .or(file);
        Ok(settings.into_config()?)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.into_config().context("invalid client configuration")?;
    let fortune = run_protocol(&config)
        .await
        .with_context(|| format!("failed to fetch fortune via {}", config.auth_addr))?;

    println!("{fortune}");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
