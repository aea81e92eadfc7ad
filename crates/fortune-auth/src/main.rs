//! fortune-auth: authorization service entry point.
//!
//! # Usage
//!
//! ```text
//! fortune-auth [OPTIONS] <LISTEN> <CONTENT_CONTROL> <SECRET>
//!
//! Arguments:
//!   <LISTEN>           UDP address for client datagrams     [env: FORTUNE_AUTH_LISTEN]
//!   <CONTENT_CONTROL>  Content service handoff TCP address  [env: FORTUNE_CONTENT_CONTROL]
//!   <SECRET>           Pre-shared secret integer            [env: FORTUNE_SECRET]
//!
//! Options:
//!   --config <PATH>       TOML file supplying any missing argument
//!   --log-level <LEVEL>   Default tracing filter [default: info]
//! ```
//!
//! Arguments win over environment variables, which win over the config file.
//! `RUST_LOG`, when set, overrides `--log-level`.

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use fortune_auth::{AuthConfig, AuthServer, AuthSettings};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Authorization service: challenges clients and hands them off to the
/// content service.
#[derive(Debug, Parser)]
#[command(
    name = "fortune-auth",
    about = "Nonce-challenge authorization service for fortune clients",
    version,
    allow_negative_numbers = true
)]
struct Cli {
    /// UDP address to accept client datagrams on, e.g. `127.0.0.1:7070`.
    #[arg(env = "FORTUNE_AUTH_LISTEN")]
    listen: Option<String>,

    /// TCP address of the content service's handoff channel.
    #[arg(env = "FORTUNE_CONTENT_CONTROL")]
    content_control: Option<String>,

    /// Pre-shared secret; clients must be started with the same value.
    #[arg(env = "FORTUNE_SECRET")]
    secret: Option<i64>,

    /// TOML config file supplying any setting not given above.
    #[arg(long, env = "FORTUNE_AUTH_CONFIG")]
    config: Option<PathBuf>,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, default_value = "info", env = "FORTUNE_LOG_LEVEL")]
    log_level: String,
}

impl Cli {
    /// Merges the arguments over the config file and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read, a setting is
    /// missing, or an address does not resolve.
    fn into_config(self) -> anyhow::Result<AuthConfig> {
        let file = match &self.config {
            Some(path) => AuthSettings::load(path)?,
            None => AuthSettings::default(),
        };
        let settings = AuthSettings {
            listen: self.listen,
            content_control: self.content_control,
            secret: self.secret,
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
        .init();

    let config = cli
        .into_config()
        .context("invalid authorization service configuration")?;

    info!(
        "fortune-auth starting, listen={}, content control={}",
        config.listen_addr, config.content_control_addr
    );

    let server = AuthServer::bind(&config)
        .await
        .context("failed to start authorization service")?;

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => error!("failed to listen for Ctrl+C signal: {e}"),
        }
    });

    server.run(running).await?;

    info!("fortune-auth stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
