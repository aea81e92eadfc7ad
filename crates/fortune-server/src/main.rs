//! fortune-server: content service entry point.
//!
//! # Usage
//!
//! ```text
//! fortune-server [OPTIONS] <CONTROL> <LISTEN> <FORTUNE>
//!
//! Arguments:
//!   <CONTROL>  TCP address of the handoff channel  [env: FORTUNE_CONTENT_CONTROL]
//!   <LISTEN>   UDP address for client requests     [env: FORTUNE_CONTENT_LISTEN]
//!   <FORTUNE>  The fortune to serve                [env: FORTUNE_TEXT]
//!
//! Options:
//!   --advertise <ADDR>    Address reported to clients instead of the bound one
//!   --config <PATH>       TOML file supplying any missing argument
//!   --log-level <LEVEL>   Default tracing filter [default: info]
//! ```

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use fortune_server::{ContentConfig, ContentServer, ContentSettings};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Content service: grants access on behalf of the authorization service and
/// serves the fortune to authorized clients.
#[derive(Debug, Parser)]
#[command(
    name = "fortune-server",
    about = "Fortune content service with a private handoff channel",
    version
)]
struct Cli {
    /// TCP address of the handoff channel, e.g. `127.0.0.1:7072`.
    ///
    /// Keep this reachable from the authorization service only.
    #[arg(env = "FORTUNE_CONTENT_CONTROL")]
    control: Option<String>,

    /// UDP address clients fetch the fortune from, e.g. `127.0.0.1:7071`.
    #[arg(env = "FORTUNE_CONTENT_LISTEN")]
    listen: Option<String>,

    /// The fortune text.
    #[arg(env = "FORTUNE_TEXT")]
    fortune: Option<String>,

    /// Address reported to clients in access grants.
    ///
    /// Needed when the service binds a wildcard address or sits behind NAT.
    #[arg(long, env = "FORTUNE_CONTENT_ADVERTISE")]
    advertise: Option<String>,

    /// TOML config file supplying any setting not given above.
    #[arg(long, env = "FORTUNE_SERVER_CONFIG")]
    config: Option<PathBuf>,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, default_value = "info", env = "FORTUNE_LOG_LEVEL")]
    log_level: String,
}

impl Cli {
    /// Merges the arguments over the config file and validates the result.
    fn into_config(self) -> anyhow::Result<ContentConfig> {
        let file = match &self.config {
            Some(path) => ContentSettings::load(path)?,
            None => ContentSettings::default(),
        };
        let settings = ContentSettings {
            control: self.control,
            listen: self.listen,
            fortune: self.fortune,
            advertise: self.advertise,
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
        .context("invalid content service configuration")?;

    info!(
        "fortune-server starting, control={}, listen={}",
        config.control_addr, config.listen_addr
    );

    let server = ContentServer::bind(&config)
        .await
        .context("failed to start content service")?;

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

    info!("fortune-server stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
