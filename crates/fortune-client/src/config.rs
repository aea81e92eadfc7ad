//! Client configuration.
//!
//! ```toml
//! local = "127.0.0.1:0"
//! auth = "127.0.0.1:7070"
//! secret = 1984
//! timeout_ms = 5000
//! ```

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use fortune_core::config::{load_toml, require, resolve_addr, ConfigError};

use crate::application::driver::ReadTimeout;

/// Validated settings for one client run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Where the client socket binds; port 0 picks a free one.
    pub local_addr: SocketAddr,
    pub auth_addr: SocketAddr,
    /// Pre-shared secret; must match the authorization service's.
    pub secret: i64,
    pub read_timeout: ReadTimeout,
}

/// Partially specified settings from a single source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub local: Option<String>,
    pub auth: Option<String>,
    pub secret: Option<i64>,
    /// Per-reply wait in milliseconds; absent or `0` waits forever.
    pub timeout_ms: Option<u64>,
}

impl ClientSettings {
    /// Reads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file is unreadable or malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        load_toml(path)
    }

    /// Fills every setting missing here from `fallback`.
    pub fn or(self, fallback: ClientSettings) -> ClientSettings {
        ClientSettings {
            local: self.local.or(fallback.local),
            auth: self.auth.or(fallback.auth),
            secret: self.secret.or(fallback.secret),
            timeout_ms: self.timeout_ms.or(fallback.timeout_ms),
        }
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] for an absent setting and
    /// [`ConfigError::InvalidAddress`] for an address that does not resolve.
    pub fn into_config(self) -> Result<ClientConfig, ConfigError> {
        let local = require("local", self.local)?;
        let auth = require("auth", self.auth)?;
        let read_timeout = match self.timeout_ms {
            None | Some(0) => ReadTimeout::Forever,
            Some(ms) => ReadTimeout::After(Duration::from_millis(ms)),
        };
        Ok(ClientConfig {
            local_addr: resolve_addr("local", &local)?,
            auth_addr: resolve_addr("auth", &auth)?,
            secret: require("secret", self.secret)?,
            read_timeout,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
