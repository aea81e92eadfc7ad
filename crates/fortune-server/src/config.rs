//! Content service configuration.
//!
//! ```toml
//! control = "127.0.0.1:7072"
//! listen = "127.0.0.1:7071"
//! fortune = "seize the day"
//! # advertise = "fortune.example.net:7071"
//! ```

use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;

use fortune_core::config::{load_toml, require, resolve_addr, ConfigError};

/// Validated settings for one content service process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentConfig {
    /// TCP address of the handoff channel; only the authorization service
    /// should be able to reach it.
    pub control_addr: SocketAddr,
    /// UDP address clients fetch the fortune from.
    pub listen_addr: SocketAddr,
    /// The content served to every authorized client.
    pub fortune: String,
    /// Address reported to clients in grants.  Defaults to the bound UDP
    /// address.
    pub advertise: Option<String>,
}

/// Partially specified settings from a single source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContentSettings {
    pub control: Option<String>,
    pub listen: Option<String>,
    pub fortune: Option<String>,
    pub advertise: Option<String>,
}

impl ContentSettings {
    /// Reads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file is unreadable or malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        load_toml(path)
    }

    /// Fills every setting missing here from `fallback`.
    pub fn or(self, fallback: ContentSettings) -> ContentSettings {
        ContentSettings {
            control: self.control.or(fallback.control),
            listen: self.listen.or(fallback.listen),
            fortune: self.fortune.or(fallback.fortune),
            advertise: self.advertise.or(fallback.advertise),
        }
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] for an absent setting and
    /// [`ConfigError::InvalidAddress`] for an address that does not resolve.
    pub fn into_config(self) -> Result<ContentConfig, ConfigError> {
        let control = require("control", self.control)?;
        let listen = require("listen", self.listen)?;
        Ok(ContentConfig {
            control_addr: resolve_addr("control", &control)?,
            listen_addr: resolve_addr("listen", &listen)?,
            fortune: require("fortune", self.fortune)?,
            advertise: self.advertise,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ContentSettings {
        ContentSettings {
            control: Some("127.0.0.1:7072".to_string()),
            listen: Some("127.0.0.1:7071".to_string()),
            fortune: Some("seize the day".to_string()),
            advertise: None,
        }
    }

    #[test]
    fn test_into_config_parses_complete_settings() {
        // Act
        let config = complete().into_config().unwrap();

        // Assert
        assert_eq!(config.control_addr.port(), 7072);
        assert_eq!(config.listen_addr.port(), 7071);
        assert_eq!(config.fortune, "seize the day");
        assert_eq!(config.advertise, None);
    }

    #[test]
    fn test_empty_fortune_is_allowed() {
        let settings = ContentSettings {
            fortune: Some(String::new()),
            ..complete()
        };
        assert_eq!(settings.into_config().unwrap().fortune, "");
    }

    #[test]
    fn test_missing_fortune_is_reported_by_name() {
        let settings = ContentSettings {
            fortune: None,
            ..complete()
        };
        assert!(matches!(
            settings.into_config(),
            Err(ConfigError::Missing("fortune"))
        ));
    }

    #[test]
    fn test_or_fills_only_missing_settings() {
        let primary = ContentSettings {
            fortune: Some("carpe diem".to_string()),
            ..Default::default()
        };

        let merged = primary.or(complete());

        assert_eq!(merged.fortune.as_deref(), Some("carpe diem"));
        assert_eq!(merged.listen.as_deref(), Some("127.0.0.1:7071"));
    }

    #[test]
    fn test_invalid_listen_address_is_rejected() {
        let settings = ContentSettings {
            listen: Some("7071".to_string()),
            ..complete()
        };
        assert!(matches!(
            settings.into_config(),
            Err(ConfigError::InvalidAddress { setting: "listen", .. })
        ));
    }
}
