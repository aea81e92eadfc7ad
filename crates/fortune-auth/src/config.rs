//! Authorization service configuration.
//!
//! [`AuthSettings`] is the loosely-typed form every source produces (command
//! line, environment, TOML file); [`AuthConfig`] is the validated result the
//! service runs with.
//!
//! ```toml
//! listen = "127.0.0.1:7070"
//! content_control = "127.0.0.1:7072"
//! secret = 1984
//! ```

use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;

use fortune_core::config::{load_toml, require, resolve_addr, ConfigError};

/// Validated settings for one authorization service process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// UDP address clients send probes and hash responses to.
    pub listen_addr: SocketAddr,
    /// TCP address of the content service's handoff channel.
    pub content_control_addr: SocketAddr,
    /// Pre-shared secret; must match the clients'.
    pub secret: i64,
}

/// Partially specified settings from a single source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub listen: Option<String>,
    pub content_control: Option<String>,
    pub secret: Option<i64>,
}

impl AuthSettings {
    /// Reads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file is unreadable or malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        load_toml(path)
    }

    /// Fills every setting missing here from `fallback`.
    pub fn or(self, fallback: AuthSettings) -> AuthSettings {
        AuthSettings {
            listen: self.listen.or(fallback.listen),
            content_control: self.content_control.or(fallback.content_control),
            secret: self.secret.or(fallback.secret),
        }
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] for an absent setting and
    /// [`ConfigError::InvalidAddress`] for an address that does not resolve.
    pub fn into_config(self) -> Result<AuthConfig, ConfigError> {
        let listen = require("listen", self.listen)?;
        let content_control = require("content_control", self.content_control)?;
        Ok(AuthConfig {
            listen_addr: resolve_addr("listen", &listen)?,
            content_control_addr: resolve_addr("content_control", &content_control)?,
            secret: require("secret", self.secret)?,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> AuthSettings {
        AuthSettings {
            listen: Some("127.0.0.1:7070".to_string()),
            content_control: Some("127.0.0.1:7072".to_string()),
            secret: Some(1984),
        }
    }

    #[test]
    fn test_into_config_parses_complete_settings() {
        // Act
        let config = complete().into_config().unwrap();

        // Assert
        assert_eq!(config.listen_addr.port(), 7070);
        assert_eq!(config.content_control_addr.port(), 7072);
        assert_eq!(config.secret, 1984);
    }

    #[test]
    fn test_or_keeps_primary_values() {
        // Arrange
        let primary = AuthSettings {
            secret: Some(1),
            ..Default::default()
        };

        // Act
        let merged = primary.or(complete());

        // Assert
        assert_eq!(merged.secret, Some(1));
        assert_eq!(merged.listen.as_deref(), Some("127.0.0.1:7070"));
    }

    #[test]
    fn test_missing_secret_is_reported_by_name() {
        let settings = AuthSettings {
            secret: None,
            ..complete()
        };
        assert!(matches!(
            settings.into_config(),
            Err(ConfigError::Missing("secret"))
        ));
    }

    #[test]
    fn test_bad_control_address_is_rejected() {
        let settings = AuthSettings {
            content_control: Some("nowhere".to_string()),
            ..complete()
        };
        assert!(matches!(
            settings.into_config(),
            Err(ConfigError::InvalidAddress {
                setting: "content_control",
                ..
            })
        ));
    }

    #[test]
    fn test_settings_deserialize_from_partial_toml() {
        let settings: AuthSettings = toml_from("secret = -5\n");
        assert_eq!(settings.secret, Some(-5));
        assert_eq!(settings.listen, None);
    }

    fn toml_from(text: &str) -> AuthSettings {
        let path = std::env::temp_dir().join(format!("fortune-auth-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, text).unwrap();
        let settings = AuthSettings::load(&path).unwrap();
        std::fs::remove_file(path).ok();
        settings
    }
}
