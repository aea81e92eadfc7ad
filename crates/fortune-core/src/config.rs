//! Config-file loading shared by the three binaries.
//!
//! Every binary accepts its settings on the command line, from `FORTUNE_*`
//! environment variables, or from a TOML file passed with `--config`.  The
//! file only fills gaps: anything given on the command line or in the
//! environment wins.  Each binary defines its own file schema; this module
//! only knows how to read one and how to turn address strings into socket
//! addresses.
//!
//! ```toml
//! # fortune-auth.toml
//! listen = "127.0.0.1:7070"
//! content_control = "127.0.0.1:7072"
//! secret = 1984
//! ```

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors raised while assembling a binary's configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for the expected schema.
    #[error("failed to parse config TOML at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A required setting was given nowhere.
    #[error("missing required setting `{0}` (pass it as an argument, environment variable or config key)")]
    Missing(&'static str),

    /// An address string did not resolve to a socket address.
    #[error("invalid address for `{setting}`: '{value}'")]
    InvalidAddress { setting: &'static str, value: String },
}

/// Reads and parses a TOML config file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::Parse`] if it does not match `T`.
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Unwraps a setting that every source left empty into a named error.
///
/// # Errors
///
/// Returns [`ConfigError::Missing`] when `value` is `None`.
pub fn require<T>(setting: &'static str, value: Option<T>) -> Result<T, ConfigError> {
    value.ok_or(ConfigError::Missing(setting))
}

/// Resolves `host:port` (IP literal or hostname) to its first socket address.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidAddress`] if resolution fails or yields
/// nothing.
pub fn resolve_addr(setting: &'static str, value: &str) -> Result<SocketAddr, ConfigError> {
    let invalid = || ConfigError::InvalidAddress {
        setting,
        value: value.to_string(),
    };
    value
        .to_socket_addrs()
        .map_err(|_| invalid())?
        .next()
        .ok_or_else(invalid)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use uuid::Uuid;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        listen: Option<String>,
        secret: Option<i64>,
    }

    fn temp_file(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("fortune-config-{}.toml", Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_toml_reads_present_keys() {
        // Arrange
        let path = temp_file("listen = \"127.0.0.1:7070\"\nsecret = 1984\n");

        // Act
        let cfg: Sample = load_toml(&path).unwrap();

        // Assert
        assert_eq!(cfg.listen.as_deref(), Some("127.0.0.1:7070"));
        assert_eq!(cfg.secret, Some(1984));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_toml_allows_missing_keys() {
        let path = temp_file("secret = 7\n");
        let cfg: Sample = load_toml(&path).unwrap();
        assert_eq!(cfg.listen, None);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_toml_reports_parse_error() {
        let path = temp_file("secret = \"not a number\"\n");
        let result = load_toml::<Sample>(&path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_toml_reports_missing_file() {
        let path = std::env::temp_dir().join(format!("absent-{}.toml", Uuid::new_v4()));
        assert!(matches!(load_toml::<Sample>(&path), Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_require_names_missing_setting() {
        assert_eq!(require("secret", Some(1)).unwrap(), 1);
        assert!(matches!(
            require::<i64>("secret", None),
            Err(ConfigError::Missing("secret"))
        ));
    }

    #[test]
    fn test_resolve_addr_accepts_ip_literal() {
        let addr = resolve_addr("listen", "127.0.0.1:7070").unwrap();
        assert_eq!(addr.port(), 7070);
    }

    #[test]
    fn test_resolve_addr_rejects_missing_port() {
        assert!(matches!(
            resolve_addr("listen", "127.0.0.1"),
            Err(ConfigError::InvalidAddress { setting: "listen", .. })
        ));
    }
}
