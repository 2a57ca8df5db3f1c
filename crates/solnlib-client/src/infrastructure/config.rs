//! TOML-based settings for connecting to splunkd.
//!
//! ```toml
//! scheme = "https"
//! host = "127.0.0.1"
//! port = 8089
//! timeout_secs = 30
//! verify_tls = false
//! owner = "nobody"
//! app = "Splunk_TA_example"
//! log_level = "info"
//! ```
//!
//! Every field has a default, so an absent file or a partial file both load.
//! When `host`/`port` should follow the local installation instead, build the
//! config from [`SplunkEnv::splunkd_access_info`](crate::infrastructure::splunkenv::SplunkEnv::splunkd_access_info).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use solnlib_core::rest::Namespace;
use thiserror::Error;

use crate::infrastructure::splunkenv::format_uri;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Connection settings for one splunkd endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// `"https"` or `"http"`.
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default = "default_host")]
    pub host: String,
    /// splunkd management port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-request timeout enforced by the transport.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub verify_tls: bool,
    #[serde(default = "default_owner")]
    pub owner: String,
    /// App context; `None` resolves to `system`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    /// `tracing` level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_scheme() -> String {
    "https".to_string()
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8089
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_owner() -> String {
    "nobody".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            host: default_host(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            verify_tls: false,
            owner: default_owner(),
            app: None,
            log_level: default_log_level(),
        }
    }
}

impl ClientConfig {
    /// `scheme://host:port`, bracketing IPv6 hosts.
    pub fn base_url(&self) -> String {
        format_uri(&self.scheme, &self.host, self.port)
    }

    /// The owner/app namespace requests resolve in.
    pub fn namespace(&self) -> Namespace {
        Namespace {
            owner: Some(self.owner.clone()),
            app: self.app.clone(),
            sharing: None,
        }
    }
}

/// Loads a `ClientConfig` from `path`, returning defaults if the file does
/// not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_local_management_port() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.base_url(), "https://127.0.0.1:8089");
        assert_eq!(cfg.owner, "nobody");
        assert!(!cfg.verify_tls);
    }

    #[test]
    fn test_ipv6_host_is_bracketed() {
        let cfg = ClientConfig {
            host: "::1".to_string(),
            ..ClientConfig::default()
        };
        assert_eq!(cfg.base_url(), "https://[::1]:8089");
    }

    #[test]
    fn test_namespace_without_app_resolves_to_system() {
        let ns = ClientConfig::default().namespace();
        assert_eq!(ns.abs_path("storage/passwords"), "/servicesNS/nobody/system/storage/passwords");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        // Arrange
        let toml_str = r#"
port = 18089
app = "search"
"#;

        // Act
        let cfg: ClientConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.port, 18089);
        assert_eq!(cfg.app.as_deref(), Some("search"));
        assert_eq!(cfg.scheme, "https");
        assert_eq!(cfg.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let result: Result<ClientConfig, toml::de::Error> = toml::from_str("port = [[[");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_returns_default_when_file_absent() {
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/solnlib.toml");
        let cfg = load_config(&path).expect("defaults");
        assert_eq!(cfg, ClientConfig::default());
    }

    #[test]
    fn test_load_config_reads_file_from_temp_dir() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("solnlib_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("solnlib.toml");
        std::fs::write(&path, "host = \"sh-01\"\nverify_tls = true\nlog_level = \"debug\"\n").unwrap();

        // Act
        let cfg = load_config(&path).expect("load");

        // Assert
        assert_eq!(cfg.host, "sh-01");
        assert!(cfg.verify_tls);
        assert_eq!(cfg.log_level, "debug");

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_round_trip_through_toml() {
        let cfg = ClientConfig {
            app: Some("unittest".to_string()),
            port: 9089,
            ..ClientConfig::default()
        };
        let text = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: ClientConfig = toml::from_str(&text).expect("deserialize");
        assert_eq!(cfg, restored);
    }
}
