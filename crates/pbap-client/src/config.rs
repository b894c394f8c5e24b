//! TOML-based configuration for PBAP clients.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use pbap_core::constants::{
    DEFAULT_MAX_FILE_LEN, DEFAULT_MAX_PATH_LEN, DEFAULT_PATH_SEPARATOR,
    DEFAULT_STOPABORT_TIMEOUT_MS, DEFAULT_SUPPORTED_FEATURES,
};
use pbap_core::types::SupportedFeatures;
use pbap_protocol::session::config::DEFAULT_MAX_LISTING_LEN;
use pbap_protocol::session::{SessionConfig, TimeoutAction};

use crate::error::ConfigError;

/// Top-level client configuration loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub client: ClientSection,
    #[serde(default)]
    pub filesystem: FilesystemSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// The protocol-level settings for a new session.
    pub fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        let stopabort = Duration::from_millis(self.client.stopabort_timeout_ms);
        let request = self
            .client
            .request_timeout_ms
            .map_or(stopabort, Duration::from_millis);
        Ok(SessionConfig {
            stopabort_timeout: stopabort,
            request_timeout: request,
            timeout_action: parse_timeout_action(&self.client.timeout_action)?,
            local_features: SupportedFeatures(self.client.local_features),
            path_separator: self.filesystem.path_separator,
            max_path_len: self.filesystem.max_path_len,
            max_file_len: self.filesystem.max_file_len,
            max_listing_len: self.client.max_listing_bytes,
        })
    }
}

/// The `[client]` section.
#[derive(Debug, Deserialize)]
pub struct ClientSection {
    /// Service name of the local PCE.
    #[serde(default = "default_pce_name")]
    pub pce_name: String,
    /// Timeout for Connect, auth, Abort and Disconnect responses.
    #[serde(default = "default_stopabort_timeout_ms")]
    pub stopabort_timeout_ms: u64,
    /// Timeout for GET and SETPATH responses. Defaults to `stopabort_timeout_ms`.
    pub request_timeout_ms: Option<u64>,
    /// `"abort"` or `"close"`.
    #[serde(default = "default_timeout_action")]
    pub timeout_action: String,
    #[serde(default = "default_local_features")]
    pub local_features: u32,
    /// Security requirements passed to the transport on connect.
    #[serde(default)]
    pub security_mask: u8,
    #[serde(default = "default_max_listing_bytes")]
    pub max_listing_bytes: usize,
}

fn default_pce_name() -> String {
    "Phonebook Access PCE".to_string()
}

fn default_stopabort_timeout_ms() -> u64 {
    DEFAULT_STOPABORT_TIMEOUT_MS
}

fn default_timeout_action() -> String {
    "abort".to_string()
}

fn default_local_features() -> u32 {
    DEFAULT_SUPPORTED_FEATURES
}

fn default_max_listing_bytes() -> usize {
    DEFAULT_MAX_LISTING_LEN
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            pce_name: default_pce_name(),
            stopabort_timeout_ms: default_stopabort_timeout_ms(),
            request_timeout_ms: None,
            timeout_action: default_timeout_action(),
            local_features: default_local_features(),
            security_mask: 0,
            max_listing_bytes: default_max_listing_bytes(),
        }
    }
}

/// The `[filesystem]` section.
#[derive(Debug, Deserialize)]
pub struct FilesystemSection {
    #[serde(default = "default_path_separator")]
    pub path_separator: char,
    #[serde(default = "default_max_path_len")]
    pub max_path_len: usize,
    #[serde(default = "default_max_file_len")]
    pub max_file_len: usize,
    /// Root for relative local file names.
    pub download_dir: Option<String>,
}

fn default_path_separator() -> char {
    DEFAULT_PATH_SEPARATOR
}

fn default_max_path_len() -> usize {
    DEFAULT_MAX_PATH_LEN
}

fn default_max_file_len() -> usize {
    DEFAULT_MAX_FILE_LEN
}

impl Default for FilesystemSection {
    fn default() -> Self {
        Self {
            path_separator: default_path_separator(),
            max_path_len: default_max_path_len(),
            max_file_len: default_max_file_len(),
            download_dir: None,
        }
    }
}

impl FilesystemSection {
    pub fn download_dir(&self) -> Option<PathBuf> {
        self.download_dir.as_deref().map(PathBuf::from)
    }
}

/// The `[logging]` section.
#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Parse a timeout action string (case-insensitive).
pub fn parse_timeout_action(s: &str) -> Result<TimeoutAction, ConfigError> {
    match s.to_lowercase().as_str() {
        "abort" => Ok(TimeoutAction::Abort),
        "close" => Ok(TimeoutAction::Close),
        _ => Err(ConfigError::InvalidValue {
            field: "timeout_action",
            value: s.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let config = ClientConfig::parse("").unwrap();
        assert_eq!(config.client.pce_name, "Phonebook Access PCE");
        assert_eq!(config.client.stopabort_timeout_ms, 2000);
        assert_eq!(config.logging.level, "info");
        assert!(config.filesystem.download_dir().is_none());
        assert_eq!(config.session_config().unwrap(), SessionConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[client]
pce_name = "Car Kit"
stopabort_timeout_ms = 1500
request_timeout_ms = 10000
timeout_action = "close"
local_features = 0x3FF
security_mask = 0x12
max_listing_bytes = 65536

[filesystem]
path_separator = "\\"
max_path_len = 260
max_file_len = 128
download_dir = "/var/lib/pbap"

[logging]
level = "debug"
json = true
"#;
        let config = ClientConfig::parse(toml).unwrap();
        assert_eq!(config.client.pce_name, "Car Kit");
        assert_eq!(config.client.security_mask, 0x12);
        assert!(config.logging.json);
        assert_eq!(
            config.filesystem.download_dir(),
            Some(PathBuf::from("/var/lib/pbap"))
        );

        let session = config.session_config().unwrap();
        assert_eq!(session.stopabort_timeout, Duration::from_millis(1500));
        assert_eq!(session.request_timeout, Duration::from_secs(10));
        assert_eq!(session.timeout_action, TimeoutAction::Close);
        assert_eq!(session.local_features, SupportedFeatures(0x3FF));
        assert_eq!(session.path_separator, '\\');
        assert_eq!(session.max_path_len, 260);
        assert_eq!(session.max_file_len, 128);
        assert_eq!(session.max_listing_len, 65536);
    }

    #[test]
    fn request_timeout_defaults_to_stopabort() {
        let config = ClientConfig::parse("[client]\nstopabort_timeout_ms = 750\n").unwrap();
        let session = config.session_config().unwrap();
        assert_eq!(session.request_timeout, Duration::from_millis(750));
    }

    #[test]
    fn parse_timeout_action_variants() {
        assert_eq!(parse_timeout_action("abort").unwrap(), TimeoutAction::Abort);
        assert_eq!(parse_timeout_action("CLOSE").unwrap(), TimeoutAction::Close);
        assert!(matches!(
            parse_timeout_action("retry"),
            Err(ConfigError::InvalidValue {
                field: "timeout_action",
                ..
            })
        ));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        assert!(matches!(
            ClientConfig::parse("[client\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pbap.toml");
        std::fs::write(&path, "[logging]\nlevel = \"trace\"\n").unwrap();
        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.logging.level, "trace");

        assert!(matches!(
            ClientConfig::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Read(_))
        ));
    }
}
