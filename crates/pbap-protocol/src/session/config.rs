//! Protocol-level session configuration.

use std::time::Duration;

use pbap_core::constants::{
    DEFAULT_MAX_FILE_LEN, DEFAULT_MAX_PATH_LEN, DEFAULT_PATH_SEPARATOR,
    DEFAULT_STOPABORT_TIMEOUT_MS,
};
use pbap_core::types::SupportedFeatures;

use crate::error::SessionError;

/// Default cap on a reassembled listing document.
pub const DEFAULT_MAX_LISTING_LEN: usize = 1024 * 1024;

/// What happens when a GET or SETPATH response does not arrive in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeoutAction {
    /// Send an OBEX Abort first, then force close if that also times out.
    #[default]
    Abort,
    /// Force close immediately.
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Wait for an Abort, Connect, auth or Disconnect response.
    pub stopabort_timeout: Duration,
    /// Wait for a GET or SETPATH response.
    pub request_timeout: Duration,
    pub timeout_action: TimeoutAction,
    /// Features announced to 1.2 servers in the Connect request.
    pub local_features: SupportedFeatures,
    pub path_separator: char,
    pub max_path_len: usize,
    pub max_file_len: usize,
    pub max_listing_len: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let stopabort = Duration::from_millis(DEFAULT_STOPABORT_TIMEOUT_MS);
        Self {
            stopabort_timeout: stopabort,
            request_timeout: stopabort,
            timeout_action: TimeoutAction::Abort,
            local_features: SupportedFeatures::default(),
            path_separator: DEFAULT_PATH_SEPARATOR,
            max_path_len: DEFAULT_MAX_PATH_LEN,
            max_file_len: DEFAULT_MAX_FILE_LEN,
            max_listing_len: DEFAULT_MAX_LISTING_LEN,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.stopabort_timeout.is_zero() || self.request_timeout.is_zero() {
            return Err(SessionError::InvalidConfig("timeouts must be non-zero".into()));
        }
        if self.max_file_len == 0 || self.max_path_len < self.max_file_len {
            return Err(SessionError::InvalidConfig(format!(
                "max_path_len ({}) must be at least max_file_len ({}) and non-zero",
                self.max_path_len, self.max_file_len
            )));
        }
        if self.max_listing_len == 0 {
            return Err(SessionError::InvalidConfig("max_listing_len must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = SessionConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.stopabort_timeout, Duration::from_secs(2));
        assert_eq!(cfg.request_timeout, cfg.stopabort_timeout);
        assert_eq!(cfg.max_path_len, 294);
        assert_eq!(cfg.max_file_len, 256);
    }

    #[test]
    fn zero_timeout_rejected() {
        let cfg = SessionConfig {
            stopabort_timeout: Duration::ZERO,
            ..SessionConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(SessionError::InvalidConfig(_))));
    }

    #[test]
    fn path_shorter_than_file_rejected() {
        let cfg = SessionConfig {
            max_path_len: 10,
            max_file_len: 20,
            ..SessionConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
