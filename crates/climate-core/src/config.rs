//! Node configuration.
//!
//! Credentials and port used to be process-wide constants. They are now
//! collected in `NodeConfig`, built once at startup from compile-time values
//! and handed to the components that need them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::network::{NetworkCredentials, RetryPolicy};

/// Longest SSID accepted by 802.11.
pub const MAX_SSID_LEN: usize = 32;

/// Longest WPA2 passphrase.
pub const MAX_PASSWORD_LEN: usize = 64;

/// Errors found while validating a `NodeConfig`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("WiFi SSID cannot be empty")]
    EmptySsid,

    #[error("WiFi SSID is {0} bytes (max {})", MAX_SSID_LEN)]
    SsidTooLong(usize),

    #[error("WiFi password is {0} bytes (max {})", MAX_PASSWORD_LEN)]
    PasswordTooLong(usize),

    #[error("HTTP port cannot be 0")]
    InvalidPort,

    #[error("invalid association policy: {0}")]
    InvalidPolicy(&'static str),
}

/// Everything the node needs to start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    /// Name shown on the root page and in logs.
    pub node_name: String,

    /// Network to join at startup.
    pub network: NetworkCredentials,

    /// HTTP server port.
    pub http_port: u16,

    /// Association retry policy.
    #[serde(default)]
    pub association: RetryPolicy,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_name: "climate-node".to_string(),
            network: NetworkCredentials::default(),
            http_port: 80,
            association: RetryPolicy::default(),
        }
    }
}

impl NodeConfig {
    /// Check the network settings before bring-up.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ssid_len = self.network.ssid.len();
        if ssid_len == 0 {
            return Err(ConfigError::EmptySsid);
        }
        if ssid_len > MAX_SSID_LEN {
            return Err(ConfigError::SsidTooLong(ssid_len));
        }
        let password_len = self.network.password.len();
        if password_len > MAX_PASSWORD_LEN {
            return Err(ConfigError::PasswordTooLong(password_len));
        }
        self.validate_serving()?;

        let policy = &self.association;
        if policy.max_attempts == 0 {
            return Err(ConfigError::InvalidPolicy("max_attempts must be at least 1"));
        }
        if policy.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidPolicy("poll_interval_ms must be positive"));
        }
        if policy.initial_backoff_ms > policy.max_backoff_ms {
            return Err(ConfigError::InvalidPolicy(
                "initial_backoff_ms exceeds max_backoff_ms",
            ));
        }
        Ok(())
    }

    /// Check only what the HTTP side needs (hosts where the OS owns the network).
    pub fn validate_serving(&self) -> Result<(), ConfigError> {
        if self.http_port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        Ok(())
    }
}
