//! Connection endpoint configuration.
//!
//! The config is owned by the caller and re-read on every connect attempt,
//! so an endpoint change made while disconnected (or even while a stale
//! connection is still being torn down) takes effect on the next `connect()`
//! without any restart.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for a connection endpoint.
///
/// These surface to the user as a human-readable string on the published
/// snapshot; they are never thrown across the public API.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The host field is empty or whitespace-only.
    #[error("server host must not be empty")]
    EmptyHost,

    /// The host contains characters that cannot appear in a URL authority.
    #[error("server host contains invalid characters")]
    InvalidHost,

    /// Port 0 is not a connectable port.
    #[error("server port must be between 1 and 65535")]
    InvalidPort,
}

/// Host and port of the gamepad server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Server host name or IP address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Server TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ConnectionConfig {
    /// Derives the WebSocket endpoint URI for this config.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the host or port cannot form a valid
    /// endpoint; in that case no transport is opened and the supervisor
    /// stays `Disconnected`.
    pub fn endpoint_url(&self) -> Result<String, ConfigError> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        // Reject anything that would change the meaning of the URL instead
        // of being part of the authority.
        if host
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '@'))
        {
            return Err(ConfigError::InvalidHost);
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        Ok(format!("ws://{host}:{port}/ws", port = self.port))
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint_is_local_port_8000() {
        let cfg = ConnectionConfig::default();
        assert_eq!(cfg.endpoint_url().unwrap(), "ws://127.0.0.1:8000/ws");
    }

    #[test]
    fn test_custom_endpoint_is_derived() {
        let cfg = ConnectionConfig {
            host: "192.168.1.39".to_string(),
            port: 9100,
        };
        assert_eq!(cfg.endpoint_url().unwrap(), "ws://192.168.1.39:9100/ws");
    }

    #[test]
    fn test_host_is_trimmed_before_validation() {
        let cfg = ConnectionConfig {
            host: "  10.0.0.1  ".to_string(),
            port: 8000,
        };
        assert_eq!(cfg.endpoint_url().unwrap(), "ws://10.0.0.1:8000/ws");
    }

    #[test]
    fn test_empty_host_is_rejected() {
        let cfg = ConnectionConfig { host: "   ".to_string(), port: 8000 };
        assert_eq!(cfg.endpoint_url(), Err(ConfigError::EmptyHost));
    }

    #[test]
    fn test_host_with_path_characters_is_rejected() {
        for host in ["evil/path", "a b", "x?y", "user@host"] {
            let cfg = ConnectionConfig { host: host.to_string(), port: 8000 };
            assert_eq!(cfg.endpoint_url(), Err(ConfigError::InvalidHost), "host: {host}");
        }
    }

    #[test]
    fn test_port_zero_is_rejected() {
        let cfg = ConnectionConfig { host: "127.0.0.1".to_string(), port: 0 };
        assert_eq!(cfg.endpoint_url(), Err(ConfigError::InvalidPort));
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let cfg = ConnectionConfig { host: "pad.local".to_string(), port: 8123 };
        let text = toml::to_string(&cfg).unwrap();
        let back: ConnectionConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let cfg: ConnectionConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, ConnectionConfig::default());
    }
}
