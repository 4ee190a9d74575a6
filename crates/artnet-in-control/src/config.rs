//! Receiver configuration
//!
//! Supplied by the host before `start`. Changes while running take effect on
//! the next start.

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use crate::dmx::artnet::MAX_UNIVERSE;
use crate::dmx::Timeouts;
use crate::{error::ControlError, Result};

/// Standard Art-Net UDP port
pub const ARTNET_PORT: u16 = 6454;

/// Network and protocol settings of one receiver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// Local address to bind
    pub ip: String,
    /// Local UDP port
    pub port: u16,
    /// Art-Net universe (0-32767)
    pub universe: u16,
    /// Socket read timeout in milliseconds
    pub read_timeout_ms: u64,
    /// Bounded wait for the receive thread on stop, in milliseconds
    pub join_timeout_ms: u64,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            ip: "127.0.0.1".to_string(),
            port: ARTNET_PORT,
            universe: 0,
            read_timeout_ms: 100,
            join_timeout_ms: 3000,
        }
    }
}

impl ReceiverConfig {
    /// Create a config with default timings
    pub fn new(ip: &str, port: u16, universe: u16) -> Self {
        Self {
            ip: ip.to_string(),
            port,
            universe,
            ..Self::default()
        }
    }

    /// Check every field
    pub fn validate(&self) -> Result<()> {
        self.endpoint()?;

        if self.universe > MAX_UNIVERSE {
            return Err(ControlError::InvalidParameter(format!(
                "Universe {} out of range (0-{})",
                self.universe, MAX_UNIVERSE
            )));
        }

        if self.read_timeout_ms == 0 || self.join_timeout_ms == 0 {
            return Err(ControlError::InvalidParameter(
                "Timeouts must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Socket address to bind
    pub fn endpoint(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.ip.trim().parse().map_err(|e| {
            ControlError::InvalidParameter(format!("Invalid IP address '{}': {}", self.ip, e))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Receiver timings
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            read: Duration::from_millis(self.read_timeout_ms),
            join: Duration::from_millis(self.join_timeout_ms),
        }
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReceiverConfig::default();

        assert_eq!(config.ip, "127.0.0.1");
        assert_eq!(config.port, 6454);
        assert_eq!(config.universe, 0);
        assert!(config.validate().is_ok());
        assert_eq!(
            config.endpoint().unwrap(),
            "127.0.0.1:6454".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_invalid_ip() {
        let config = ReceiverConfig::new("not-an-ip", 6454, 0);

        match config.validate() {
            Err(ControlError::InvalidParameter(msg)) => assert!(msg.contains("not-an-ip")),
            other => panic!("Expected InvalidParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_ipv6_endpoint() {
        let config = ReceiverConfig::new("::1", 6454, 0);
        assert!(config.endpoint().unwrap().is_ipv6());
    }

    #[test]
    fn test_universe_range() {
        assert!(ReceiverConfig::new("0.0.0.0", 6454, 32767).validate().is_ok());
        assert!(ReceiverConfig::new("0.0.0.0", 6454, 32768).validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = ReceiverConfig {
            read_timeout_ms: 0,
            ..ReceiverConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timeouts() {
        let timeouts = ReceiverConfig::default().timeouts();
        assert_eq!(timeouts, Timeouts::default());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ReceiverConfig = serde_json::from_str(r#"{"universe": 5}"#).unwrap();

        assert_eq!(config.universe, 5);
        assert_eq!(config.port, 6454);
        assert_eq!(config.read_timeout_ms, 100);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("receiver.json");
        let config = ReceiverConfig::new("0.0.0.0", 6455, 12);

        config.save(&path).unwrap();
        let loaded = ReceiverConfig::load(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receiver.json");
        std::fs::write(&path, r#"{"universe": 40000}"#).unwrap();

        assert!(ReceiverConfig::load(&path).is_err());
    }
}
