//! Host settings
//!
//! Receiver and logging configuration plus what the monitor prints. Stored
//! as JSON in the user's config directory unless a path is given.

use anyhow::{Context, Result};
use artnet_in_control::ReceiverConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::LogConfig;

/// Environment variable overriding the bind address
pub const ENV_IP: &str = "ARTNET_IN_IP";
/// Environment variable overriding the UDP port
pub const ENV_PORT: &str = "ARTNET_IN_PORT";
/// Environment variable overriding the universe
pub const ENV_UNIVERSE: &str = "ARTNET_IN_UNIVERSE";

/// Monitor settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSettings {
    /// Receiver network and protocol settings
    pub receiver: ReceiverConfig,
    /// Logging settings
    pub log: LogConfig,
    /// Channels (0-based) printed on every tick
    pub watch_channels: Vec<u16>,
    /// Print interval in milliseconds
    pub print_interval_ms: u64,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            receiver: ReceiverConfig::default(),
            log: LogConfig::default(),
            watch_channels: vec![0, 1, 2, 3],
            print_interval_ms: 500,
        }
    }
}

impl HostSettings {
    /// Get the default settings file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("ArtNetIn");
            p.push("config.json");
            p
        })
    }

    /// Load settings.
    ///
    /// An explicit path must exist. Without one, the default path is used if
    /// present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {:?}", path))?;
        let settings: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings: {:?}", path))?;
        Ok(settings)
    }

    /// Save as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write settings: {:?}", path))?;
        Ok(())
    }

    /// Apply `ARTNET_IN_*` overrides looked up through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(ip) = lookup(ENV_IP) {
            self.receiver.ip = ip;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.receiver.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}: {}", ENV_PORT, port))?;
        }
        if let Some(universe) = lookup(ENV_UNIVERSE) {
            self.receiver.universe = universe
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}: {}", ENV_UNIVERSE, universe))?;
        }
        Ok(())
    }
}
