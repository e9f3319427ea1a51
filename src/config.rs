//! Configuration management for procnet
//!
//! Settings live in `~/.config/procnet/config.toml`:
//!
//! ```toml
//! [tables]
//! proc_net_root = "/proc/net"
//! ipv6_byte_order = "auto"   # or "direct", "word-reversed"
//! include_ipv6 = true
//! ```

use crate::address::Ipv6ByteOrder;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// procnet configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where and how to read the kernel tables
    #[serde(default)]
    pub tables: TablesConfig,
}

/// Table source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablesConfig {
    /// Directory holding tcp, tcp6, udp, udp6, sockstat, sockstat6
    #[serde(default = "default_proc_net_root")]
    pub proc_net_root: PathBuf,
    /// Layout of 32-digit IPv6 address fields
    #[serde(default)]
    pub ipv6_byte_order: ByteOrderSetting,
    /// Read the IPv6 tables; when false they are treated as absent
    #[serde(default = "default_true")]
    pub include_ipv6: bool,
}

/// IPv6 field layout as written in the config file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ByteOrderSetting {
    /// Follow the host's endianness
    #[default]
    Auto,
    Direct,
    WordReversed,
}

impl ByteOrderSetting {
    pub fn resolve(self) -> Ipv6ByteOrder {
        match self {
            ByteOrderSetting::Auto => Ipv6ByteOrder::native(),
            ByteOrderSetting::Direct => Ipv6ByteOrder::Direct,
            ByteOrderSetting::WordReversed => Ipv6ByteOrder::WordReversed,
        }
    }
}

fn default_proc_net_root() -> PathBuf {
    PathBuf::from("/proc/net")
}

fn default_true() -> bool {
    true
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            proc_net_root: default_proc_net_root(),
            ipv6_byte_order: ByteOrderSetting::Auto,
            include_ipv6: true,
        }
    }
}

impl Config {
    /// Get the default configuration directory
    ///
    /// Returns `~/.config/procnet` on Unix-like systems,
    /// or `%APPDATA%\procnet` on Windows.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(windows) {
            std::env::var("APPDATA")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
        } else {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|_| PathBuf::from(".config"))
        };

        Ok(config_dir.join("procnet"))
    }

    /// Load configuration from the default path, falling back to defaults
    pub fn load() -> Result<Self> {
        let config_file = Self::default_path()?.join("config.toml");

        if !config_file.exists() {
            log::debug!("no config at {}, using defaults", config_file.display());
            return Ok(Self::default());
        }

        Self::load_from(&config_file)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.tables.proc_net_root, PathBuf::from("/proc/net"));
        assert_eq!(config.tables.ipv6_byte_order, ByteOrderSetting::Auto);
        assert!(config.tables.include_ipv6);
        assert_eq!(
            config.tables.ipv6_byte_order.resolve(),
            Ipv6ByteOrder::native()
        );
    }

    #[test]
    fn test_partial_config() {
        let config: Config = toml::from_str(
            "[tables]\nipv6_byte_order = \"direct\"\ninclude_ipv6 = false\n",
        )
        .unwrap();
        assert_eq!(config.tables.proc_net_root, PathBuf::from("/proc/net"));
        assert_eq!(config.tables.ipv6_byte_order.resolve(), Ipv6ByteOrder::Direct);
        assert!(!config.tables.include_ipv6);

        let empty: Config = toml::from_str("").unwrap();
        assert!(empty.tables.include_ipv6);
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.tables.ipv6_byte_order = ByteOrderSetting::WordReversed;
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("word-reversed"));
        let deserialized: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(
            config.tables.ipv6_byte_order,
            deserialized.tables.ipv6_byte_order
        );
    }

    #[test]
    fn test_bad_config_file() {
        let path = std::env::temp_dir().join(format!("procnet-config-{}.toml", std::process::id()));
        std::fs::write(&path, "[tables]\ninclude_ipv6 = \"maybe\"\n").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, Error::Config(_)));
    }
}
