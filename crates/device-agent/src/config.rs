//! Agent Configuration
//!
//! Defines the agent's on-disk configuration (config.toml) and how it is
//! resolved. The configuration is passed explicitly to the components that
//! need it so tests can point them at isolated directories.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info};

use crate::error::ConfigError;

/// Agent configuration (config.toml)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Directory holding the persisted device documents
    #[serde(default = "default_data_directory")]
    pub data_directory: PathBuf,
    /// File name of the device document inside the data directory
    #[serde(default = "default_device_store")]
    pub device_store: String,
    #[serde(default)]
    pub listener: ListenerConfig,
}

/// Local message intake configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_udp_port")]
    pub udp_port: u16,
}

fn default_data_directory() -> PathBuf {
    PathBuf::from("./data")
}

fn default_device_store() -> String {
    "device.json".to_string()
}

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_udp_port() -> u16 {
    41234
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            data_directory: default_data_directory(),
            device_store: default_device_store(),
            listener: ListenerConfig::default(),
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_host(),
            udp_port: default_udp_port(),
        }
    }
}

impl AgentConfig {
    /// Create a config rooted at the given data directory
    pub fn with_data_directory(data_directory: impl Into<PathBuf>) -> Self {
        Self {
            data_directory: data_directory.into(),
            ..Default::default()
        }
    }

    /// Load the configuration from a TOML file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).await?;
        let config: AgentConfig = toml::from_str(&content)?;
        info!("Loaded agent config from {}", path.display());
        Ok(config)
    }

    /// Load the configuration, falling back to defaults when the file is missing
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match Self::load(path.as_ref()).await {
            Err(ConfigError::NotFound(p)) => {
                debug!("No config at {}, using defaults", p.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Apply environment overrides
    ///
    /// Reads:
    /// - `AGENT_DATA_DIR`: data directory
    /// - `AGENT_UDP_HOST`: listener bind address
    /// - `AGENT_UDP_PORT`: listener UDP port
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(dir) = lookup("AGENT_DATA_DIR") {
            self.data_directory = PathBuf::from(dir);
        }
        if let Some(host) = lookup("AGENT_UDP_HOST") {
            self.listener.host = host;
        }
        if let Some(port) = lookup("AGENT_UDP_PORT") {
            self.listener.udp_port = port.parse().map_err(|_| ConfigError::InvalidEnv {
                key: "AGENT_UDP_PORT",
                value: port,
            })?;
        }
        Ok(self)
    }

    /// Resolve a file inside the data directory
    pub fn data_file(&self, name: &str) -> PathBuf {
        self.data_directory.join(name)
    }

    /// Address the UDP listener binds to
    pub fn listener_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.listener.host, self.listener.udp_port).parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.data_directory, PathBuf::from("./data"));
        assert_eq!(config.device_store, "device.json");
        assert!(config.listener.enabled);
        assert_eq!(config.listener_addr().unwrap().port(), 41234);
    }

    #[tokio::test]
    async fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
data_directory = "/var/lib/agent"

[listener]
udp_port = 5000
"#,
        )
        .await
        .unwrap();

        let config = AgentConfig::load(&path).await.unwrap();
        assert_eq!(config.data_directory, PathBuf::from("/var/lib/agent"));
        assert_eq!(config.device_store, "device.json");
        assert_eq!(config.listener.host, "127.0.0.1");
        assert_eq!(config.listener.udp_port, 5000);
        assert_eq!(
            config.data_file("device.json"),
            PathBuf::from("/var/lib/agent/device.json")
        );
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");

        assert!(matches!(
            AgentConfig::load(&path).await,
            Err(ConfigError::NotFound(_))
        ));
        let config = AgentConfig::load_or_default(&path).await.unwrap();
        assert_eq!(config.device_store, "device.json");
    }

    #[tokio::test]
    async fn test_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "data_directory = [").await.unwrap();

        assert!(matches!(
            AgentConfig::load_or_default(&path).await,
            Err(ConfigError::TomlParseError(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [("AGENT_DATA_DIR", "/tmp/agent"), ("AGENT_UDP_PORT", "6000")]
            .into_iter()
            .collect();

        let config = AgentConfig::default()
            .with_overrides_from(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.data_directory, PathBuf::from("/tmp/agent"));
        assert_eq!(config.listener.udp_port, 6000);

        let bad = AgentConfig::default()
            .with_overrides_from(|k| (k == "AGENT_UDP_PORT").then(|| "port".to_string()));
        assert!(matches!(bad, Err(ConfigError::InvalidEnv { .. })));
    }
}
