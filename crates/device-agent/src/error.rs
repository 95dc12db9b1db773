//! Error types for the device agent.

use std::path::PathBuf;

/// Errors that can occur while persisting the device document.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize device document: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while loading the agent configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },
}

/// Errors reported by a connector.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConnectorError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Rejected by remote: {0}")]
    Rejected(String),
}

/// Result type for connector operations
pub type ConnectorResult<T> = Result<T, ConnectorError>;
