//! Server configuration.
//!
//! # Invariants
//! - A validated config never carries a blank API key.

use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Header carrying the shared API key.
pub const API_KEY_HEADER: &str = "x-api-key";
/// API key used when none is configured.
pub const DEFAULT_API_KEY: &str = "STATIC_API_KEY";
/// Listen address used when none is configured.
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
/// Database file used when none is configured.
pub const DEFAULT_DB_PATH: &str = "orgs.db";

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub db_path: PathBuf,
    pub api_key: String,
}

/// Invalid server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyApiKey,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyApiKey => write!(f, "api key must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ServerConfig {
    /// Checks settings that clap cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ServerConfig, DEFAULT_API_KEY, DEFAULT_BIND, DEFAULT_DB_PATH};

    fn config(api_key: &str) -> ServerConfig {
        ServerConfig {
            bind: DEFAULT_BIND.parse().unwrap(),
            db_path: DEFAULT_DB_PATH.into(),
            api_key: api_key.to_string(),
        }
    }

    #[test]
    fn default_key_is_valid() {
        assert_eq!(config(DEFAULT_API_KEY).validate(), Ok(()));
    }

    #[test]
    fn blank_key_is_rejected() {
        assert_eq!(config("  ").validate(), Err(ConfigError::EmptyApiKey));
    }
}
