//! Cluster client configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Environment variable overriding the configured API server
pub const SERVER_ENV: &str = "STEVEDORE_SERVER";

/// Cluster API connection settings
///
/// The namespace is carried here and threaded through the client rather
/// than living in a global constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// API server base URL
    pub server: String,
    /// Namespace all operations run in
    pub namespace: String,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            server: "http://localhost:8080".to_string(),
            namespace: "default".to_string(),
        }
    }
}

impl ClusterConfig {
    /// Location of the persisted configuration
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stevedore")
            .join("config.json")
    }

    /// Load persisted settings, falling back to defaults
    ///
    /// The `STEVEDORE_SERVER` environment variable wins over both.
    pub fn load() -> Self {
        let mut config = Self::load_from(&Self::path());
        if let Ok(server) = std::env::var(SERVER_ENV) {
            if !server.is_empty() {
                config.server = server;
            }
        }
        config
    }

    fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Persist the settings
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
