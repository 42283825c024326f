//! Compose file parser

use super::config::{ComposeConfig, EnvironmentConfig};
use crate::error::{Result, StevedoreError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default compose file name
pub const DEFAULT_COMPOSE_FILE: &str = "docker-compose.yml";

/// Environment variable overriding the compose file path
pub const COMPOSE_FILE_ENV: &str = "COMPOSE_FILE";

/// Compose file parser
pub struct ComposeParser;

impl ComposeParser {
    /// Resolve the compose file path from flag, environment, or default
    pub fn resolve_file(flag: Option<PathBuf>) -> PathBuf {
        if let Some(path) = flag {
            return path;
        }
        if let Ok(path) = std::env::var(COMPOSE_FILE_ENV) {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }
        PathBuf::from(DEFAULT_COMPOSE_FILE)
    }

    /// Parse compose file from path
    pub fn parse_file(path: &Path) -> Result<ComposeConfig> {
        let parse_err = |message: String| StevedoreError::ComposeParse {
            file: path.display().to_string(),
            message,
        };
        let content = std::fs::read_to_string(path).map_err(|e| parse_err(e.to_string()))?;
        serde_yaml::from_str(&content).map_err(|e| parse_err(e.to_string()))
    }

    /// Parse compose file from string
    pub fn parse_str(content: &str) -> Result<ComposeConfig> {
        serde_yaml::from_str(content)
            .map_err(|e| StevedoreError::Compose(format!("Failed to parse YAML: {}", e)))
    }

    /// Validate compose configuration
    pub fn validate(config: &ComposeConfig) -> Result<()> {
        for (name, service) in &config.services {
            if service.image.is_none() {
                return Err(StevedoreError::Compose(format!(
                    "Service '{}' must have an 'image' specified",
                    name
                )));
            }

            for link in &service.links {
                // compose allows "service:alias" link syntax
                let target = link.split_once(':').map(|(t, _)| t).unwrap_or(link);
                if !config.services.contains_key(target) {
                    return Err(StevedoreError::Compose(format!(
                        "Service '{}' links to unknown service '{}'",
                        name, target
                    )));
                }
            }
        }

        Ok(())
    }

    /// Interpolate environment variables in image and environment values
    pub fn interpolate(config: &mut ComposeConfig, env: &HashMap<String, String>) {
        for service in config.services.values_mut() {
            if let Some(ref mut image) = service.image {
                *image = interpolate_string(image, env);
            }

            if let Some(ref mut environment) = service.environment {
                match environment {
                    EnvironmentConfig::Map(map) => {
                        for value in map.values_mut().flatten() {
                            *value = interpolate_string(value, env);
                        }
                    }
                    EnvironmentConfig::Array(entries) => {
                        for entry in entries.iter_mut() {
                            *entry = interpolate_string(entry, env);
                        }
                    }
                }
            }
        }
    }
}

/// Interpolate environment variables in a string
fn interpolate_string(s: &str, env: &HashMap<String, String>) -> String {
    let mut result = s.to_string();

    // Handle ${VAR} and $VAR syntax
    for (key, value) in env {
        result = result.replace(&format!("${{{}}}", key), value);
        result = result.replace(&format!("${}", key), value);
    }

    // Handle ${VAR:-default} syntax
    let re = regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*):-([^}]*)\}").unwrap();
    result = re
        .replace_all(&result, |caps: &regex::Captures| {
            let var = &caps[1];
            let default = &caps[2];
            env.get(var).cloned().unwrap_or_else(|| default.to_string())
        })
        .to_string();

    result
}
