//! Compose configuration types

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Compose file configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComposeConfig {
    /// Compose file version
    #[serde(default)]
    pub version: Option<String>,
    /// Services
    #[serde(default)]
    pub services: HashMap<String, ServiceConfig>,
}

/// Service configuration
///
/// Only the fields consumed by the manifest builders are modeled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Image name
    #[serde(default)]
    pub image: Option<String>,
    /// Command to run
    #[serde(default)]
    pub command: Option<CommandConfig>,
    /// Environment variables
    #[serde(default)]
    pub environment: Option<EnvironmentConfig>,
    /// Working directory
    #[serde(default)]
    pub working_dir: Option<String>,
    /// Volume mounts (`HOST:CONTAINER[:MODE]`)
    #[serde(default)]
    pub volumes: Vec<String>,
    /// Port mappings (`HOST:CONTAINER` or bare port)
    #[serde(default)]
    pub ports: Vec<String>,
    /// Privileged mode
    #[serde(default)]
    pub privileged: Option<bool>,
    /// Labels
    #[serde(default)]
    pub labels: Option<LabelsConfig>,
    /// Linked services
    #[serde(default)]
    pub links: Vec<String>,
    /// Restart policy
    #[serde(default)]
    pub restart: Option<String>,
}

impl ServiceConfig {
    /// Environment entries in the raw `KEY=VALUE` form
    ///
    /// Map-form environments are rendered in key order so repeated runs
    /// produce identical entry sequences.
    pub fn environment_entries(&self) -> Vec<String> {
        match &self.environment {
            Some(EnvironmentConfig::Array(entries)) => entries.clone(),
            Some(EnvironmentConfig::Map(map)) => {
                let sorted: BTreeMap<&String, &Option<String>> = map.iter().collect();
                sorted
                    .into_iter()
                    .map(|(key, value)| format!("{}={}", key, value.as_deref().unwrap_or("")))
                    .collect()
            }
            None => Vec::new(),
        }
    }

    /// Command tokens in exec form
    ///
    /// Shell-form commands are wrapped in a `/bin/sh -c` invocation.
    pub fn command_tokens(&self) -> Vec<String> {
        match &self.command {
            Some(CommandConfig::Shell(line)) => vec![
                "/bin/sh".to_string(),
                "-c".to_string(),
                line.clone(),
            ],
            Some(CommandConfig::Exec(tokens)) => tokens.clone(),
            None => Vec::new(),
        }
    }

    /// Labels normalized to a sorted map
    pub fn label_map(&self) -> BTreeMap<String, String> {
        match &self.labels {
            Some(LabelsConfig::Array(entries)) => entries
                .iter()
                .map(|entry| match entry.split_once('=') {
                    Some((key, value)) => (key.to_string(), value.to_string()),
                    None => (entry.clone(), String::new()),
                })
                .collect(),
            Some(LabelsConfig::Map(map)) => {
                map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
            }
            None => BTreeMap::new(),
        }
    }

    /// Restart policy literal; absent means the platform default
    pub fn restart_policy(&self) -> &str {
        self.restart.as_deref().unwrap_or("")
    }
}

/// Command configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandConfig {
    /// Shell command string
    Shell(String),
    /// Exec form array
    Exec(Vec<String>),
}

/// Environment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvironmentConfig {
    /// Array of KEY=value strings
    Array(Vec<String>),
    /// Map of key to value
    Map(HashMap<String, Option<String>>),
}

/// Labels configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelsConfig {
    /// Array of "key=value" strings
    Array(Vec<String>),
    /// Map of key to value
    Map(HashMap<String, String>),
}
