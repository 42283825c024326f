//! Error types for stevedore

use thiserror::Error;

/// Result type for stevedore operations
pub type Result<T> = std::result::Result<T, StevedoreError>;

/// stevedore error types
#[derive(Error, Debug)]
pub enum StevedoreError {
    #[error("Invalid environment entry '{entry}' for service {service}")]
    EnvEntry { service: String, entry: String },

    #[error("Invalid port '{port}' for service {service}")]
    Port { service: String, port: String },

    #[error("Unknown restart policy '{policy}' for service {service}")]
    RestartPolicy { service: String, policy: String },

    #[error("Compose error: {0}")]
    Compose(String),

    #[error("Failed to parse compose file {file}: {message}")]
    ComposeParse { file: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Cluster error: {0}")]
    Cluster(String),

    #[error("Scale must be a positive number")]
    Scale,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
