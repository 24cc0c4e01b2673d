use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a probe run before the first request goes out.
/// Once the runner starts, nothing is fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid endpoint URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Attempt count must be at least 1")]
    NoAttempts,

    #[error("Timeout must be a positive number of seconds, got {0}")]
    InvalidTimeout(f64),

    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Failed to encode login payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
