use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use url::Url;

use super::error::ConfigError;

pub const DEFAULT_URL: &str = "http://localhost:8000/api/login";
pub const DEFAULT_ATTEMPTS: u32 = 7;
pub const DEFAULT_TIMEOUT_SECONDS: f64 = 5.0;
pub const DEFAULT_DELAY_MS: u64 = 100;
pub const DEFAULT_EXPECTED_ALLOWED: u32 = 5;

/// The credentials sent on every attempt.
/// They are deliberately fake so a real account never gets locked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,

    /// Serialized as `userType`, which is what the login API expects.
    #[serde(rename = "userType")]
    pub user_type: String,
}

impl Default for LoginPayload {
    fn default() -> Self {
        LoginPayload {
            email: "test_rate_limit@example.com".to_string(),
            password: "wrong_password".to_string(),
            user_type: "admin".to_string(),
        }
    }
}

/// A probe configuration for a single run.
/// Every field is optional in YAML; missing fields fall back to the defaults above.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// The login endpoint that receives the POST requests.
    pub url: String,

    /// How many requests are issued, including ones that fail at the transport level.
    pub attempts: u32,

    /// Per-request timeout in seconds.
    pub timeout_seconds: f64,

    /// Pause between two attempts in milliseconds.
    pub delay_ms: u64,

    /// How many requests the limiter is expected to let through.
    /// Only used to print the expectation in the header.
    pub expected_allowed: u32,

    /// Headers sent with every request. Providing this key replaces the defaults.
    pub headers: BTreeMap<String, String>,

    pub payload: LoginPayload,
}

fn default_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Content-Type".to_string(), "application/json".to_string()),
        ("X-Requested-With".to_string(), "XMLHttpRequest".to_string()),
    ])
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            url: DEFAULT_URL.to_string(),
            attempts: DEFAULT_ATTEMPTS,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            delay_ms: DEFAULT_DELAY_MS,
            expected_allowed: DEFAULT_EXPECTED_ALLOWED,
            headers: default_headers(),
            payload: LoginPayload::default(),
        }
    }
}

impl ProbeConfig {
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_yaml::from_str(&config_str).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_seconds)
            .unwrap_or(Duration::from_secs_f64(DEFAULT_TIMEOUT_SECONDS))
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Converts the configured headers into a reqwest header map,
    /// rejecting names or values that are not valid on the wire.
    pub fn header_map(&self) -> Result<HeaderMap, ConfigError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| ConfigError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            headers.insert(header_name, header_value);
        }
        Ok(headers)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = Url::parse(&self.url).map_err(|e| ConfigError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: self.url.clone(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        if self.attempts == 0 {
            return Err(ConfigError::NoAttempts);
        }

        if self.timeout_seconds <= 0.0
            || Duration::try_from_secs_f64(self.timeout_seconds).is_err()
        {
            return Err(ConfigError::InvalidTimeout(self.timeout_seconds));
        }

        self.header_map()?;
        Ok(())
    }
}
