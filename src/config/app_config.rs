use std::path::PathBuf;

use clap::Parser;
use reqwest::Client;

use super::error::ConfigError;
use super::probe_config::ProbeConfig;

#[derive(Parser, Debug, Default)]
#[command(name = "loginprobe")]
#[command(about = "Checks that a login endpoint rate limits repeated bad-credential attempts")]
pub struct Cli {
    /// YAML file with probe settings
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Login endpoint to probe
    #[arg(short, long, env = "PROBE_URL")]
    pub url: Option<String>,

    /// Number of requests to issue
    #[arg(short, long, env = "PROBE_ATTEMPTS")]
    pub attempts: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long, env = "PROBE_TIMEOUT_SECONDS")]
    pub timeout_seconds: Option<f64>,

    /// Pause between attempts in milliseconds
    #[arg(long, env = "PROBE_DELAY_MS")]
    pub delay_ms: Option<u64>,

    /// Requests the limiter is expected to let through before it engages
    #[arg(long, env = "PROBE_EXPECTED_ALLOWED")]
    pub expected_allowed: Option<u32>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut ProbeConfig) {
        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if let Some(attempts) = self.attempts {
            config.attempts = attempts;
        }
        if let Some(timeout_seconds) = self.timeout_seconds {
            config.timeout_seconds = timeout_seconds;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.delay_ms = delay_ms;
        }
        if let Some(expected_allowed) = self.expected_allowed {
            config.expected_allowed = expected_allowed;
        }
    }
}

/// Load the probe configuration.
/// Built-in defaults are overlaid by the YAML file given with `--config` (or `CONFIG_FILE`),
/// which in turn is overlaid by individual flags and their environment variables.
/// The result is validated before it is handed out.
pub fn load_config(cli: &Cli) -> Result<ProbeConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => ProbeConfig::from_yaml_file(path)?,
        None => ProbeConfig::default(),
    };
    cli.apply_overrides(&mut config);
    config.validate()?;

    tracing::debug!(?config, "Loaded probe configuration");
    Ok(config)
}

/// Setup the HTTP client used for every attempt.
/// The configured headers are installed as default headers and the timeout bounds each request.
pub fn setup_client(config: &ProbeConfig) -> Result<Client, ConfigError> {
    let client = Client::builder()
        .timeout(config.timeout())
        .default_headers(config.header_map()?)
        .user_agent(concat!("loginprobe/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_no_flags_gives_defaults() {
        let config = load_config(&Cli::default()).expect("Defaults should be valid");
        assert_eq!(config, ProbeConfig::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "loginprobe",
            "--url",
            "http://127.0.0.1:9000/login",
            "--attempts",
            "10",
            "--delay-ms",
            "0",
            "--timeout-seconds",
            "0.5",
        ])
        .expect("Flags should parse");

        let config = load_config(&cli).expect("Config should be valid");
        assert_eq!(config.url, "http://127.0.0.1:9000/login");
        assert_eq!(config.attempts, 10);
        assert_eq!(config.delay_ms, 0);
        assert_eq!(config.timeout_seconds, 0.5);
        assert_eq!(config.expected_allowed, 5);
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = NamedTempFile::new().expect("Cannot create temp config");
        writeln!(file, "url: http://10.0.0.1/api/login\nattempts: 3\ndelay_ms: 250")
            .expect("Cannot write temp config");

        let cli = Cli {
            config: Some(file.path().to_path_buf()),
            attempts: Some(9),
            ..Default::default()
        };
        let config = load_config(&cli).expect("Config should be valid");
        assert_eq!(config.url, "http://10.0.0.1/api/login");
        assert_eq!(config.attempts, 9);
        assert_eq!(config.delay_ms, 250);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let cli = Cli {
            attempts: Some(0),
            ..Default::default()
        };
        assert!(matches!(load_config(&cli), Err(ConfigError::NoAttempts)));
    }

    #[test]
    fn test_setup_client() {
        assert!(setup_client(&ProbeConfig::default()).is_ok());
    }
}
