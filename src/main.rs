use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod config;
use config::app_config::{Cli, load_config};
pub mod login_probe;
use login_probe::{prelude::*, report};

/// Exit code when at least one attempt was rate limited.
const EXIT_RATE_LIMITED: u8 = 0;
/// Exit code when the burst went through without a single 429.
const EXIT_NOT_LIMITED: u8 = 1;
/// Exit code when the probe could not even start.
const EXIT_CONFIG_ERROR: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine; everything has a default.
    let _ = dotenvy::dotenv();

    // Diagnostics go to stderr so stdout carries only the narrative.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let runner = load_config(&cli).and_then(ProbeRunner::new);
    let mut runner = match runner {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    println!("{}", report::intro_banner());

    let verdict = runner.run().await;
    tracing::info!(
        responses = runner.results().len(),
        transport_failures = runner.failures().len(),
        verdict,
        "Probe finished"
    );

    println!("{}", report::closing_line(verdict));

    ExitCode::from(verdict_exit_code(verdict))
}

fn verdict_exit_code(rate_limited: bool) -> u8 {
    if rate_limited {
        EXIT_RATE_LIMITED
    } else {
        EXIT_NOT_LIMITED
    }
}
