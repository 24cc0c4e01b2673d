use reqwest::Client;
use tokio::time::sleep;

use crate::config::app_config::setup_client;
use crate::config::error::ConfigError;
use crate::config::probe_config::ProbeConfig;

use super::prelude::*;
use super::report;

/// Runs one burst of login attempts and keeps what came back.
/// Responses land in `results` in attempt order; attempts that never got a
/// response land in `failures` instead. Both are emptied when a run starts.
pub struct ProbeRunner {
    config: ProbeConfig,
    client: Client,
    body: Vec<u8>,
    results: Vec<AttemptResult>,
    failures: Vec<TransportFailure>,
}

impl ProbeRunner {
    pub fn new(config: ProbeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = setup_client(&config)?;
        let body = serde_json::to_vec(&config.payload)?;

        Ok(ProbeRunner {
            config,
            client,
            body,
            results: Vec::new(),
            failures: Vec::new(),
        })
    }

    /// Issues `attempts` requests one after another, narrating each to stdout,
    /// and returns whether any of them was rate limited.
    /// Transport failures still use up an attempt; the loop never stops early.
    /// Each call starts from an empty log.
    pub async fn run(&mut self) -> bool {
        self.results.clear();
        self.failures.clear();

        println!("{}", report::header(&self.config));

        for attempt in 1..=self.config.attempts {
            match send_attempt(&self.client, &self.config.url, &self.body, attempt).await {
                AttemptOutcome::Response(result) => {
                    println!("{}", report::attempt_line(&result));
                    self.results.push(result);
                }
                AttemptOutcome::Failed(failure) => {
                    println!("{}", report::transport_failure_line(&failure));
                    self.failures.push(failure);
                }
            }

            sleep(self.config.delay()).await;
        }

        let summary = self.summary();
        println!("{}", report::summary_block(&summary));
        summary.verdict()
    }

    pub fn results(&self) -> &[AttemptResult] {
        &self.results
    }

    pub fn failures(&self) -> &[TransportFailure] {
        &self.failures
    }

    pub fn summary(&self) -> Summary {
        Summary::new(&self.results, &self.failures)
    }
}
