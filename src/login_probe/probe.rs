use std::time::Instant;

use chrono::Local;
use reqwest::Client;

use super::prelude::*;
use super::report;

#[derive(Debug)]
pub enum AttemptOutcome {
    Response(AttemptResult),
    Failed(TransportFailure),
}

/// POSTs the login body once and classifies what comes back.
/// The client carries the headers and the per-request timeout.
/// A failure while reading the body counts as a transport failure,
/// same as a refused connection or a timeout.
pub async fn send_attempt(client: &Client, url: &str, body: &[u8], attempt: u32) -> AttemptOutcome {
    tracing::debug!(attempt, url, "Sending login attempt");

    let start = Instant::now();
    let response = match client.post(url).body(body.to_vec()).send().await {
        Ok(response) => response,
        Err(e) => return failed(attempt, &e),
    };

    let status = response.status().as_u16();
    let response_body = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => return failed(attempt, &e),
    };
    let elapsed = start.elapsed();
    let timestamp = Local::now();

    let result = AttemptResult::new(attempt, status, &response_body, timestamp, elapsed);
    tracing::debug!(
        attempt,
        status,
        classification = %result.classification,
        elapsed_ms = result.elapsed.as_millis() as u64,
        "Received response"
    );

    AttemptOutcome::Response(result)
}

fn failed(attempt: u32, err: &reqwest::Error) -> AttemptOutcome {
    tracing::warn!(attempt, error = %err, "Login attempt failed before a response arrived");
    AttemptOutcome::Failed(TransportFailure {
        attempt,
        error: report::error_chain(err),
    })
}
