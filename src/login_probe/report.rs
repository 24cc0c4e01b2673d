//! Every line the probe prints. Kept free of I/O so the narrative can be checked in tests;
//! the runner decides when each piece goes to stdout.

use std::fmt::Write;

use crate::config::probe_config::ProbeConfig;

use super::result::{AttemptResult, Classification, Summary, TransportFailure};

const RULE_WIDTH: usize = 60;
/// Lines up continuation text under the attempt text, past the `[HH:MM:SS] ` prefix.
const CONTINUATION_INDENT: &str = "           ";

fn rule(c: char) -> String {
    c.to_string().repeat(RULE_WIDTH)
}

/// Flattens an error and its `source()` chain.
/// reqwest keeps the useful part (connection refused, timed out) in the sources.
pub fn error_chain(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, "\n{CONTINUATION_INDENT}Caused by: {}", src);
        err = src;
    }
    s
}

pub fn intro_banner() -> String {
    "\n🔒 Testing Rate Limiting Protection\nThis is a SAFE test using fake credentials\n".to_string()
}

pub fn header(config: &ProbeConfig) -> String {
    format!(
        "{eq}\nRATE LIMITING TEST\n{eq}\nTarget: {url}\nExpected: First {n} requests succeed, attempt {next} gets rate limited\n{dash}",
        eq = rule('='),
        dash = rule('-'),
        url = config.url,
        n = config.expected_allowed,
        next = config.expected_allowed.saturating_add(1),
    )
}

pub fn attempt_line(result: &AttemptResult) -> String {
    let timestamp = result.timestamp.format("%H:%M:%S");
    let prefix = format!("[{timestamp}] Attempt {}:", result.attempt);

    match &result.classification {
        Classification::RateLimited => {
            let mut line = format!("{prefix} ❌ RATE LIMITED (429) - Protection working!");
            if let Some(retry_after) = &result.retry_after {
                let _ = write!(line, "\n{CONTINUATION_INDENT}Retry after: {retry_after} seconds");
            }
            line
        }
        Classification::RequestAllowed => {
            format!("{prefix} ✓ Request allowed (401 - wrong password)")
        }
        Classification::Status(code) => format!("{prefix} Status {code}"),
    }
}

pub fn transport_failure_line(failure: &TransportFailure) -> String {
    format!("[ERROR] Attempt {}: {}", failure.attempt, failure.error)
}

pub fn summary_block(summary: &Summary) -> String {
    let mut block = format!(
        "\n{eq}\nTEST SUMMARY\n{eq}\nTotal requests: {}\nAllowed: {}\nRate limited: {}",
        summary.total,
        summary.allowed,
        summary.rate_limited,
        eq = rule('='),
    );
    if summary.transport_failures > 0 {
        let _ = write!(block, "\nTransport failures: {}", summary.transport_failures);
    }

    if summary.verdict() {
        block.push_str(
            "\n\n✅ RATE LIMITING IS WORKING!\n   Your API is protected against brute force attacks.",
        );
    } else {
        block.push_str(
            "\n\n⚠️  WARNING: No rate limiting detected!\n   Your API may be vulnerable to brute force attacks.",
        );
    }
    block
}

pub fn closing_line(verdict: bool) -> String {
    if verdict {
        "\n✅ Your API is protected!".to_string()
    } else {
        "\n❌ Rate limiting may not be configured correctly".to_string()
    }
}
