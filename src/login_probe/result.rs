use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde_json::Value;

pub const RATE_LIMITED_STATUS: u16 = 429;
pub const UNAUTHORIZED_STATUS: u16 = 401;

const RETRY_AFTER_FIELD: &str = "retry_after";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// 429: the limiter rejected the request.
    RateLimited,
    /// 401: the request reached the credential check and was turned down.
    RequestAllowed,
    /// Anything else, passed through as-is.
    Status(u16),
}

impl Classification {
    pub fn from_status(status: u16) -> Self {
        match status {
            RATE_LIMITED_STATUS => Classification::RateLimited,
            UNAUTHORIZED_STATUS => Classification::RequestAllowed,
            other => Classification::Status(other),
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::RateLimited => write!(f, "rate limited"),
            Classification::RequestAllowed => write!(f, "request allowed"),
            Classification::Status(code) => write!(f, "status {code}"),
        }
    }
}

/// The `retry_after` hint from a 429 body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryAfter {
    Value(String),
    Unknown,
}

impl RetryAfter {
    /// Looks up `retry_after` in a JSON object body.
    /// Numbers and strings are kept verbatim; a missing field, any other JSON type,
    /// or a body that is not JSON at all yields `Unknown`.
    pub fn from_body(body: &[u8]) -> Self {
        let field = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|json| json.get(RETRY_AFTER_FIELD).cloned());

        match field {
            Some(Value::Number(n)) => RetryAfter::Value(n.to_string()),
            Some(Value::String(s)) => RetryAfter::Value(s),
            _ => RetryAfter::Unknown,
        }
    }
}

impl fmt::Display for RetryAfter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryAfter::Value(v) => write!(f, "{v}"),
            RetryAfter::Unknown => write!(f, "unknown"),
        }
    }
}

/// One attempt that got an HTTP response back.
#[derive(Debug, Clone)]
pub struct AttemptResult {
    /// 1-based position in the burst.
    pub attempt: u32,
    pub status: u16,
    pub timestamp: DateTime<Local>,
    pub elapsed: Duration,
    pub classification: Classification,
    /// Only set for rate limited responses.
    pub retry_after: Option<RetryAfter>,
}

impl AttemptResult {
    pub fn new(
        attempt: u32,
        status: u16,
        body: &[u8],
        timestamp: DateTime<Local>,
        elapsed: Duration,
    ) -> Self {
        let classification = Classification::from_status(status);
        let retry_after = match classification {
            Classification::RateLimited => Some(RetryAfter::from_body(body)),
            _ => None,
        };

        AttemptResult {
            attempt,
            status,
            timestamp,
            elapsed,
            classification,
            retry_after,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == RATE_LIMITED_STATUS
    }
}

/// An attempt that never produced a response.
#[derive(Debug, Clone)]
pub struct TransportFailure {
    pub attempt: u32,
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub total: usize,
    pub allowed: usize,
    pub rate_limited: usize,
    pub transport_failures: usize,
}

impl Summary {
    pub fn new(results: &[AttemptResult], failures: &[TransportFailure]) -> Self {
        let rate_limited = results.iter().filter(|r| r.is_rate_limited()).count();
        Summary {
            total: results.len(),
            allowed: results.len() - rate_limited,
            rate_limited,
            transport_failures: failures.len(),
        }
    }

    /// True when at least one response was rate limited.
    pub fn verdict(&self) -> bool {
        self.rate_limited > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(attempt: u32, status: u16, body: &str) -> AttemptResult {
        AttemptResult::new(
            attempt,
            status,
            body.as_bytes(),
            Local::now(),
            Duration::from_millis(12),
        )
    }

    #[test]
    fn test_classification_from_status() {
        assert_eq!(Classification::from_status(429), Classification::RateLimited);
        assert_eq!(Classification::from_status(401), Classification::RequestAllowed);
        assert_eq!(Classification::from_status(200), Classification::Status(200));
        assert_eq!(Classification::Status(503).to_string(), "status 503");
        assert_eq!(Classification::RequestAllowed.to_string(), "request allowed");
        assert_eq!(Classification::RateLimited.to_string(), "rate limited");
    }

    #[test]
    fn test_retry_after_from_number() {
        assert_eq!(
            RetryAfter::from_body(br#"{"retry_after": 30}"#),
            RetryAfter::Value("30".to_string())
        );
    }

    #[test]
    fn test_retry_after_from_string() {
        assert_eq!(
            RetryAfter::from_body(br#"{"error": "slow down", "retry_after": "45"}"#).to_string(),
            "45"
        );
    }

    #[test]
    fn test_retry_after_unknown() {
        for body in [
            "Too Many Requests",
            "",
            r#"{"error": "slow down"}"#,
            r#"{"retry_after": null}"#,
            r#"[1, 2, 3]"#,
        ] {
            assert_eq!(
                RetryAfter::from_body(body.as_bytes()),
                RetryAfter::Unknown,
                "body {body:?}"
            );
        }
        assert_eq!(RetryAfter::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_unauthorized_ignores_body() {
        let r = result(1, 401, r#"{"retry_after": 30}"#);
        assert_eq!(r.classification, Classification::RequestAllowed);
        assert_eq!(r.retry_after, None);
        assert!(!r.is_rate_limited());
    }

    #[test]
    fn test_rate_limited_carries_retry_after() {
        let r = result(6, 429, "<html>busy</html>");
        assert_eq!(r.classification, Classification::RateLimited);
        assert_eq!(r.retry_after, Some(RetryAfter::Unknown));
        assert!(r.is_rate_limited());
    }

    #[test]
    fn test_summary_partitions_on_429() {
        let results = vec![
            result(1, 401, ""),
            result(2, 500, ""),
            result(3, 429, ""),
            result(4, 429, ""),
        ];
        let failures = vec![TransportFailure {
            attempt: 5,
            error: "timed out".to_string(),
        }];

        let summary = Summary::new(&results, &failures);
        assert_eq!(
            summary,
            Summary {
                total: 4,
                allowed: 2,
                rate_limited: 2,
                transport_failures: 1,
            }
        );
        assert!(summary.verdict());
    }

    #[test]
    fn test_empty_summary_has_negative_verdict() {
        let summary = Summary::new(&[], &[]);
        assert_eq!(summary, Summary::default());
        assert!(!summary.verdict());
    }
}
