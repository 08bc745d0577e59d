use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Fatal configuration errors. Any of these stops the run before a single
/// request is issued.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadTestError {
    #[error("Invalid URL {0:?}: {1}")]
    InvalidUrl(String, String),

    #[error("Invalid JSON in {0}: {1}")]
    InvalidJson(String, String),

    #[error("Invalid {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Invalid header {0:?}: {1}")]
    InvalidHeader(String, String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl LoadTestError {
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        LoadTestError::InvalidParameter { name: name.to_string(), reason: reason.into() }
    }
}

/// Result type for load test setup
pub type Result<T> = std::result::Result<T, LoadTestError>;

/// Why a request produced no HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Timeout,
    ConnectionError,
    Other,
}

impl ErrorKind {
    pub fn as_name(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::ConnectionError => "connection-error",
            ErrorKind::Other => "other",
        }
    }
}

/// Result of a single dispatch: either the response status (any class) or
/// the reason no response arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Status(u16),
    Error(ErrorKind),
}

impl Outcome {
    /// Returns `true` for timeouts and transport failures. Non-2xx statuses are not errors.
    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }
}

/// One dispatched request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Offset of the dispatch from test start (monotonic clock).
    pub dispatched_at: Duration,
    /// Send to full response, or to failure.
    pub latency: Duration,
    pub outcome: Outcome,
}

/// Latency statistics in seconds. All zero when there is nothing to measure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
    pub std_dev: f64,
}

/// Aggregate view of a finished run.
///
/// `status_codes` values plus `error_count` always add up to `total_requests`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_requests: u64,
    pub error_count: u64,
    pub error_rate: f64,
    pub achieved_qps: f64,
    pub elapsed_secs: f64,
    pub latency: LatencyStats,
    pub status_codes: BTreeMap<u16, u64>,
    pub error_breakdown: BTreeMap<ErrorKind, u64>,
}

/// Target rate at a point of the run, for plotting the requested pattern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatePoint {
    pub elapsed_secs: f64,
    pub target_rate: f64,
}
