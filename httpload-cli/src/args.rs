use clap::{Parser, ValueEnum};
use httpload_common::{LoadTestError, Result};
use httpload_engine::{Pattern, TestConfig};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PatternArg {
    Constant,
    Spike,
    Ramp,
}

#[derive(Parser, Debug)]
#[command(name = "httpload", about = "Rate-controlled HTTP load generator")]
pub struct Args {
    /// URL to load test
    pub url: String,

    /// Target requests per second (peak of a ramp, base of a spike)
    #[arg(long, default_value_t = 10.0)]
    pub qps: f64,

    /// Maximum requests in flight at once
    #[arg(long, default_value_t = 10)]
    pub concurrency: usize,

    /// How long to dispatch new requests (seconds)
    #[arg(long, default_value_t = 60.0)]
    pub duration: f64,

    /// Per-request timeout (seconds)
    #[arg(long, default_value_t = 30.0)]
    pub timeout: f64,

    /// Request rate pattern
    #[arg(long, value_enum, default_value_t = PatternArg::Constant)]
    pub pattern: PatternArg,

    /// Request headers as a JSON object of strings
    #[arg(long, default_value = "{}")]
    pub headers: String,

    /// JSON request body; sending one switches the method to POST
    #[arg(long)]
    pub payload: Option<String>,

    /// Ramp: starting rate; the ramp ends at --qps
    #[arg(long, default_value_t = 1.0)]
    pub ramp_start: f64,

    /// Spike: rate multiplier applied during a burst
    #[arg(long, default_value_t = 5.0)]
    pub spike_multiplier: f64,

    /// Spike: seconds between the starts of consecutive bursts
    #[arg(long, default_value_t = 20.0)]
    pub spike_period: f64,

    /// Spike: length of each burst (seconds)
    #[arg(long, default_value_t = 10.0)]
    pub spike_width: f64,

    /// Scheduler time slice (milliseconds)
    #[arg(long, default_value_t = 100)]
    pub slice_ms: u64,

    /// Write summary, samples and rate curve as JSON to this file
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl Args {
    pub fn pattern(&self) -> Pattern {
        match self.pattern {
            PatternArg::Constant => Pattern::Constant,
            PatternArg::Ramp => Pattern::Ramp { start: self.ramp_start },
            PatternArg::Spike => Pattern::Spike {
                multiplier: self.spike_multiplier,
                period: self.spike_period,
                width: self.spike_width,
            },
        }
    }

    /// Parse the JSON options and assemble a validated [`TestConfig`].
    pub fn to_config(&self) -> Result<TestConfig> {
        let config = TestConfig {
            url: self.url.clone(),
            headers: parse_headers(&self.headers)?,
            payload: self.payload.as_deref().map(parse_payload).transpose()?,
            qps: self.qps,
            concurrency: self.concurrency,
            duration_secs: self.duration,
            timeout_secs: self.timeout,
            pattern: self.pattern(),
            slice: Duration::from_millis(self.slice_ms),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Parse `--headers`: a JSON object whose values are all strings.
pub fn parse_headers(raw: &str) -> Result<BTreeMap<String, String>> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| LoadTestError::InvalidJson("--headers".to_string(), e.to_string()))?;
    let serde_json::Value::Object(map) = value else {
        return Err(LoadTestError::InvalidJson("--headers".to_string(), "expected a JSON object".to_string()));
    };
    map.into_iter()
        .map(|(name, value)| match value {
            serde_json::Value::String(s) => Ok((name, s)),
            other => Err(LoadTestError::InvalidHeader(name, format!("value must be a string, got {other}"))),
        })
        .collect()
}

/// Parse `--payload`: any JSON document.
pub fn parse_payload(raw: &str) -> Result<serde_json::Value> {
    serde_json::from_str(raw).map_err(|e| LoadTestError::InvalidJson("--payload".to_string(), e.to_string()))
}
