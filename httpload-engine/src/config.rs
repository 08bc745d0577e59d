use httpload_common::{LoadTestError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::pattern::Pattern;

/// Default scheduler discretization.
pub const DEFAULT_SLICE: Duration = Duration::from_millis(100);

/// Fully resolved parameters of one run. Immutable once handed to [`crate::LoadTest`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestConfig {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    /// Presence selects POST; absence selects GET.
    pub payload: Option<serde_json::Value>,
    pub qps: f64,
    pub concurrency: usize,
    pub duration_secs: f64,
    pub timeout_secs: f64,
    pub pattern: Pattern,
    #[serde(skip)]
    pub slice: Duration,
}

impl TestConfig {
    /// A constant-rate GET configuration with the CLI defaults for everything else.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
            payload: None,
            qps: 10.0,
            concurrency: 10,
            duration_secs: 60.0,
            timeout_secs: 30.0,
            pattern: Pattern::Constant,
            slice: DEFAULT_SLICE,
        }
    }

    /// Reject anything the engine cannot run. Called before any request is issued.
    pub fn validate(&self) -> Result<()> {
        parse_url(&self.url)?;
        require_positive("qps", self.qps)?;
        if self.concurrency == 0 {
            return Err(LoadTestError::invalid_parameter("concurrency", "must be at least 1"));
        }
        require_non_negative("duration", self.duration_secs)?;
        self.duration()?;
        require_positive("timeout", self.timeout_secs)?;
        if self.slice.is_zero() {
            return Err(LoadTestError::invalid_parameter("slice", "must be non-zero"));
        }
        self.pattern.validate()?;
        header_map(&self.headers)?;
        Ok(())
    }

    /// The dispatch window, bounded by what the clock can schedule from now.
    pub fn duration(&self) -> Result<Duration> {
        let duration = Duration::try_from_secs_f64(self.duration_secs)
            .map_err(|e| LoadTestError::invalid_parameter("duration", e.to_string()))?;
        if std::time::Instant::now().checked_add(duration).is_none() {
            return Err(LoadTestError::invalid_parameter(
                "duration",
                format!("{} s is beyond what the clock can represent", self.duration_secs),
            ));
        }
        Ok(duration)
    }

    pub fn timeout(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.timeout_secs)
            .map_err(|e| LoadTestError::invalid_parameter("timeout", e.to_string()))
    }

    /// Resolve the request sent on every dispatch.
    pub fn request_spec(&self) -> Result<RequestSpec> {
        let url = parse_url(&self.url)?;
        let headers = header_map(&self.headers)?;
        Ok(match &self.payload {
            Some(payload) => RequestSpec::Post { url, headers, payload: payload.clone() },
            None => RequestSpec::Get { url, headers },
        })
    }
}

/// The request issued by every dispatch, fixed before the run starts.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestSpec {
    Get { url: Url, headers: HeaderMap },
    Post { url: Url, headers: HeaderMap, payload: serde_json::Value },
}

impl RequestSpec {
    pub fn method(&self) -> Method {
        match self {
            RequestSpec::Get { .. } => Method::GET,
            RequestSpec::Post { .. } => Method::POST,
        }
    }

    pub fn url(&self) -> &Url {
        match self {
            RequestSpec::Get { url, .. } | RequestSpec::Post { url, .. } => url,
        }
    }

    pub fn headers(&self) -> &HeaderMap {
        match self {
            RequestSpec::Get { headers, .. } | RequestSpec::Post { headers, .. } => headers,
        }
    }

    pub fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            RequestSpec::Get { .. } => None,
            RequestSpec::Post { payload, .. } => Some(payload),
        }
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| LoadTestError::InvalidUrl(raw.to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(LoadTestError::InvalidUrl(
            raw.to_string(),
            format!("unsupported scheme {other:?}, expected http or https"),
        )),
    }
}

fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| LoadTestError::InvalidHeader(name.clone(), e.to_string()))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| LoadTestError::InvalidHeader(name.clone(), e.to_string()))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

pub(crate) fn require_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LoadTestError::invalid_parameter(name, format!("must be positive, got {value}")))
    }
}

pub(crate) fn require_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LoadTestError::invalid_parameter(name, format!("must be non-negative, got {value}")))
    }
}
