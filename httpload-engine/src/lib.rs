use httpload_common::{RatePoint, Result, Sample, Summary};
use std::sync::Arc;
use std::time::Duration;

pub mod aggregator;
pub mod config;
pub mod executor;
pub mod pattern;
pub mod scheduler;

pub use aggregator::{summarize, ResultAggregator};
pub use config::{RequestSpec, TestConfig};
pub use executor::{Dispatch, HttpDispatcher, WorkerPool};
pub use pattern::Pattern;
pub use scheduler::{RateScheduler, Slice, SlicePlan};

/// Everything a finished run hands to the reporter.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: Summary,
    /// Ordered by dispatch time.
    pub samples: Vec<Sample>,
    pub rate_curve: Vec<RatePoint>,
}

/// A validated, ready-to-run load test.
pub struct LoadTest {
    config: TestConfig,
    duration: Duration,
}

impl LoadTest {
    /// Validate `config`. No request is issued if this fails.
    pub fn new(config: TestConfig) -> Result<Self> {
        config.validate()?;
        let duration = config.duration()?;
        Ok(Self { config, duration })
    }

    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    /// Run against the configured target over HTTP.
    pub async fn run(&self) -> Result<RunReport> {
        let spec = self.config.request_spec()?;
        let dispatcher = HttpDispatcher::new(spec, self.config.timeout()?)?;
        Ok(self.run_with(dispatcher).await)
    }

    /// Run with a caller-supplied dispatcher in place of HTTP.
    pub async fn run_with<D: Dispatch>(&self, dispatcher: D) -> RunReport {
        tracing::info!(
            url = %self.config.url,
            pattern = self.config.pattern.as_name(),
            qps = self.config.qps,
            concurrency = self.config.concurrency,
            duration_secs = self.config.duration_secs,
            "starting load test"
        );

        let aggregator = Arc::new(ResultAggregator::new());
        let mut pool = WorkerPool::new(dispatcher, self.config.concurrency, Arc::clone(&aggregator));
        let scheduler = RateScheduler::new(self.config.pattern, self.config.qps, self.duration, self.config.slice);
        let window = scheduler.run(&mut pool).await;

        let summary = aggregator.summarize(window);
        tracing::info!(
            total_requests = summary.total_requests,
            errors = summary.error_count,
            achieved_qps = summary.achieved_qps,
            "load test finished"
        );

        RunReport {
            summary,
            samples: aggregator.samples(),
            rate_curve: self.config.pattern.curve(self.config.qps, self.duration, self.config.slice),
        }
    }
}
