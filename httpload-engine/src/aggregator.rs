use httpload_common::{LatencyStats, Outcome, Sample, Summary};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Shared sink for samples produced by concurrent workers.
///
/// Every worker holds the same `Arc<ResultAggregator>`; appends are serialized
/// by an internal lock so no sample is lost or recorded twice.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    samples: Mutex<Vec<Sample>>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, sample: Sample) {
        self.lock().push(sample);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of every recorded sample, ordered by dispatch time.
    pub fn samples(&self) -> Vec<Sample> {
        let mut samples = self.lock().clone();
        samples.sort_by_key(|s| s.dispatched_at);
        samples
    }

    /// Summarize everything recorded so far over a run window of `elapsed`.
    pub fn summarize(&self, elapsed: Duration) -> Summary {
        summarize(&self.lock(), elapsed)
    }

    // A panicking worker cannot leave a half-pushed Vec, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Vec<Sample>> {
        self.samples.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Compute the run summary from `samples`. Pure: same input, same output.
///
/// Latency statistics cover samples that received a response; timeouts and
/// transport failures only show up in the error counts.
pub fn summarize(samples: &[Sample], elapsed: Duration) -> Summary {
    let total_requests = samples.len() as u64;
    let mut status_codes: BTreeMap<u16, u64> = BTreeMap::new();
    let mut error_breakdown = BTreeMap::new();
    let mut latencies = Vec::with_capacity(samples.len());

    for sample in samples {
        match sample.outcome {
            Outcome::Status(code) => {
                *status_codes.entry(code).or_insert(0) += 1;
                latencies.push(sample.latency.as_secs_f64());
            }
            Outcome::Error(kind) => *error_breakdown.entry(kind).or_insert(0) += 1,
        }
    }

    let error_count: u64 = error_breakdown.values().sum();
    let error_rate = if total_requests == 0 { 0.0 } else { error_count as f64 / total_requests as f64 };
    let elapsed_secs = elapsed.as_secs_f64();
    let achieved_qps = if elapsed_secs > 0.0 { total_requests as f64 / elapsed_secs } else { 0.0 };

    Summary {
        total_requests,
        error_count,
        error_rate,
        achieved_qps,
        elapsed_secs,
        latency: latency_stats(latencies),
        status_codes,
        error_breakdown,
    }
}

/// Latency statistics over `values` (seconds). All zero for an empty input.
pub fn latency_stats(mut values: Vec<f64>) -> LatencyStats {
    if values.is_empty() {
        return LatencyStats::default();
    }
    values.sort_by(f64::total_cmp);

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std_dev = if values.len() < 2 {
        0.0
    } else {
        let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (squares / (n - 1.0)).sqrt()
    };

    LatencyStats {
        min: values[0],
        max: values[values.len() - 1],
        mean,
        median: percentile(&values, 0.50),
        p90: percentile(&values, 0.90),
        p95: percentile(&values, 0.95),
        p99: percentile(&values, 0.99),
        std_dev,
    }
}

/// Percentile `p` (0..=1) of an ascending slice, interpolating linearly
/// between the two nearest ranks at position `p * (n - 1)`.
/// Returns 0 for an empty slice.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let weight = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}
