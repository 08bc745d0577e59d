use std::time::Duration;
use tokio::time::{sleep_until, timeout_at, Instant};

use crate::executor::{Dispatch, WorkerPool};
use crate::pattern::Pattern;

/// One discretization step of the run: `count` dispatches spread evenly
/// over `[start, start + len)`, planned at the pattern's `rate` sampled at
/// the slice midpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slice {
    pub start: Duration,
    pub len: Duration,
    pub rate: f64,
    pub count: u64,
}

impl Slice {
    pub fn midpoint(&self) -> Duration {
        self.start + self.len / 2
    }

    /// Dispatch offsets from test start, first one at the start of the slice.
    pub fn offsets(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.count).map(move |i| self.start + self.len.mul_f64(i as f64 / self.count as f64))
    }
}

/// Turns a pattern into per-slice dispatch counts.
///
/// Each slice asks for `rate(midpoint) * len` requests; the fractional part
/// is carried into the next slice so rounding never drifts the total.
#[derive(Debug, Clone)]
pub struct SlicePlan {
    pattern: Pattern,
    qps: f64,
    duration: Duration,
    slice: Duration,
    next_start: Duration,
    carry: f64,
}

impl SlicePlan {
    pub fn new(pattern: Pattern, qps: f64, duration: Duration, slice: Duration) -> Self {
        Self { pattern, qps, duration, slice, next_start: Duration::ZERO, carry: 0.0 }
    }
}

impl Iterator for SlicePlan {
    type Item = Slice;

    fn next(&mut self) -> Option<Slice> {
        if self.slice.is_zero() || self.next_start >= self.duration {
            return None;
        }
        let start = self.next_start;
        let len = self.slice.min(self.duration - start);
        let midpoint = (start + len / 2).as_secs_f64();
        let rate = self.pattern.rate_at(self.qps, midpoint, self.duration.as_secs_f64());

        let wanted = rate * len.as_secs_f64() + self.carry;
        let count = wanted.floor().max(0.0) as u64;
        self.carry = wanted - count as f64;
        self.next_start = start + len;

        tracing::trace!(start = ?start, rate, count, carry = self.carry, "planned slice");
        Some(Slice { start, len, rate, count })
    }
}

/// Drives a [`WorkerPool`] along a [`SlicePlan`] for `duration`.
#[derive(Debug, Clone)]
pub struct RateScheduler {
    pattern: Pattern,
    qps: f64,
    duration: Duration,
    slice: Duration,
}

impl RateScheduler {
    pub fn new(pattern: Pattern, qps: f64, duration: Duration, slice: Duration) -> Self {
        Self { pattern, qps, duration, slice }
    }

    pub fn plan(&self) -> SlicePlan {
        SlicePlan::new(self.pattern, self.qps, self.duration, self.slice)
    }

    /// Dispatch until `duration` has elapsed, then drain every in-flight request.
    ///
    /// Returns the dispatch window: time from start until new dispatch stopped.
    /// A dispatch that could not get a slot before `duration` is dropped, never
    /// issued late.
    pub async fn run<D: Dispatch>(&self, pool: &mut WorkerPool<D>) -> Duration {
        let start = Instant::now();
        // A window too long for the clock never ends, so it has no deadline to reach.
        let deadline = start.checked_add(self.duration).unwrap_or_else(far_future);
        let mut dispatched: u64 = 0;

        'slices: for slice in self.plan() {
            for offset in slice.offsets() {
                sleep_until(start + offset).await;
                let slot = match timeout_at(deadline, pool.acquire()).await {
                    Ok(Some(slot)) => slot,
                    Ok(None) => {
                        tracing::warn!("worker pool closed; stopping dispatch");
                        break 'slices;
                    }
                    Err(_) => break 'slices,
                };
                if Instant::now() >= deadline {
                    break 'slices;
                }
                pool.spawn(slot, start.elapsed());
                dispatched += 1;
            }
        }

        sleep_until(deadline).await;
        let window = start.elapsed();
        tracing::debug!(dispatched, in_flight = pool.in_flight(), "dispatch window closed");

        pool.drain().await;
        window
    }
}

/// Roughly thirty years out, the same horizon tokio uses for an unset timer.
fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(86400 * 365 * 30)
}
