use httpload_common::{RatePoint, Result};
use serde::Serialize;
use std::time::Duration;

use crate::config::{require_non_negative, require_positive};
use crate::scheduler::SlicePlan;

/// Shape of the target request rate over the run.
///
/// The shape is scaled by the run's `qps`: it is the flat rate, the end of a
/// ramp, and the base of a spike. Rates are in requests per second, times in
/// seconds since test start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pattern {
    /// Flat `qps` for the whole run.
    Constant,
    /// Linear climb from `start` to `qps` across the run.
    Ramp { start: f64 },
    /// `qps * multiplier` during the first `width` seconds of every
    /// `period`, `qps` otherwise.
    Spike { multiplier: f64, period: f64, width: f64 },
}

impl Pattern {
    pub fn as_name(&self) -> &'static str {
        match self {
            Pattern::Constant => "constant",
            Pattern::Ramp { .. } => "ramp",
            Pattern::Spike { .. } => "spike",
        }
    }

    /// Target rate at `elapsed` seconds into a run of `duration` seconds
    /// requested at `qps`. Never negative.
    pub fn rate_at(&self, qps: f64, elapsed: f64, duration: f64) -> f64 {
        let rate = match *self {
            Pattern::Constant => qps,
            Pattern::Ramp { start } => {
                if duration <= 0.0 {
                    qps
                } else {
                    let progress = (elapsed / duration).clamp(0.0, 1.0);
                    start + (qps - start) * progress
                }
            }
            Pattern::Spike { multiplier, period, width } => {
                // width >= period means the whole period bursts; the boundary itself does not.
                if width >= period || elapsed.rem_euclid(period) < width {
                    qps * multiplier
                } else {
                    qps
                }
            }
        };
        rate.max(0.0)
    }

    /// Target rate at the midpoint of every slice the scheduler walks.
    pub fn curve(&self, qps: f64, duration: Duration, slice: Duration) -> Vec<RatePoint> {
        SlicePlan::new(*self, qps, duration, slice)
            .map(|s| RatePoint { elapsed_secs: s.midpoint().as_secs_f64(), target_rate: s.rate })
            .collect()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match *self {
            Pattern::Constant => Ok(()),
            Pattern::Ramp { start } => require_non_negative("ramp start", start),
            Pattern::Spike { multiplier, period, width } => {
                require_non_negative("spike multiplier", multiplier)?;
                require_positive("spike period", period)?;
                require_non_negative("spike width", width)
            }
        }
    }
}
