use httpload_engine::{Pattern, SlicePlan};
use std::time::Duration;

#[test]
fn test_constant_is_flat() {
    let p = Pattern::Constant;
    for t in [0.0, 1.0, 29.99, 30.0] {
        assert_eq!(p.rate_at(12.5, t, 30.0), 12.5);
    }
}

#[test]
fn test_ramp_interpolates_linearly() {
    let p = Pattern::Ramp { start: 10.0 };
    assert_eq!(p.rate_at(30.0, 0.0, 10.0), 10.0);
    assert_eq!(p.rate_at(30.0, 5.0, 10.0), 20.0);
    assert_eq!(p.rate_at(30.0, 10.0, 10.0), 30.0);

    // Ramping down works the same way.
    let down = Pattern::Ramp { start: 30.0 };
    assert_eq!(down.rate_at(10.0, 2.5, 10.0), 25.0);
}

#[test]
fn test_ramp_zero_duration_returns_qps() {
    let p = Pattern::Ramp { start: 1.0 };
    assert_eq!(p.rate_at(50.0, 0.0, 0.0), 50.0);
}

#[test]
fn test_ramp_ends_at_qps() {
    let p = Pattern::Ramp { start: 0.0 };
    assert_eq!(p.rate_at(8.0, 20.0, 20.0), 8.0);
    assert_eq!(p.rate_at(16.0, 20.0, 20.0), 16.0);
}

#[test]
fn test_spike_bursts_at_start_of_each_period() {
    let p = Pattern::Spike { multiplier: 3.0, period: 20.0, width: 5.0 };
    assert_eq!(p.rate_at(10.0, 0.0, 60.0), 30.0);
    assert_eq!(p.rate_at(10.0, 4.99, 60.0), 30.0);
    assert_eq!(p.rate_at(10.0, 7.0, 60.0), 10.0);
    assert_eq!(p.rate_at(10.0, 19.99, 60.0), 10.0);
    assert_eq!(p.rate_at(10.0, 21.0, 60.0), 30.0);
    assert_eq!(p.rate_at(10.0, 45.0, 60.0), 10.0);
}

#[test]
fn test_spike_boundary_is_not_bursting() {
    let p = Pattern::Spike { multiplier: 3.0, period: 20.0, width: 5.0 };
    assert_eq!(p.rate_at(10.0, 5.0, 60.0), 10.0);
    assert_eq!(p.rate_at(10.0, 25.0, 60.0), 10.0);
}

#[test]
fn test_spike_width_covering_period_always_bursts() {
    for width in [20.0, 35.0] {
        let p = Pattern::Spike { multiplier: 2.5, period: 20.0, width };
        for t in [0.0, 5.0, 19.99, 20.0, 39.0] {
            assert_eq!(p.rate_at(4.0, t, 60.0), 10.0, "width {width} t {t}");
        }
    }
}

#[test]
fn test_rate_is_never_negative() {
    let p = Pattern::Spike { multiplier: 0.0, period: 2.0, width: 1.0 };
    assert_eq!(p.rate_at(10.0, 0.5, 10.0), 0.0);
    assert_eq!(p.rate_at(10.0, 1.5, 10.0), 10.0);
}

#[test]
fn test_pattern_names() {
    assert_eq!(Pattern::Constant.as_name(), "constant");
    assert_eq!(Pattern::Ramp { start: 1.0 }.as_name(), "ramp");
    assert_eq!(Pattern::Spike { multiplier: 2.0, period: 3.0, width: 1.0 }.as_name(), "spike");
}

#[test]
fn test_curve_samples_slice_midpoints() {
    let p = Pattern::Ramp { start: 0.0 };
    let curve = p.curve(10.0, Duration::from_secs(1), Duration::from_millis(250));
    let times: Vec<f64> = curve.iter().map(|pt| pt.elapsed_secs).collect();
    let rates: Vec<f64> = curve.iter().map(|pt| pt.target_rate).collect();
    assert_eq!(times, vec![0.125, 0.375, 0.625, 0.875]);
    assert_eq!(rates, vec![1.25, 3.75, 6.25, 8.75]);
}

#[test]
fn test_curve_follows_the_scheduled_slices() {
    // 250ms leaves a short last slice; its midpoint sits inside it, not a full slice later.
    let p = Pattern::Spike { multiplier: 4.0, period: 1.0, width: 0.5 };
    let duration = Duration::from_millis(2250);
    let slice = Duration::from_millis(400);

    let curve = p.curve(5.0, duration, slice);
    let plan: Vec<_> = SlicePlan::new(p, 5.0, duration, slice).collect();

    assert_eq!(curve.len(), plan.len());
    for (point, s) in curve.iter().zip(&plan) {
        assert_eq!(point.elapsed_secs, s.midpoint().as_secs_f64());
        assert_eq!(point.target_rate, s.rate);
    }
    let last = curve.last().unwrap();
    assert_eq!(last.elapsed_secs, 2.125);
}

#[test]
fn test_curve_degenerate_inputs() {
    let p = Pattern::Constant;
    assert!(p.curve(5.0, Duration::ZERO, Duration::from_millis(100)).is_empty());
    assert!(p.curve(5.0, Duration::from_secs(5), Duration::ZERO).is_empty());
}
