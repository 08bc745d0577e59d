use httpload_cli::report::render;
use httpload_common::{ErrorKind, LatencyStats, Summary};
use httpload_engine::{Pattern, TestConfig};
use std::collections::BTreeMap;

fn config() -> TestConfig {
    TestConfig {
        duration_secs: 30.0,
        concurrency: 5,
        pattern: Pattern::Ramp { start: 1.0 },
        ..TestConfig::new("http://localhost:8080/")
    }
}

fn summary() -> Summary {
    Summary {
        total_requests: 150,
        error_count: 3,
        error_rate: 0.02,
        achieved_qps: 5.0,
        elapsed_secs: 30.0,
        latency: LatencyStats {
            min: 0.001,
            max: 0.25,
            mean: 0.0123,
            median: 0.01,
            p90: 0.02,
            p95: 0.03,
            p99: 0.2,
            std_dev: 0.005,
        },
        status_codes: BTreeMap::from([(500, 7), (200, 140)]),
        error_breakdown: BTreeMap::from([(ErrorKind::Timeout, 2), (ErrorKind::ConnectionError, 1)]),
    }
}

#[test]
fn test_report_contains_headline_numbers() {
    let out = render(&config(), &summary());
    assert!(out.contains("Target:                http://localhost:8080/"));
    assert!(out.contains("Pattern:               ramp"));
    assert!(out.contains("Total Requests:        150"));
    assert!(out.contains("Errors:                3"));
    assert!(out.contains("Error Rate:            2.00%"));
    assert!(out.contains("Achieved QPS:          5.00"));
}

#[test]
fn test_report_latency_block() {
    let out = render(&config(), &summary());
    assert!(out.contains("Latency Statistics (seconds):"));
    assert!(out.contains("  Min:     0.0010"));
    assert!(out.contains("  Mean:    0.0123"));
    assert!(out.contains("  P99:     0.2000"));
    assert!(out.contains("  Std Dev: 0.0050"));
}

#[test]
fn test_report_status_codes_in_ascending_order() {
    let out = render(&config(), &summary());
    let ok = out.find("  200: 140").expect("200 line");
    let err = out.find("  500: 7").expect("500 line");
    assert!(ok < err);
    assert!(out.contains("  timeout: 2"));
    assert!(out.contains("  connection-error: 1"));
}

#[test]
fn test_report_when_every_request_failed() {
    let s = Summary {
        total_requests: 4,
        error_count: 4,
        error_rate: 1.0,
        achieved_qps: 0.4,
        elapsed_secs: 10.0,
        latency: LatencyStats::default(),
        status_codes: BTreeMap::new(),
        error_breakdown: BTreeMap::from([(ErrorKind::Timeout, 4)]),
    };
    let out = render(&config(), &s);
    assert!(out.contains("Error Rate:            100.00%"));
    assert!(!out.contains("Latency Statistics"));
    assert!(out.contains("(no responses)"));
}

#[test]
fn test_report_for_empty_run() {
    let s = Summary {
        total_requests: 0,
        error_count: 0,
        error_rate: 0.0,
        achieved_qps: 0.0,
        elapsed_secs: 0.0,
        latency: LatencyStats::default(),
        status_codes: BTreeMap::new(),
        error_breakdown: BTreeMap::new(),
    };
    let out = render(&config(), &s);
    assert!(out.contains("Total Requests:        0"));
    assert!(out.contains("Error Rate:            0.00%"));
    assert!(!out.contains("Errors by Kind"));
}
