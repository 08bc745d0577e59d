use httpload_common::{ErrorKind, Outcome, RatePoint, Sample, Summary};
use std::collections::BTreeMap;
use std::time::Duration;

#[test]
fn test_outcome_is_error() {
    assert!(Outcome::Error(ErrorKind::Timeout).is_error());
    assert!(Outcome::Error(ErrorKind::ConnectionError).is_error());
    assert!(Outcome::Error(ErrorKind::Other).is_error());

    // Every status class is a response, not an error.
    for code in [200, 301, 404, 503] {
        assert!(!Outcome::Status(code).is_error(), "status {code} counted as error");
    }
}

#[test]
fn test_error_kind_names() {
    assert_eq!(ErrorKind::Timeout.as_name(), "timeout");
    assert_eq!(ErrorKind::ConnectionError.as_name(), "connection-error");
    assert_eq!(ErrorKind::Other.as_name(), "other");
}

#[test]
fn test_error_kind_serializes_as_kebab_case() {
    let json = serde_json::to_string(&Outcome::Error(ErrorKind::ConnectionError)).unwrap();
    assert_eq!(json, r#"{"error":"connection-error"}"#);

    let json = serde_json::to_string(&Outcome::Status(204)).unwrap();
    assert_eq!(json, r#"{"status":204}"#);
}

#[test]
fn test_summary_maps_serialize_with_string_keys() {
    let summary = Summary {
        total_requests: 3,
        error_count: 1,
        error_rate: 1.0 / 3.0,
        achieved_qps: 1.5,
        elapsed_secs: 2.0,
        latency: Default::default(),
        status_codes: BTreeMap::from([(200, 1), (500, 1)]),
        error_breakdown: BTreeMap::from([(ErrorKind::Timeout, 1)]),
    };
    let value = serde_json::to_value(&summary).unwrap();
    assert_eq!(value["status_codes"]["200"], 1);
    assert_eq!(value["status_codes"]["500"], 1);
    assert_eq!(value["error_breakdown"]["timeout"], 1);
}

#[test]
fn test_sample_json_shape() {
    let sample = Sample {
        dispatched_at: Duration::from_millis(1500),
        latency: Duration::from_millis(20),
        outcome: Outcome::Status(200),
    };
    let value = serde_json::to_value(&sample).unwrap();
    assert_eq!(value["dispatched_at"]["secs"], 1);
    assert_eq!(value["dispatched_at"]["nanos"], 500_000_000);
    assert_eq!(value["outcome"]["status"], 200);

    let point = RatePoint { elapsed_secs: 0.05, target_rate: 10.0 };
    let value = serde_json::to_value(point).unwrap();
    assert_eq!(value["target_rate"], 10.0);
}
