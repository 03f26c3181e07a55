// Host-side tests for the snapshot upload policy.

use particle_core::*;
use std::time::{Duration, Instant};

#[test]
fn trusted_network_disables_capture() {
    assert!(!capture_allowed(Some("203.0.113.7"), Some("203.0.113.7")));
    assert!(!capture_allowed(Some(" 203.0.113.7 "), Some("203.0.113.7\n")));
    assert!(capture_allowed(Some("203.0.113.7"), Some("198.51.100.1")));
}

#[test]
fn unknown_address_or_no_trusted_address_allows_capture() {
    assert!(capture_allowed(Some("203.0.113.7"), None));
    assert!(capture_allowed(None, Some("203.0.113.7")));
    assert!(capture_allowed(None, None));
}

#[test]
fn public_ip_body_is_parsed() {
    assert_eq!(
        parse_public_ip(r#"{"ip":"198.51.100.1"}"#).as_deref(),
        Some("198.51.100.1")
    );
    assert_eq!(parse_public_ip(r#"{"ip":""}"#), None);
    assert_eq!(parse_public_ip("<html>rate limited</html>"), None);
}

#[test]
fn timer_fires_once_per_interval() {
    let mut timer = SnapshotTimer::new(Duration::from_secs(60));
    assert!(!timer.due(Duration::from_secs(0)));
    assert!(!timer.due(Duration::from_secs(59)));
    assert!(timer.due(Duration::from_secs(60)));
    assert!(!timer.due(Duration::from_secs(61)));
    assert!(timer.due(Duration::from_secs(125)));
}

#[test]
fn stalled_timer_catches_up_without_bursting() {
    let mut timer = SnapshotTimer::new(Duration::from_secs(10));
    assert!(timer.due(Duration::from_secs(1000)));
    assert!(!timer.due(Duration::from_secs(1001)));
    assert!(timer.due(Duration::from_secs(1010)));
}

#[test]
fn tiny_interval_after_a_long_stall_schedules_in_constant_time() {
    let mut timer = SnapshotTimer::new(Duration::from_nanos(1));
    let started = Instant::now();
    assert!(timer.due(Duration::from_secs(3600)));
    assert!(started.elapsed() < Duration::from_millis(100));
    assert!(!timer.due(Duration::from_secs(3600)));
    assert!(timer.due(Duration::from_secs(3600) + Duration::from_nanos(1)));
}

#[test]
fn interval_below_one_second_is_rejected() {
    let cfg = |interval_secs| SnapshotConfig {
        url: "https://example.com/upload".to_string(),
        interval_secs,
        trusted_ip: None,
    };
    assert!(cfg(1.0).validate().is_ok());
    assert!(matches!(
        cfg(1e-9).validate(),
        Err(ConfigError::InvalidValue {
            field: "snapshot.interval_secs",
            ..
        })
    ));
}

#[test]
fn zero_interval_never_fires() {
    let mut timer = SnapshotTimer::new(Duration::ZERO);
    assert!(!timer.due(Duration::from_secs(5)));
}

#[test]
fn payload_serializes_image_and_timestamp() {
    let payload = SnapshotPayload {
        image: "data:image/png;base64,AAAA".to_string(),
        timestamp: "2024-01-01T00:00:00Z".to_string(),
    };
    let json: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
    assert_eq!(json["image"], "data:image/png;base64,AAAA");
    assert_eq!(json["timestamp"], "2024-01-01T00:00:00Z");
}
