//! Tests for call and batch configuration loading.

use spark_error::ConfigErrorKind;
use spark_resilience::{BatchConfig, CallConfig, ConfigSources};
use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;
use tempfile::Builder;

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_bundled_defaults_match_default_impl() {
    let config = CallConfig::load_from(&ConfigSources::bundled()).unwrap();
    assert_eq!(config, CallConfig::default());

    assert_eq!(*config.max_retries(), 3);
    assert_eq!(*config.base_delay_seconds(), 30.0);
    assert_eq!(*config.max_delay_seconds(), 300.0);
    assert_eq!(*config.quota_wait_seconds(), 300.0);
    assert_eq!(*config.quota_wait_cap_seconds(), 1800.0);
    assert_eq!(*config.consecutive_failure_threshold(), 3);
    assert!(!config.mock_mode());
}

#[test]
fn test_bundled_batch_defaults() {
    let batch = BatchConfig::load_from(&ConfigSources::bundled()).unwrap();
    assert_eq!(batch, BatchConfig::default());
    assert_eq!(batch.success_wait(), Duration::from_secs(5));
    assert_eq!(batch.quota_reset_interval(), Duration::from_secs(3600));
}

#[test]
fn test_config_from_file_overrides_bundled() {
    let mut temp_file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        temp_file,
        r#"
max_retries = 6
base_delay_seconds = 2.0
mock_mode = true
success_wait_seconds = 0.5
"#
    )
    .unwrap();
    temp_file.flush().unwrap();

    let config = CallConfig::from_file(temp_file.path()).unwrap();
    assert_eq!(*config.max_retries(), 6);
    assert_eq!(*config.base_delay_seconds(), 2.0);
    assert!(*config.mock_mode());
    // Untouched fields keep their bundled values
    assert_eq!(*config.max_delay_seconds(), 300.0);
    assert_eq!(*config.consecutive_failure_threshold(), 3);

    let batch =
        BatchConfig::load_from(&ConfigSources::bundled().with_file(temp_file.path())).unwrap();
    assert_eq!(*batch.success_wait_seconds(), 0.5);
    assert_eq!(*batch.quota_reset_interval_seconds(), 3600.0);
}

#[test]
fn test_env_overrides_file() {
    let mut temp_file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(temp_file, "max_retries = 6\nquota_wait_seconds = 60.0").unwrap();
    temp_file.flush().unwrap();

    let sources = ConfigSources::bundled()
        .with_file(temp_file.path())
        .with_env(env(&[
            ("SPARK_MAX_RETRIES", "1"),
            ("SPARK_MOCK_MODE", "true"),
        ]));
    let config = CallConfig::load_from(&sources).unwrap();

    assert_eq!(*config.max_retries(), 1);
    assert!(*config.mock_mode());
    assert_eq!(*config.quota_wait_seconds(), 60.0);
}

#[test]
fn test_missing_explicit_file_is_load_error() {
    let err = CallConfig::from_file("/definitely/not/here/spark.toml").unwrap_err();
    assert!(matches!(err.kind(), ConfigErrorKind::Load(_)));
}

#[test]
fn test_zero_base_delay_rejected() {
    let sources = ConfigSources::bundled().with_env(env(&[("SPARK_BASE_DELAY_SECONDS", "0")]));
    let err = CallConfig::load_from(&sources).unwrap_err();
    match err.kind() {
        ConfigErrorKind::InvalidField { field, .. } => assert_eq!(field, "base_delay_seconds"),
        other => panic!("unexpected error kind: {:?}", other),
    }
}

#[test]
fn test_max_delay_below_base_rejected() {
    let mut temp_file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        temp_file,
        "base_delay_seconds = 10.0\nmax_delay_seconds = 5.0"
    )
    .unwrap();
    temp_file.flush().unwrap();

    let err = CallConfig::from_file(temp_file.path()).unwrap_err();
    match err.kind() {
        ConfigErrorKind::InvalidField { field, .. } => assert_eq!(field, "max_delay_seconds"),
        other => panic!("unexpected error kind: {:?}", other),
    }
}

#[test]
fn test_zero_threshold_rejected() {
    let sources = ConfigSources::bundled()
        .with_env(env(&[("SPARK_CONSECUTIVE_FAILURE_THRESHOLD", "0")]));
    assert!(CallConfig::load_from(&sources).is_err());
}

#[test]
fn test_negative_batch_wait_rejected() {
    let err = BatchConfig::new(-1.0, 3600.0).validate().unwrap_err();
    match err.kind() {
        ConfigErrorKind::InvalidField { field, .. } => assert_eq!(field, "success_wait_seconds"),
        other => panic!("unexpected error kind: {:?}", other),
    }
}

#[test]
fn test_wrong_type_is_parse_error() {
    let mut temp_file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(temp_file, "max_retries = \"lots\"").unwrap();
    temp_file.flush().unwrap();

    let err = CallConfig::from_file(temp_file.path()).unwrap_err();
    assert!(matches!(err.kind(), ConfigErrorKind::Parse(_)));
}

#[test]
fn test_builder_defaults_and_validation() {
    let config = CallConfig::builder().max_retries(0).build().unwrap();
    assert_eq!(*config.max_retries(), 0);
    assert_eq!(config.max_attempts(), 1);
    assert_eq!(*config.base_delay_seconds(), 30.0);

    assert!(CallConfig::builder().base_delay_seconds(-1.0).build().is_err());
    assert!(
        CallConfig::builder()
            .base_delay_seconds(10.0)
            .max_delay_seconds(1.0)
            .build()
            .is_err()
    );
    assert!(
        CallConfig::builder()
            .consecutive_failure_threshold(0)
            .build()
            .is_err()
    );
}

#[test]
fn test_max_attempts_saturates() {
    let config = CallConfig::builder().max_retries(u32::MAX).build().unwrap();
    assert_eq!(config.max_attempts(), u32::MAX);
}

#[test]
fn test_attempt_timeout_zero_disables() {
    let config = CallConfig::builder()
        .attempt_timeout_seconds(0.0)
        .build()
        .unwrap();
    assert_eq!(config.attempt_timeout(), None);
    assert_eq!(
        CallConfig::default().attempt_timeout(),
        Some(Duration::from_secs(300))
    );
}

#[test]
fn test_to_builder_round_trips_and_overrides() {
    let original = CallConfig::builder()
        .max_retries(9)
        .jitter(true)
        .build()
        .unwrap();
    assert_eq!(original.to_builder().build().unwrap(), original);

    let faster = original
        .to_builder()
        .base_delay_seconds(0.5)
        .max_delay_seconds(2.0)
        .build()
        .unwrap();
    assert_eq!(*faster.max_retries(), 9);
    assert!(*faster.jitter());
    assert_eq!(faster.backoff_delay(1), Duration::from_millis(500));
}
