use std::collections::HashMap;
use std::time::Duration;

use qscale_worker::config::{
    CURRENT_VERSION, LogFormat, WorkerConfig, load_config, parse_config, save_config,
};

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn defaults() {
    let config = WorkerConfig::default();
    assert_eq!(config.topic, "answersheet.saved");
    assert_eq!(config.concurrency.answers, 50);
    assert_eq!(config.concurrency.factors, 10);

    let options = config.pipeline_options();
    assert_eq!(options.call_timeout, Duration::from_secs(30));
    assert_eq!(config.log_format, LogFormat::Text);
}

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(&dir.path().join("absent.json")).unwrap();
    assert_eq!(config, WorkerConfig::default());
}

#[test]
fn env_overrides_win_and_zero_means_default() {
    let env = vars(&[
        ("QSCALE_DATA_DIR", "/srv/qscale"),
        ("QSCALE_ANSWER_CONCURRENCY", "8"),
        ("QSCALE_FACTOR_CONCURRENCY", "0"),
        ("QSCALE_LOG_FORMAT", "JSON"),
        ("QSCALE_TOPIC", "assessment-events"),
    ]);
    let config = WorkerConfig::default()
        .with_overrides(|k| env.get(k).cloned())
        .unwrap();

    assert_eq!(config.data_dir.to_str(), Some("/srv/qscale"));
    assert_eq!(config.concurrency.answers, 8);
    assert_eq!(config.concurrency.factors, 10);
    assert_eq!(config.log_format, LogFormat::Json);
    assert_eq!(config.topic, "assessment-events");
}

#[test]
fn bad_override_is_an_error() {
    let env = vars(&[("QSCALE_CALL_TIMEOUT_SECS", "soon")]);
    assert!(
        WorkerConfig::default()
            .with_overrides(|k| env.get(k).cloned())
            .is_err()
    );
}

#[test]
fn unversioned_config_migrates_max_concurrency() {
    let config = parse_config(r#"{ "topic": "custom", "max_concurrency": 4 }"#).unwrap();
    assert_eq!(config.config_version, CURRENT_VERSION);
    assert_eq!(config.topic, "custom");
    assert_eq!(config.concurrency.factors, 4);
    assert_eq!(config.concurrency.answers, 50);
}

#[test]
fn newer_config_is_rejected() {
    let err = parse_config(r#"{ "config_version": 99 }"#).unwrap_err();
    assert!(err.to_string().contains("newer than this build"));
}

#[test]
fn save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("worker.json");
    let mut config = WorkerConfig::default();
    config.call_timeout_secs = 5;
    config.config_version = 0;

    save_config(&path, &config).unwrap();
    let loaded = load_config(&path).unwrap();

    assert_eq!(loaded.call_timeout_secs, 5);
    assert_eq!(loaded.config_version, CURRENT_VERSION);
    assert!(!path.with_extension("json.tmp").exists());
}
