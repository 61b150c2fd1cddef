//! Tests for the trackclean configuration system.

use std::sync::Mutex;

use trackclean_core::config::{CleaningConfig, ConfigOverrides};
use trackclean_core::errors::ConfigError;

/// Global mutex to serialize tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn tempdir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

/// Clear all TRACKCLEAN_ env vars to prevent cross-test contamination.
fn clear_env_vars() {
    for key in [
        "TRACKCLEAN_CONFIDENCE_THRESHOLD",
        "TRACKCLEAN_CONFIDENCE_PERCENTILE",
        "TRACKCLEAN_OUTLIER_POLICY",
        "TRACKCLEAN_OUTLIER_METRIC",
        "TRACKCLEAN_INTERPOLATION_METHOD",
        "TRACKCLEAN_INTERPOLATION_MAX_GAP",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn test_layered_resolution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env_vars();

    let dir = tempdir();
    std::fs::write(
        dir.path().join("trackclean.toml"),
        r#"
[confidence]
threshold = 0.6

[outliers]
policy = "mad"

[interpolation]
method = "cubic"
max_gap = 4
"#,
    )
    .unwrap();

    // Env overrides the project file.
    std::env::set_var("TRACKCLEAN_INTERPOLATION_MAX_GAP", "8");

    let overrides = ConfigOverrides {
        outlier_policy: Some("iqr".to_string()),
        ..Default::default()
    };
    let config = CleaningConfig::load(dir.path(), Some(&overrides)).unwrap();

    assert_eq!(config.confidence.threshold, Some(0.6));
    assert_eq!(config.outliers.policy.as_deref(), Some("iqr"));
    assert_eq!(config.interpolation.method.as_deref(), Some("cubic"));
    assert_eq!(config.interpolation.max_gap, Some(8));

    clear_env_vars();
}

#[test]
fn test_load_without_project_file_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env_vars();

    let dir = tempdir();
    let config = CleaningConfig::load(dir.path(), None).unwrap();

    assert!(!config.confidence.is_configured());
    assert!(!config.outliers.is_configured());
    assert!(!config.interpolation.is_configured());
    assert_eq!(config.interpolation.effective_max_gap(), 5);
    assert_eq!(config.interpolation.effective_method(), "linear");
}

#[test]
fn test_env_percentile_replaces_file_threshold() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env_vars();

    let dir = tempdir();
    std::fs::write(dir.path().join("trackclean.toml"), "[confidence]\nthreshold = 0.9\n").unwrap();
    std::env::set_var("TRACKCLEAN_CONFIDENCE_PERCENTILE", "10");

    let config = CleaningConfig::load(dir.path(), None).unwrap();
    assert_eq!(config.confidence.percentile, Some(10.0));
    assert_eq!(config.confidence.threshold, None);

    clear_env_vars();
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env_vars();

    let dir = tempdir();
    std::fs::write(dir.path().join("trackclean.toml"), "[confidence\nthreshold = ").unwrap();

    let err = CleaningConfig::load(dir.path(), None).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn test_threshold_out_of_range_rejected() {
    let err = CleaningConfig::from_toml("[confidence]\nthreshold = 1.5\n").unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "confidence.threshold"));

    let err = CleaningConfig::from_toml("[confidence]\npercentile = 101.0\n").unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { .. }));
}

#[test]
fn test_threshold_and_percentile_conflict() {
    let err = CleaningConfig::from_toml("[confidence]\nthreshold = 0.5\npercentile = 5.0\n").unwrap_err();
    assert!(matches!(err, ConfigError::ConflictingOptions { .. }));
}

#[test]
fn test_log_transform_with_fixed_policy_conflicts() {
    let err = CleaningConfig::from_toml(
        "[outliers]\npolicy = \"fixed\"\nthreshold = 30.0\nlog_transform = true\n",
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::ConflictingOptions { .. }));
}

#[test]
fn test_fixed_policy_requires_threshold() {
    let err = CleaningConfig::from_toml("[outliers]\npolicy = \"fixed\"\n").unwrap_err();
    assert_eq!(
        err,
        ConfigError::MissingParameter {
            field: "outliers.threshold".to_string()
        }
    );
}

#[test]
fn test_zero_max_gap_rejected() {
    let err = CleaningConfig::from_toml("[interpolation]\nmax_gap = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { .. }));

    let err = CleaningConfig::from_toml("[interpolation.bodyparts.nose]\nmax_gap = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { .. }));
}

#[test]
fn test_per_bodypart_sections_parse() {
    let config = CleaningConfig::from_toml(
        r#"
[confidence]
percentile = 5.0
scope = "pooled"

[confidence.bodyparts.tail_base]
threshold = 0.3

[interpolation]
method = "linear"

[interpolation.bodyparts.left_ear]
method = "polynomial"
degree = 3
"#,
    )
    .unwrap();

    assert_eq!(config.confidence.bodyparts["tail_base"].threshold, Some(0.3));
    assert_eq!(config.interpolation.bodyparts["left_ear"].degree, Some(3));
    assert_eq!(config.confidence.scope.as_deref(), Some("pooled"));
}

#[test]
fn test_toml_round_trip() {
    let config = CleaningConfig::from_toml(
        "[outliers]\npolicy = \"adj_iqr\"\nmultiplier = 2.0\n\n[interpolation]\nmax_gap = 3\n",
    )
    .unwrap();
    let serialized = config.to_toml().unwrap();
    let reparsed = CleaningConfig::from_toml(&serialized).unwrap();
    assert_eq!(config, reparsed);
}

#[test]
fn test_unknown_keys_ignored() {
    let config = CleaningConfig::from_toml("[outliers]\npolicy = \"std\"\nfuture_option = 1\n").unwrap();
    assert_eq!(config.outliers.effective_cutoff("std"), 3.0);
}

#[test]
fn test_ceiling_alone_configures_interpolation() {
    let config = CleaningConfig::from_toml("[interpolation]\ndisplacement_ceiling = 25.0\n").unwrap();
    assert!(config.interpolation.is_configured());
    assert_eq!(config.interpolation.effective_method(), "linear");
    assert_eq!(config.interpolation.effective_max_gap(), 5);
}
