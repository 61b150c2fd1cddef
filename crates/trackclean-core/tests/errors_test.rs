//! Tests for the trackclean error handling system.

use trackclean_core::errors::*;

#[test]
fn test_all_errors_have_error_code() {
    let config = ConfigError::MissingParameter {
        field: "outliers.threshold".into(),
    };
    assert_eq!(config.error_code(), "CONFIG_ERROR");

    let conflict = ConfigError::ConflictingOptions {
        first: "a".into(),
        second: "b".into(),
        message: "m".into(),
    };
    assert_eq!(conflict.error_code(), "CONFLICTING_OPTIONS");

    let table = TableError::DuplicateColumn { name: "nose_x".into() };
    assert_eq!(table.error_code(), "TABLE_ERROR");

    let unreadable = TableError::Unreadable {
        message: "truncated header".into(),
    };
    assert_eq!(unreadable.error_code(), "UNREADABLE_INPUT");
}

#[test]
fn test_from_conversions() {
    let pipeline: PipelineError = ConfigError::invalid("interpolation.degree", "too high").into();
    assert!(matches!(pipeline, PipelineError::Config(_)));

    let pipeline: PipelineError = TableError::UnknownColumn { name: "tail_x".into() }.into();
    assert!(matches!(pipeline, PipelineError::Table(_)));
}

#[test]
fn test_file_error_keeps_inner_code() {
    let inner: PipelineError = TableError::Unreadable {
        message: "bad utf-8".into(),
    }
    .into();
    let wrapped = PipelineError::for_file("session_03.csv", inner);
    assert_eq!(wrapped.error_code(), "UNREADABLE_INPUT");
    assert!(wrapped.to_string().contains("session_03.csv"));
}

#[test]
fn test_coded_string_format() {
    let err = TableError::FrameNumbersNotIncreasing { row: 7 };
    assert_eq!(
        err.coded_string(),
        "[TABLE_ERROR] Frame numbers must be strictly increasing (row 7)"
    );
}

#[test]
fn test_pipeline_result_collects_errors() {
    let mut result: PipelineResult<Vec<u32>> = PipelineResult::new(vec![1, 2]);
    assert!(result.is_clean());
    result.add_error(ConfigError::MissingParameter { field: "x".into() }.into());
    assert_eq!(result.error_count(), 1);
    assert_eq!(result.data, vec![1, 2]);
}
