//! Integration tests for CLI config loading and util helpers.

use std::path::PathBuf;

use churn_classifiers::config::{ChurnConfig, ExtraColumnPolicy, ModelType};
use churn_cli::input::load_config_file;
use churn_cli::util::validate_tsv_or_csv_file;

// ---------------------------------------------------------------------------
// validate_tsv_or_csv_file
// ---------------------------------------------------------------------------

#[test]
fn validate_tsv_file_exists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("customers.tsv");
    std::fs::File::create(&path).unwrap();
    assert!(validate_tsv_or_csv_file(&path).is_ok());
}

#[test]
fn validate_uppercase_csv_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("customers.CSV");
    std::fs::File::create(&path).unwrap();
    assert!(validate_tsv_or_csv_file(&path).is_ok());
}

#[test]
fn validate_wrong_extension_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("customers.txt");
    std::fs::File::create(&path).unwrap();
    assert!(validate_tsv_or_csv_file(&path).is_err());
}

#[test]
fn validate_nonexistent_file_errors() {
    assert!(validate_tsv_or_csv_file("/nonexistent/path/customers.tsv").is_err());
}

// ---------------------------------------------------------------------------
// ChurnConfig files
// ---------------------------------------------------------------------------

#[test]
fn default_config_round_trips_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("churn.json");
    let json = serde_json::to_string_pretty(&ChurnConfig::default()).unwrap();
    std::fs::write(&path, json).unwrap();

    assert_eq!(load_config_file(&path).unwrap(), ChurnConfig::default());
}

#[test]
fn partial_config_keeps_remaining_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("churn.json");
    std::fs::write(
        &path,
        r#"{
            "model": { "model_type": "gbdt", "model_path": "gbdt.model",
                       "feature_names": ["CreditScore", "Age"] },
            "extra_columns": "drop"
        }"#,
    )
    .unwrap();

    let config = load_config_file(&path).unwrap();
    assert_eq!(config.model.model_type, ModelType::GBDT);
    assert_eq!(config.model.model_path, PathBuf::from("gbdt.model"));
    assert_eq!(config.model.feature_names.as_ref().map(Vec::len), Some(2));
    assert_eq!(config.extra_columns, ExtraColumnPolicy::Drop);
    assert_eq!(config.scaler_path, ChurnConfig::default().scaler_path);
    assert_eq!(config.bounds, ChurnConfig::default().bounds);
}

#[test]
fn malformed_config_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("churn.json");
    std::fs::write(&path, "{ model: ").unwrap();
    assert!(load_config_file(&path).is_err());
}
