//! End-to-end tests of encode → scale → align → predict against the
//! fixture artifacts in `tests/data`.

use std::path::{Path, PathBuf};

use churn_classifiers::alignment::align;
use churn_classifiers::config::{ChurnConfig, ExtraColumnPolicy, ModelConfig, ModelType, PipelineSettings};
use churn_classifiers::context::ChurnContext;
use churn_classifiers::features::{encode, Gender, Geography, RawInput, YesNo};
use churn_classifiers::io::read_customers;
use churn_classifiers::models::xgboost::XGBoostClassifier;
use churn_classifiers::models::ClassifierModel;
use churn_classifiers::prediction::ChurnLabel;
use churn_classifiers::preprocessing::{scale, MinMaxScaler};
use churn_classifiers::ChurnError;

fn data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

fn fixture_config() -> ChurnConfig {
    ChurnConfig {
        model: ModelConfig::new(ModelType::XGBoost, data("model.json")),
        scaler_path: data("scaler.json"),
        ..ChurnConfig::default()
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Fixture model without the `Gender_Male` column; no tree splits on it.
fn model_without_gender_male() -> XGBoostClassifier {
    let text = std::fs::read_to_string(data("model.json")).unwrap();
    let mut json: serde_json::Value = serde_json::from_str(&text).unwrap();
    let learner = &mut json["learner"];

    let names = learner["feature_names"].as_array_mut().unwrap();
    names.retain(|n| n.as_str() != Some("Gender_Male"));
    learner["feature_types"].as_array_mut().unwrap().pop();
    learner["learner_model_param"]["num_feature"] = "14".into();
    // IsActiveMember_1 moves from column 14 to 13.
    learner["gradient_booster"]["model"]["trees"][0]["split_indices"][1] = 13.into();

    XGBoostClassifier::from_json_str(&json.to_string(), None).unwrap()
}

// ---------------------------------------------------------------------------
// Context / artifacts
// ---------------------------------------------------------------------------

#[test]
fn context_loads_fixture_artifacts() {
    let ctx = ChurnContext::load(&fixture_config()).unwrap();
    assert_eq!(ctx.model().name(), "xgboost");
    assert_eq!(ctx.expected_order().len(), 15);
    assert_eq!(ctx.expected_order()[1], "Age");
    assert_eq!(ctx.scaler().feature_names().len(), 6);
}

#[test]
fn missing_model_file_is_fatal() {
    let mut config = fixture_config();
    config.model.model_path = data("no_such_model.json");
    match ChurnContext::load(&config) {
        Err(ChurnError::Io { path, .. }) => assert!(path.ends_with("no_such_model.json")),
        Err(other) => panic!("expected Io error, got {other:?}"),
        Ok(_) => panic!("expected Io error, got a context"),
    }
}

#[test]
fn unparseable_scaler_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scaler.json");
    std::fs::write(&path, "{ not json").unwrap();

    let mut config = fixture_config();
    config.scaler_path = path;
    assert!(matches!(ChurnContext::load(&config), Err(ChurnError::Json { .. })));
}

// ---------------------------------------------------------------------------
// Pipeline properties
// ---------------------------------------------------------------------------

#[test]
fn aligned_order_equals_model_order() {
    let ctx = ChurnContext::load(&fixture_config()).unwrap();
    let input = ctx.prepare(&RawInput::default()).unwrap();
    assert_eq!(input.names(), ctx.expected_order());

    // Encoder order (numeric block then indicators) differs from the model's.
    assert_eq!(input.names()[4], "NumOfProducts");
    assert_eq!(input.names()[11], "HasCrCard_0");
}

#[test]
fn scaled_values_land_in_model_columns() {
    let ctx = ChurnContext::load(&fixture_config()).unwrap();
    let input = ctx.prepare(&RawInput::default()).unwrap();
    let values: Vec<(&str, f64)> = input.iter().collect();

    let expect = |name: &str, value: f64| {
        let (_, v) = values.iter().find(|(n, _)| *n == name).unwrap();
        assert!((v - value).abs() < 1e-12, "{name}: {v} vs {value}");
    };
    expect("CreditScore", 0.5);
    expect("Age", 17.0 / 74.0);
    expect("Tenure", 0.3);
    expect("Balance", 0.2);
    expect("NumOfProducts", 1.0 / 3.0);
    expect("EstimatedSalary", 0.3);
    expect("Geography_France", 1.0);
    expect("Gender_Female", 0.0);
    expect("IsActiveMember_1", 1.0);
}

#[test]
fn repeated_preparation_is_identical() {
    let ctx = ChurnContext::load(&fixture_config()).unwrap();
    let raw = RawInput {
        geography: Geography::Germany,
        gender: Gender::Female,
        ..RawInput::default()
    };
    let first = ctx.prepare(&raw).unwrap();
    let second = ctx.prepare(&raw).unwrap();
    let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
    assert_eq!(first.names(), second.names());
    assert_eq!(bits(first.values()), bits(second.values()));
}

#[test]
fn manual_chain_matches_context() {
    let ctx = ChurnContext::load(&fixture_config()).unwrap();
    let scaler = MinMaxScaler::load(data("scaler.json")).unwrap();
    let raw = RawInput::default();

    let scaled = scale(&encode(&raw), &scaler).unwrap();
    let aligned = align(&scaled, ctx.expected_order(), ExtraColumnPolicy::Reject).unwrap();
    assert_eq!(aligned, ctx.prepare(&raw).unwrap());
}

// ---------------------------------------------------------------------------
// Predictions against the fixture model
// ---------------------------------------------------------------------------

#[test]
fn reference_customer_is_retained() {
    let ctx = ChurnContext::load(&fixture_config()).unwrap();
    let result = ctx.predict(&RawInput::default()).unwrap();

    // young (left) and active (-0.3), two products (-0.1)
    let p = sigmoid(-0.4) as f32;
    assert_eq!(result.label, ChurnLabel::Retained);
    assert!((result.churn_probability() - p).abs() < 1e-6);
    assert!((result.retention_probability() - (1.0 - p)).abs() < 1e-6);
    assert!((result.probabilities.iter().sum::<f32>() - 1.0).abs() < 1e-6);
}

#[test]
fn older_customer_with_more_products_churns() {
    let ctx = ChurnContext::load(&fixture_config()).unwrap();
    let raw = RawInput {
        age: 60,
        num_products: 3,
        ..RawInput::default()
    };
    let result = ctx.predict(&raw).unwrap();
    assert_eq!(result.label, ChurnLabel::Churned);
    assert!((result.churn_probability() - sigmoid(0.9) as f32).abs() < 1e-6);
}

#[test]
fn inactive_member_follows_inactive_branch() {
    let ctx = ChurnContext::load(&fixture_config()).unwrap();
    let raw = RawInput {
        age: 30,
        num_products: 1,
        is_active_member: YesNo::No,
        has_credit_card: YesNo::No,
        ..RawInput::default()
    };
    let result = ctx.predict(&raw).unwrap();
    assert_eq!(result.label, ChurnLabel::Churned);
    assert!((result.churn_probability() - sigmoid(0.1) as f32).abs() < 1e-6);
}

#[test]
fn out_of_range_input_is_rejected_before_encoding() {
    let ctx = ChurnContext::load(&fixture_config()).unwrap();
    let raw = RawInput {
        age: 12,
        ..RawInput::default()
    };
    assert!(matches!(
        ctx.predict(&raw),
        Err(ChurnError::OutOfRange { field: "Age", .. })
    ));

    let mut config = fixture_config();
    config.validate_input = false;
    let lenient = ChurnContext::load(&config).unwrap();
    assert!(lenient.predict(&raw).is_ok());
}

#[test]
fn batch_matches_single_predictions() {
    let ctx = ChurnContext::load(&fixture_config()).unwrap();
    let records = read_customers(data("customers.csv")).unwrap();
    let raws: Vec<RawInput> = records.iter().map(|r| r.input.clone()).collect();

    let batch = ctx.predict_batch(&raws).unwrap();
    assert_eq!(batch.len(), 3);
    for (raw, result) in raws.iter().zip(&batch) {
        assert_eq!(&ctx.predict(raw).unwrap(), result);
    }
    let labels: Vec<ChurnLabel> = batch.iter().map(|r| r.label).collect();
    assert_eq!(
        labels,
        vec![ChurnLabel::Retained, ChurnLabel::Churned, ChurnLabel::Churned]
    );
}

#[test]
fn empty_batch_yields_no_predictions() {
    let ctx = ChurnContext::load(&fixture_config()).unwrap();
    assert!(ctx.predict_batch(&[]).unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Extra column policy
// ---------------------------------------------------------------------------

#[test]
fn strict_policy_rejects_column_unknown_to_model() {
    let scaler = MinMaxScaler::load(data("scaler.json")).unwrap();
    let ctx = ChurnContext::new(
        Box::new(model_without_gender_male()),
        scaler,
        PipelineSettings::default(),
    );
    match ctx.predict(&RawInput::default()) {
        Err(ChurnError::SchemaMismatch { missing, unexpected }) => {
            assert!(missing.is_empty());
            assert_eq!(unexpected, vec!["Gender_Male".to_string()]);
        }
        other => panic!("expected SchemaMismatch, got {other:?}"),
    }
}

#[test]
fn drop_policy_removes_column_unknown_to_model() {
    let scaler = MinMaxScaler::load(data("scaler.json")).unwrap();
    let settings = PipelineSettings {
        extra_columns: ExtraColumnPolicy::Drop,
        ..PipelineSettings::default()
    };
    let ctx = ChurnContext::new(Box::new(model_without_gender_male()), scaler, settings);

    let input = ctx.prepare(&RawInput::default()).unwrap();
    assert_eq!(input.len(), 14);
    assert!(!input.names().iter().any(|n| n == "Gender_Male"));

    let full = ChurnContext::load(&fixture_config()).unwrap();
    assert_eq!(
        ctx.predict(&RawInput::default()).unwrap(),
        full.predict(&RawInput::default()).unwrap()
    );
}
