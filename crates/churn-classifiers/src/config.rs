use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::features::InputBounds;

/// Central configuration for the frozen classifier.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    pub model_type: ModelType,

    pub model_path: PathBuf,

    /// Column order to use instead of the one stored in the artifact.
    /// Required for `gbdt` models, which do not record column names.
    pub feature_names: Option<Vec<String>>,
}

/// Supported classifier artifact formats.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelType {
    /// XGBoost JSON model (`Booster.save_model("model.json")`).
    #[default]
    #[serde(rename = "xgboost")]
    XGBoost,
    /// Model saved with the `gbdt` crate.
    #[serde(rename = "gbdt")]
    GBDT,
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xgboost" | "xgb" => Ok(ModelType::XGBoost),
            "gbdt" => Ok(ModelType::GBDT),
            _ => Err(format!(
                "Unknown model type: {}. Expected one of: xgboost, gbdt",
                s
            )),
        }
    }
}

impl ModelConfig {
    pub fn new(model_type: ModelType, model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_type,
            model_path: model_path.into(),
            feature_names: None,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::new(ModelType::XGBoost, "best_model.json")
    }
}

/// What alignment does with encoded columns the model does not list.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExtraColumnPolicy {
    /// Fail with a schema mismatch.
    #[default]
    Reject,
    /// Drop them and log a warning.
    Drop,
}

impl FromStr for ExtraColumnPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reject" | "strict" => Ok(ExtraColumnPolicy::Reject),
            "drop" => Ok(ExtraColumnPolicy::Drop),
            _ => Err(format!(
                "Unknown extra column policy: {}. Expected one of: reject, drop",
                s
            )),
        }
    }
}

/// Per-request behaviour of the prediction pipeline.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PipelineSettings {
    pub bounds: InputBounds,
    pub validate_input: bool,
    pub extra_columns: ExtraColumnPolicy,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            bounds: InputBounds::default(),
            validate_input: true,
            extra_columns: ExtraColumnPolicy::default(),
        }
    }
}

/// Everything needed to build a [`crate::context::ChurnContext`].
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ChurnConfig {
    pub model: ModelConfig,
    pub scaler_path: PathBuf,
    pub bounds: InputBounds,
    pub validate_input: bool,
    pub extra_columns: ExtraColumnPolicy,
}

impl Default for ChurnConfig {
    fn default() -> Self {
        let settings = PipelineSettings::default();
        Self {
            model: ModelConfig::default(),
            scaler_path: PathBuf::from("scaler.json"),
            bounds: settings.bounds,
            validate_input: settings.validate_input,
            extra_columns: settings.extra_columns,
        }
    }
}

impl ChurnConfig {
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            bounds: self.bounds.clone(),
            validate_input: self.validate_input,
            extra_columns: self.extra_columns,
        }
    }
}
