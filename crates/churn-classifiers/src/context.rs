//! Explicitly constructed prediction context.
//!
//! `ChurnContext` owns the frozen classifier and scaler and is passed to
//! whatever serves predictions. It is built once at start-up and never
//! mutated afterwards.

use log::debug;

use crate::alignment::{align, OrderedModelInput};
use crate::config::{ChurnConfig, PipelineSettings};
use crate::error::Result;
use crate::features::{encode, validate, RawInput};
use crate::models::factory::build_model;
use crate::models::ClassifierModel;
use crate::prediction::{self, PredictionResult};
use crate::preprocessing::{scale, MinMaxScaler};

pub struct ChurnContext {
    model: Box<dyn ClassifierModel>,
    scaler: MinMaxScaler,
    settings: PipelineSettings,
}

impl ChurnContext {
    pub fn new(
        model: Box<dyn ClassifierModel>,
        scaler: MinMaxScaler,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            model,
            scaler,
            settings,
        }
    }

    /// Load both artifacts named by `config`. Any failure here means the
    /// process cannot serve predictions.
    pub fn load(config: &ChurnConfig) -> Result<Self> {
        let model = build_model(&config.model)?;
        let scaler = MinMaxScaler::load(&config.scaler_path)?;
        Ok(Self::new(model, scaler, config.pipeline_settings()))
    }

    pub fn model(&self) -> &dyn ClassifierModel {
        self.model.as_ref()
    }

    pub fn scaler(&self) -> &MinMaxScaler {
        &self.scaler
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Column order stored with the classifier.
    pub fn expected_order(&self) -> &[String] {
        self.model.feature_names()
    }

    /// Validate, encode, scale and align one record.
    pub fn prepare(&self, raw: &RawInput) -> Result<OrderedModelInput> {
        if self.settings.validate_input {
            validate(raw, &self.settings.bounds)?;
        }
        let encoded = encode(raw);
        let scaled = scale(&encoded, &self.scaler)?;
        align(&scaled, self.expected_order(), self.settings.extra_columns)
    }

    pub fn predict(&self, raw: &RawInput) -> Result<PredictionResult> {
        let input = self.prepare(raw)?;
        let result = prediction::predict(self.model(), &input)?;
        debug!(
            "{} -> {} (p_churn = {:.4})",
            self.model.name(),
            result.label,
            result.churn_probability()
        );
        Ok(result)
    }

    /// Predict every record in one model call. Results keep input order; the
    /// first invalid record fails the whole batch.
    pub fn predict_batch(&self, raws: &[RawInput]) -> Result<Vec<PredictionResult>> {
        let inputs = raws
            .iter()
            .map(|raw| self.prepare(raw))
            .collect::<Result<Vec<_>>>()?;
        prediction::predict_batch(self.model(), &inputs)
    }
}
