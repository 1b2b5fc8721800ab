use std::fmt;

use serde::Serialize;

use crate::alignment::{stack_rows, OrderedModelInput};
use crate::error::{ChurnError, Result};
use crate::models::ClassifierModel;

/// Verdict for one customer. The positive class (label 1) is churn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChurnLabel {
    Retained,
    Churned,
}

impl ChurnLabel {
    pub fn from_class(label: u8) -> Self {
        if label == 1 {
            ChurnLabel::Churned
        } else {
            ChurnLabel::Retained
        }
    }
}

impl fmt::Display for ChurnLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChurnLabel::Retained => f.write_str("Retained"),
            ChurnLabel::Churned => f.write_str("Churned"),
        }
    }
}

/// Label plus the class distribution `[p_retain, p_churn]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub label: ChurnLabel,
    pub probabilities: [f32; 2],
}

impl PredictionResult {
    /// Build from the positive-class probability, the way binary boosters
    /// report `predict_proba`.
    pub fn new(label: ChurnLabel, churn_probability: f32) -> Self {
        Self {
            label,
            probabilities: [1.0 - churn_probability, churn_probability],
        }
    }

    pub fn churn_probability(&self) -> f32 {
        self.probabilities[1]
    }

    pub fn retention_probability(&self) -> f32 {
        self.probabilities[0]
    }

    pub fn is_churn(&self) -> bool {
        self.label == ChurnLabel::Churned
    }
}

/// Format a probability as a percentage with two decimals, e.g. `40.13%`.
pub fn format_percent(p: f32) -> String {
    format!("{:.2}%", f64::from(p) * 100.0)
}

fn check_schema(model: &dyn ClassifierModel, input: &OrderedModelInput) -> Result<()> {
    if input.names() == model.feature_names() {
        return Ok(());
    }
    let missing = model
        .feature_names()
        .iter()
        .filter(|n| !input.names().contains(*n))
        .cloned()
        .collect();
    let unexpected = input
        .names()
        .iter()
        .filter(|n| !model.feature_names().contains(*n))
        .cloned()
        .collect();
    Err(ChurnError::SchemaMismatch {
        missing,
        unexpected,
    })
}

/// Run the classifier on one aligned record.
pub fn predict(model: &dyn ClassifierModel, input: &OrderedModelInput) -> Result<PredictionResult> {
    let mut results = predict_batch(model, std::slice::from_ref(input))?;
    results
        .pop()
        .ok_or_else(|| ChurnError::Model("classifier returned no prediction".to_string()))
}

/// Run the classifier on many aligned records with a single model call.
pub fn predict_batch(
    model: &dyn ClassifierModel,
    inputs: &[OrderedModelInput],
) -> Result<Vec<PredictionResult>> {
    if inputs.is_empty() {
        return Ok(Vec::new());
    }
    for input in inputs {
        check_schema(model, input)?;
    }

    let x = stack_rows(inputs)?;
    let labels = model.predict(&x)?;
    let probabilities = model.predict_proba(&x)?;
    if labels.len() != inputs.len() || probabilities.len() != inputs.len() {
        return Err(ChurnError::Model(format!(
            "classifier returned {} labels and {} probabilities for {} rows",
            labels.len(),
            probabilities.len(),
            inputs.len()
        )));
    }

    Ok(labels
        .into_iter()
        .zip(probabilities)
        .map(|(label, p)| PredictionResult::new(ChurnLabel::from_class(label), p))
        .collect())
}
