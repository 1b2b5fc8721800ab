use ndarray::Array2;

use crate::error::Result;

/// Decision threshold on the positive-class probability.
pub const DECISION_THRESHOLD: f32 = 0.5;

/// A small trait abstraction over frozen binary classifiers. Implementations
/// are loaded once from an artifact and are read-only afterwards.
pub trait ClassifierModel {
    /// Column names in the order the model was trained on.
    fn feature_names(&self) -> &[String];

    /// Probability of the positive class (label 1) for every row of `x`.
    fn predict_proba(&self, x: &Array2<f32>) -> Result<Vec<f32>>;

    /// Class labels (0 or 1). A row is positive when its probability is
    /// strictly above [`DECISION_THRESHOLD`].
    fn predict(&self, x: &Array2<f32>) -> Result<Vec<u8>> {
        Ok(self
            .predict_proba(x)?
            .into_iter()
            .map(|p| u8::from(p > DECISION_THRESHOLD))
            .collect())
    }

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}
