use log::info;

use crate::config::{ModelConfig, ModelType};
use crate::error::Result;
use crate::models::classifier_trait::ClassifierModel;

/// Load a boxed classifier model described by a `ModelConfig`.
/// Currently this is a thin factory implemented as a single function.
pub fn build_model(params: &ModelConfig) -> Result<Box<dyn ClassifierModel>> {
    let model: Box<dyn ClassifierModel> = match params.model_type {
        ModelType::XGBoost => Box::new(crate::models::xgboost::XGBoostClassifier::load(
            &params.model_path,
            params.feature_names.clone(),
        )?),

        ModelType::GBDT => Box::new(crate::models::gbdt::GBDTClassifier::load(
            &params.model_path,
            params.feature_names.clone(),
        )?),
    };
    info!(
        "Loaded {} model from {} ({} features)",
        model.name(),
        params.model_path.display(),
        model.feature_names().len()
    );
    Ok(model)
}
