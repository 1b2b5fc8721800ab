use std::path::Path;

use gbdt::decision_tree::{Data, DataVec, ValueType};
use gbdt::gradient_boost::GBDT;
use ndarray::Array2;
use serde::Deserialize;

use crate::error::{ChurnError, Result};
use crate::models::classifier_trait::ClassifierModel;

/// Gradient Boosting Decision Tree (GBDT) classifier saved by the `gbdt` crate.
///
/// The model must have been trained with a probabilistic loss
/// (`LogLikelyhood` or `BinaryLogistic`) so that `predict` yields
/// probabilities. The saved format carries no column names, so they are
/// supplied by configuration.
/// The part of a saved `gbdt` model needed to check the column count.
#[derive(Debug, Deserialize)]
struct SavedModelHeader {
    conf: SavedModelConf,
}

#[derive(Debug, Deserialize)]
struct SavedModelConf {
    feature_size: usize,
}

pub struct GBDTClassifier {
    model: GBDT,
    feature_names: Vec<String>,
}

impl GBDTClassifier {
    pub fn new(model: GBDT, feature_names: Vec<String>) -> Self {
        GBDTClassifier {
            model,
            feature_names,
        }
    }

    pub fn load<P: AsRef<Path>>(path: P, feature_names: Option<Vec<String>>) -> Result<Self> {
        let feature_names = feature_names.filter(|names| !names.is_empty()).ok_or_else(|| {
            ChurnError::config("gbdt models store no feature names; configure model.feature_names")
        })?;
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ChurnError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let header: SavedModelHeader =
            serde_json::from_str(&content).map_err(|source| ChurnError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        if header.conf.feature_size != feature_names.len() {
            return Err(ChurnError::config(format!(
                "gbdt model was trained on {} features but {} feature names were given",
                header.conf.feature_size,
                feature_names.len()
            )));
        }

        let path_str = path
            .to_str()
            .ok_or_else(|| ChurnError::config(format!("non UTF-8 model path: {:?}", path)))?;
        let model = GBDT::load_model(path_str).map_err(|e| {
            ChurnError::Model(format!("failed to load gbdt model {}: {}", path.display(), e))
        })?;
        Ok(Self::new(model, feature_names))
    }
}

impl ClassifierModel for GBDTClassifier {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Vec<f32>> {
        if x.ncols() != self.feature_names.len() {
            return Err(ChurnError::Model(format!(
                "input has {} columns, model expects {}",
                x.ncols(),
                self.feature_names.len()
            )));
        }

        let mut test_x = DataVec::new();
        for row in x.outer_iter() {
            let test_row: Vec<ValueType> = row.iter().map(|&v| v as ValueType).collect();
            test_x.push(Data::new_training_data(test_row, 1.0, 0.0, None));
        }
        let predictions = self.model.predict(&test_x);

        predictions
            .into_iter()
            .map(|p| {
                let p = p as f32;
                if (0.0..=1.0).contains(&p) {
                    Ok(p)
                } else {
                    Err(ChurnError::Model(format!(
                        "gbdt model returned {} which is not a probability; \
                         was it trained with a probabilistic loss?",
                        p
                    )))
                }
            })
            .collect()
    }

    fn name(&self) -> &str {
        "gbdt"
    }
}
