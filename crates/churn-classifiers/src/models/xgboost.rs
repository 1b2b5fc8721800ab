//! Pure-Rust evaluator for XGBoost models saved in the JSON model format.
//!
//! Only what a frozen binary `gbtree` classifier needs is supported: numeric
//! splits, missing-value routing, and the logistic link. The evaluation
//! mirrors XGBoost's CPU predictor, accumulating margins in `f32`.
use std::path::Path;

use log::debug;
use ndarray::{Array2, ArrayView1};
use serde::Deserialize;

use crate::error::{ChurnError, Result};
use crate::models::classifier_trait::ClassifierModel;

#[derive(Debug, Deserialize)]
struct ModelFile {
    learner: Learner,
}

#[derive(Debug, Deserialize)]
struct Learner {
    #[serde(default)]
    feature_names: Vec<String>,
    gradient_booster: GradientBooster,
    learner_model_param: LearnerModelParam,
    objective: ObjectiveParam,
}

#[derive(Debug, Deserialize)]
struct GradientBooster {
    name: String,
    #[serde(default)]
    model: Option<TreeEnsemble>,
}

#[derive(Debug, Deserialize)]
struct TreeEnsemble {
    trees: Vec<TreeJson>,
    #[serde(default)]
    tree_info: Vec<i32>,
}

#[derive(Debug, Deserialize)]
struct LearnerModelParam {
    base_score: String,
    #[serde(default)]
    num_class: Option<String>,
    #[serde(default)]
    num_feature: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObjectiveParam {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TreeJson {
    left_children: Vec<i32>,
    right_children: Vec<i32>,
    split_indices: Vec<u32>,
    split_conditions: Vec<f32>,
    default_left: Vec<Flag>,
    #[serde(default)]
    split_type: Vec<u8>,
}

/// Older exports write booleans, newer ones write 0/1.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(u8),
}

impl Flag {
    fn is_set(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Int(i) => *i != 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Node {
    left: i32,
    right: i32,
    split_index: usize,
    /// Split threshold for internal nodes, leaf weight for leaves.
    split_condition: f32,
    default_left: bool,
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.left == -1
    }
}

#[derive(Debug, Clone, PartialEq)]
struct RegTree {
    nodes: Vec<Node>,
}

impl RegTree {
    fn from_json(tree: TreeJson, tree_id: usize, num_features: usize) -> Result<Self> {
        let n = tree.left_children.len();
        if n == 0
            || tree.right_children.len() != n
            || tree.split_indices.len() != n
            || tree.split_conditions.len() != n
            || tree.default_left.len() != n
        {
            return Err(ChurnError::config(format!(
                "tree {} has inconsistent node arrays",
                tree_id
            )));
        }
        if tree.split_type.iter().any(|&t| t != 0) {
            return Err(ChurnError::config(format!(
                "tree {} uses categorical splits, which are not supported",
                tree_id
            )));
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let (left, right) = (tree.left_children[i], tree.right_children[i]);
            let split_index = tree.split_indices[i] as usize;
            if left != -1 {
                // Children always come after their parent, which also rules out cycles.
                let in_range = |c: i32| c > i as i32 && (c as usize) < n;
                if !in_range(left) || !in_range(right) {
                    return Err(ChurnError::config(format!(
                        "tree {} node {} has invalid children ({}, {})",
                        tree_id, i, left, right
                    )));
                }
                if split_index >= num_features {
                    return Err(ChurnError::config(format!(
                        "tree {} node {} splits on feature {} but the model has {} features",
                        tree_id, i, split_index, num_features
                    )));
                }
            }
            nodes.push(Node {
                left,
                right,
                split_index,
                split_condition: tree.split_conditions[i],
                default_left: tree.default_left[i].is_set(),
            });
        }
        Ok(RegTree { nodes })
    }

    fn leaf_value(&self, row: ArrayView1<f32>) -> f32 {
        let mut idx = 0usize;
        loop {
            let node = &self.nodes[idx];
            if node.is_leaf() {
                return node.split_condition;
            }
            let value = row[node.split_index];
            let go_left = if value.is_nan() {
                node.default_left
            } else {
                value < node.split_condition
            };
            let next = if go_left { node.left } else { node.right };
            idx = next as usize;
        }
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

fn parse_base_score(raw: &str) -> Result<f32> {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']');
    trimmed
        .parse::<f32>()
        .map_err(|_| ChurnError::config(format!("invalid base_score '{}'", raw)))
}

/// Frozen XGBoost binary classifier.
#[derive(Debug, Clone)]
pub struct XGBoostClassifier {
    feature_names: Vec<String>,
    base_margin: f32,
    trees: Vec<RegTree>,
}

impl XGBoostClassifier {
    /// Load a model saved with `save_model("*.json")`.
    pub fn load<P: AsRef<Path>>(path: P, feature_names: Option<Vec<String>>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ChurnError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ModelFile = serde_json::from_str(&content).map_err(|source| ChurnError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_model_file(file, feature_names)
    }

    /// Parse a model from its JSON text.
    pub fn from_json_str(json: &str, feature_names: Option<Vec<String>>) -> Result<Self> {
        let file: ModelFile = serde_json::from_str(json)
            .map_err(|e| ChurnError::config(format!("invalid XGBoost model JSON: {}", e)))?;
        Self::from_model_file(file, feature_names)
    }

    fn from_model_file(file: ModelFile, feature_names: Option<Vec<String>>) -> Result<Self> {
        let learner = file.learner;

        match learner.objective.name.as_str() {
            "binary:logistic" | "reg:logistic" => {}
            other => {
                return Err(ChurnError::config(format!(
                    "unsupported objective '{}', expected binary:logistic",
                    other
                )))
            }
        }
        let num_class = learner
            .learner_model_param
            .num_class
            .as_deref()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(0);
        if num_class > 1 {
            return Err(ChurnError::config(format!(
                "multi-class model with {} classes is not a binary churn classifier",
                num_class
            )));
        }
        if learner.gradient_booster.name != "gbtree" {
            return Err(ChurnError::config(format!(
                "unsupported booster '{}', expected gbtree",
                learner.gradient_booster.name
            )));
        }
        let ensemble = learner
            .gradient_booster
            .model
            .ok_or_else(|| ChurnError::config("gbtree booster has no model section"))?;
        if ensemble.tree_info.iter().any(|&g| g != 0) {
            return Err(ChurnError::config("model has more than one output group"));
        }

        let feature_names = match feature_names {
            Some(names) => names,
            None if !learner.feature_names.is_empty() => learner.feature_names,
            None => {
                return Err(ChurnError::config(
                    "model artifact stores no feature names; configure model.feature_names",
                ))
            }
        };
        let declared = learner
            .learner_model_param
            .num_feature
            .as_deref()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(feature_names.len());
        if declared != feature_names.len() {
            return Err(ChurnError::config(format!(
                "model was trained on {} features but {} feature names were given",
                declared,
                feature_names.len()
            )));
        }

        let base_score = parse_base_score(&learner.learner_model_param.base_score)?;
        if !(base_score > 0.0 && base_score < 1.0) {
            return Err(ChurnError::config(format!(
                "base_score {} is not a probability",
                base_score
            )));
        }
        let base_margin = -(1.0f32 / base_score - 1.0).ln();

        let trees = ensemble
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, t)| RegTree::from_json(t, i, feature_names.len()))
            .collect::<Result<Vec<_>>>()?;
        debug!(
            "parsed {} trees, base margin {}, {} features",
            trees.len(),
            base_margin,
            feature_names.len()
        );

        Ok(Self {
            feature_names,
            base_margin,
            trees,
        })
    }

    /// Raw (untransformed) margin for every row.
    pub fn predict_margin(&self, x: &Array2<f32>) -> Result<Vec<f32>> {
        if x.ncols() != self.feature_names.len() {
            return Err(ChurnError::Model(format!(
                "input has {} columns, model expects {}",
                x.ncols(),
                self.feature_names.len()
            )));
        }
        Ok(x.outer_iter()
            .map(|row| {
                let mut margin = self.base_margin;
                for tree in &self.trees {
                    margin += tree.leaf_value(row);
                }
                margin
            })
            .collect())
    }
}

impl ClassifierModel for XGBoostClassifier {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Vec<f32>> {
        Ok(self.predict_margin(x)?.into_iter().map(sigmoid).collect())
    }

    fn name(&self) -> &str {
        "xgboost"
    }
}
