//! Column alignment between the scaled features and the model's schema.
//!
//! A silent column shift would corrupt every prediction without any signal,
//! so a missing column is always an error and unexpected columns are either
//! rejected or dropped according to [`ExtraColumnPolicy`].

use std::collections::HashSet;

use log::{debug, warn};
use ndarray::Array2;

use crate::config::ExtraColumnPolicy;
use crate::error::{ChurnError, Result};
use crate::features::ScaledFeatures;

/// Feature values laid out in the exact column order of the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedModelInput {
    names: Vec<String>,
    values: Vec<f64>,
}

impl OrderedModelInput {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Values narrowed to `f32`, the precision tree models evaluate in.
    pub fn to_f32_row(&self) -> Vec<f32> {
        self.values.iter().map(|&v| v as f32).collect()
    }
}

/// Select and order the columns of `scaled` to match `expected_order`.
pub fn align(
    scaled: &ScaledFeatures,
    expected_order: &[String],
    policy: ExtraColumnPolicy,
) -> Result<OrderedModelInput> {
    let mut seen = HashSet::with_capacity(expected_order.len());
    for name in expected_order {
        if !seen.insert(name.as_str()) {
            return Err(ChurnError::config(format!(
                "model feature list names '{}' more than once",
                name
            )));
        }
    }

    let missing: Vec<String> = expected_order
        .iter()
        .filter(|name| !scaled.contains(name))
        .cloned()
        .collect();
    let extra: Vec<String> = scaled
        .names()
        .filter(|name| !seen.contains(name))
        .map(str::to_string)
        .collect();

    if !missing.is_empty() {
        return Err(ChurnError::SchemaMismatch {
            missing,
            unexpected: extra,
        });
    }
    if !extra.is_empty() {
        match policy {
            ExtraColumnPolicy::Reject => {
                return Err(ChurnError::SchemaMismatch {
                    missing,
                    unexpected: extra,
                })
            }
            ExtraColumnPolicy::Drop => {
                warn!("Dropping features not used by the model: {:?}", extra);
            }
        }
    }

    let values = expected_order
        .iter()
        .map(|name| scaled.get(name).unwrap_or(f64::NAN))
        .collect();
    debug!("aligned {} features to model order", expected_order.len());

    Ok(OrderedModelInput {
        names: expected_order.to_vec(),
        values,
    })
}

/// Stack aligned rows into an `(n_rows, n_features)` matrix for the model.
///
/// All rows must share the same column order.
pub fn stack_rows(inputs: &[OrderedModelInput]) -> Result<Array2<f32>> {
    let ncols = inputs.first().map_or(0, OrderedModelInput::len);
    let mut data = Vec::with_capacity(inputs.len() * ncols);
    for input in inputs {
        if input.names != inputs[0].names {
            return Err(ChurnError::SchemaMismatch {
                missing: Vec::new(),
                unexpected: input.names.clone(),
            });
        }
        data.extend(input.to_f32_row());
    }
    Array2::from_shape_vec((inputs.len(), ncols), data)
        .map_err(|e| ChurnError::Model(format!("failed to build input matrix: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureMap, ScaledFeatures};

    fn scaled(names: &[&str]) -> ScaledFeatures {
        let map: FeatureMap = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.to_string(), i as f64))
            .collect();
        ScaledFeatures::from_map(map)
    }

    fn order(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn output_follows_expected_order() {
        let s = scaled(&["a", "b", "c"]);
        let input = align(&s, &order(&["c", "a", "b"]), ExtraColumnPolicy::Reject).unwrap();
        assert_eq!(input.names(), order(&["c", "a", "b"]).as_slice());
        assert_eq!(input.values(), &[2.0, 0.0, 1.0]);
    }

    #[test]
    fn missing_column_is_always_an_error() {
        let s = scaled(&["a", "b"]);
        for policy in [ExtraColumnPolicy::Reject, ExtraColumnPolicy::Drop] {
            match align(&s, &order(&["a", "b", "z"]), policy) {
                Err(ChurnError::SchemaMismatch { missing, .. }) => {
                    assert_eq!(missing, vec!["z".to_string()])
                }
                other => panic!("expected SchemaMismatch, got {other:?}"),
            }
        }
    }

    #[test]
    fn duplicate_model_column_is_rejected() {
        let s = scaled(&["a", "b"]);
        assert!(matches!(
            align(&s, &order(&["a", "a", "b"]), ExtraColumnPolicy::Drop),
            Err(ChurnError::Config(_))
        ));
    }

    #[test]
    fn stack_rows_builds_row_major_matrix() {
        let s1 = scaled(&["a", "b"]);
        let s2 = ScaledFeatures::from_map(
            [("a".to_string(), 5.0), ("b".to_string(), 6.0)].into_iter().collect(),
        );
        let o = order(&["b", "a"]);
        let rows = vec![
            align(&s1, &o, ExtraColumnPolicy::Reject).unwrap(),
            align(&s2, &o, ExtraColumnPolicy::Reject).unwrap(),
        ];
        let m = stack_rows(&rows).unwrap();
        assert_eq!(m.dim(), (2, 2));
        assert_eq!(m[[0, 0]], 1.0);
        assert_eq!(m[[1, 0]], 6.0);
        assert_eq!(rows[1].to_f32_row(), vec![6.0f32, 5.0]);
    }

    #[test]
    fn stack_rows_refuses_mixed_orders() {
        let s = scaled(&["a", "b"]);
        let rows = vec![
            align(&s, &order(&["a", "b"]), ExtraColumnPolicy::Reject).unwrap(),
            align(&s, &order(&["b", "a"]), ExtraColumnPolicy::Reject).unwrap(),
        ];
        assert!(stack_rows(&rows).is_err());
    }
}
