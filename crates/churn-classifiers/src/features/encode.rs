use std::collections::BTreeMap;

use log::debug;

use crate::features::input::{Categorical, RawInput};
use crate::features::schema::{indicator_name, is_numeric_feature};

/// Feature name to value. Ordered by name so iteration is deterministic;
/// column order is only fixed later, by alignment.
pub type FeatureMap = BTreeMap<String, f64>;

/// The 15-column mapping produced by [`encode`], before scaling.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFeatures {
    values: FeatureMap,
}

/// [`EncodedFeatures`] with the numeric columns replaced by scaler output.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledFeatures {
    values: FeatureMap,
}

macro_rules! feature_map_accessors {
    ($($ty:ident),*) => {
        $(
            impl $ty {
                pub fn get(&self, name: &str) -> Option<f64> {
                    self.values.get(name).copied()
                }

                pub fn len(&self) -> usize {
                    self.values.len()
                }

                pub fn is_empty(&self) -> bool {
                    self.values.is_empty()
                }

                pub fn contains(&self, name: &str) -> bool {
                    self.values.contains_key(name)
                }

                pub fn names(&self) -> impl Iterator<Item = &str> {
                    self.values.keys().map(String::as_str)
                }

                pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
                    self.values.iter().map(|(k, v)| (k.as_str(), *v))
                }

                pub fn as_map(&self) -> &FeatureMap {
                    &self.values
                }
            }
        )*
    };
}

feature_map_accessors!(EncodedFeatures, ScaledFeatures);

impl EncodedFeatures {
    pub fn from_map(values: FeatureMap) -> Self {
        Self { values }
    }

    /// Indicator columns only, i.e. everything the scaler must not touch.
    pub fn indicators(&self) -> impl Iterator<Item = (&str, f64)> {
        self.iter().filter(|(name, _)| !is_numeric_feature(name))
    }
}

impl ScaledFeatures {
    pub fn from_map(values: FeatureMap) -> Self {
        Self { values }
    }

    pub fn indicators(&self) -> impl Iterator<Item = (&str, f64)> {
        self.iter().filter(|(name, _)| !is_numeric_feature(name))
    }
}

fn one_hot<C: Categorical>(values: &mut FeatureMap, field: &str, observed: C) {
    let observed = observed.level();
    for level in C::LEVELS {
        let flag = if *level == observed { 1.0 } else { 0.0 };
        values.insert(indicator_name(field, level), flag);
    }
}

/// Encode a raw record into the training-time feature mapping.
///
/// Numeric fields pass through unchanged. Every categorical level becomes its
/// own 0/1 column, so both `HasCrCard_1` and `HasCrCard_0` are present, as
/// the model was trained with both. No range checks happen here.
pub fn encode(raw: &RawInput) -> EncodedFeatures {
    let mut values = FeatureMap::new();

    values.insert("CreditScore".to_string(), f64::from(raw.credit_score));
    values.insert("Age".to_string(), f64::from(raw.age));
    values.insert("Tenure".to_string(), f64::from(raw.tenure));
    values.insert("Balance".to_string(), raw.balance);
    values.insert("NumOfProducts".to_string(), f64::from(raw.num_products));
    values.insert("EstimatedSalary".to_string(), raw.estimated_salary);

    one_hot(&mut values, "Geography", raw.geography);
    one_hot(&mut values, "Gender", raw.gender);
    one_hot(&mut values, "HasCrCard", raw.has_credit_card);
    one_hot(&mut values, "IsActiveMember", raw.is_active_member);

    debug!("encoded record into {} features", values.len());
    EncodedFeatures { values }
}
