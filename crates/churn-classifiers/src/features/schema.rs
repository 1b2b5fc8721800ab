//! Feature names of the training-time schema.

/// Numeric columns, in the order the scaler was fit on.
pub const NUMERIC_FEATURES: [&str; 6] = [
    "CreditScore",
    "EstimatedSalary",
    "Tenure",
    "Balance",
    "Age",
    "NumOfProducts",
];

/// Indicator columns produced by one-hot encoding the categorical fields.
pub const INDICATOR_FEATURES: [&str; 9] = [
    "Geography_France",
    "Geography_Germany",
    "Geography_Spain",
    "Gender_Female",
    "Gender_Male",
    "HasCrCard_1",
    "HasCrCard_0",
    "IsActiveMember_1",
    "IsActiveMember_0",
];

/// Categorical source fields and the levels each one expands into.
pub const CATEGORICAL_GROUPS: [(&str, &[&str]); 4] = [
    ("Geography", &["France", "Germany", "Spain"]),
    ("Gender", &["Female", "Male"]),
    ("HasCrCard", &["1", "0"]),
    ("IsActiveMember", &["1", "0"]),
];

pub const FEATURE_COUNT: usize = NUMERIC_FEATURES.len() + INDICATOR_FEATURES.len();

/// Name of the indicator column for `level` of `field`, e.g. `Geography_Spain`.
pub fn indicator_name(field: &str, level: &str) -> String {
    format!("{}_{}", field, level)
}

pub fn is_numeric_feature(name: &str) -> bool {
    NUMERIC_FEATURES.contains(&name)
}

/// Every feature name the encoder emits: numeric columns first, then indicators.
pub fn all_features() -> Vec<String> {
    NUMERIC_FEATURES
        .iter()
        .chain(INDICATOR_FEATURES.iter())
        .map(|s| s.to_string())
        .collect()
}
