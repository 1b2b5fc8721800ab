use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading artifacts or running the prediction pipeline.
#[derive(Debug, Error)]
pub enum ChurnError {
    /// An artifact or setting is inconsistent with the feature schema.
    #[error("configuration error: {0}")]
    Config(String),

    /// The encoded columns and the model's expected columns disagree.
    #[error("feature schema mismatch (missing: {missing:?}, unexpected: {unexpected:?})")]
    SchemaMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("{field} = {value} is outside the accepted range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid {field} '{value}', expected one of {expected:?}")]
    InvalidCategory {
        field: &'static str,
        value: String,
        expected: &'static [&'static str],
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The classifier backend failed to load or evaluate.
    #[error("model error: {0}")]
    Model(String),
}

pub type Result<T> = std::result::Result<T, ChurnError>;

impl ChurnError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        ChurnError::Config(msg.into())
    }
}
