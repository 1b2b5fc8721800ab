//! Raw customer records and their one-hot encoding.
//!
//! `input` holds the typed record gathered upstream together with the
//! boundary checks, `schema` fixes the feature names the frozen model was
//! trained on, and `encode` builds the 15-column feature mapping.
pub mod encode;
pub mod input;
pub mod schema;

pub use encode::{encode, EncodedFeatures, FeatureMap, ScaledFeatures};
pub use input::{validate, Gender, Geography, InputBounds, RawInput, YesNo};
