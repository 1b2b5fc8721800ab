pub mod gbdt;
pub mod xgboost;

pub mod classifier_trait;
pub mod factory;

pub use classifier_trait::ClassifierModel;
