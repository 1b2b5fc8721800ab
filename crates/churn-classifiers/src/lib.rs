//! churn-classifiers: inference-time glue for a frozen bank-churn classifier.
//!
//! The crate turns a raw customer record into the exact feature vector the
//! frozen model was trained on (one-hot encoding, min-max scaling of the
//! numeric columns, column alignment) and evaluates it with one of the
//! supported classifier backends.
//!
//! Artifacts are loaded once into a [`context::ChurnContext`] and treated as
//! read-only for the lifetime of the process.
pub mod alignment;
pub mod config;
pub mod context;
pub mod error;
pub mod features;
pub mod io;
pub mod models;
pub mod prediction;
pub mod preprocessing;

pub use error::{ChurnError, Result};
