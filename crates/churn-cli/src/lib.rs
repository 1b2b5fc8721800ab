//! Command line front end for churn prediction.
//!
//! The binary gathers raw customer attributes (flags or a batch file), builds
//! a `ChurnContext` once from the configured artifacts, and prints
//! predictions.
pub mod commands;
pub mod input;
pub mod util;
