use std::path::Path;

use anyhow::{Context, Result};

use churn_classifiers::config::ChurnConfig;
use churn_classifiers::context::ChurnContext;
use churn_classifiers::features::RawInput;
use churn_classifiers::io::{read_customers, write_predictions};

use crate::util::validate_tsv_or_csv_file;

/// Score every customer in `input_path` and write one prediction per row.
pub fn run_batch(config: &ChurnConfig, input_path: &Path, output: Option<&Path>) -> Result<()> {
    validate_tsv_or_csv_file(input_path)?;
    let ctx = ChurnContext::load(config).context("Failed to load model artifacts")?;

    let records = read_customers(input_path)?;
    let raws: Vec<RawInput> = records.iter().map(|r| r.input.clone()).collect();
    let results = ctx
        .predict_batch(&raws)
        .with_context(|| format!("Batch prediction failed for {}", input_path.display()))?;

    write_predictions(&records, &results, output)?;

    let churned = results.iter().filter(|r| r.is_churn()).count();
    log::info!(
        "[Churn] Scored {} customers: {} predicted to churn, {} retained",
        results.len(),
        churned,
        results.len() - churned
    );
    Ok(())
}
