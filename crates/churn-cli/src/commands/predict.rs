use anyhow::{Context, Result};
use clap::ArgMatches;

use churn_classifiers::config::ChurnConfig;
use churn_classifiers::context::ChurnContext;
use churn_classifiers::features::RawInput;
use churn_classifiers::prediction::{format_percent, PredictionResult};

fn required<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> Result<T> {
    matches
        .get_one::<T>(id)
        .cloned()
        .with_context(|| format!("Missing value for --{}", id.replace('_', "-")))
}

fn parsed<T>(matches: &ArgMatches, id: &str) -> Result<T>
where
    T: std::str::FromStr<Err = churn_classifiers::ChurnError>,
{
    let raw: String = required(matches, id)?;
    Ok(raw.parse::<T>()?)
}

/// Collect one customer record from the `predict` flags.
pub fn raw_input_from_matches(matches: &ArgMatches) -> Result<RawInput> {
    Ok(RawInput {
        credit_score: required(matches, "credit_score")?,
        age: required(matches, "age")?,
        tenure: required(matches, "tenure")?,
        balance: required(matches, "balance")?,
        num_products: required(matches, "num_products")?,
        estimated_salary: required(matches, "estimated_salary")?,
        geography: parsed(matches, "geography")?,
        gender: parsed(matches, "gender")?,
        has_credit_card: parsed(matches, "has_credit_card")?,
        is_active_member: parsed(matches, "is_active_member")?,
    })
}

/// Human readable verdict.
pub fn render_prediction(result: &PredictionResult) -> String {
    format!(
        "Predicted Status: {}\nProbability of Churn: {}\nProbability of Retention: {}",
        result.label,
        format_percent(result.churn_probability()),
        format_percent(result.retention_probability()),
    )
}

pub fn render_prediction_json(raw: &RawInput, result: &PredictionResult) -> Result<String> {
    let value = serde_json::json!({
        "input": raw,
        "prediction": result.label,
        "churn_probability": result.churn_probability(),
        "retention_probability": result.retention_probability(),
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

pub fn run_predict(config: &ChurnConfig, raw: &RawInput, json: bool) -> Result<()> {
    let ctx = ChurnContext::load(config).context("Failed to load model artifacts")?;
    let result = ctx.predict(raw).context("Prediction failed")?;

    if json {
        println!("{}", render_prediction_json(raw, &result)?);
    } else {
        println!("{}", render_prediction(&result));
    }
    Ok(())
}
