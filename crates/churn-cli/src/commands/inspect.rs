use anyhow::{Context, Result};

use churn_classifiers::config::ChurnConfig;
use churn_classifiers::context::ChurnContext;

/// Describe the loaded artifacts: backend, column order and scaler ranges.
pub fn describe(ctx: &ChurnContext) -> String {
    let order = ctx.expected_order();
    let columns: String = order
        .iter()
        .enumerate()
        .map(|(i, name)| format!("  {:>2}  {}\n", i, name))
        .collect();

    let scaler = ctx.scaler();
    let (lo, hi) = scaler.feature_range();
    let ranges: String = scaler
        .feature_names()
        .iter()
        .zip(scaler.data_min())
        .zip(scaler.data_max())
        .map(|((name, min), max)| format!("  {:<16} [{}, {}]\n", name, min, max))
        .collect();

    format!(
        "Model backend: {}\nFeature order ({} columns):\n{}Scaler (feature range [{}, {}]):\n{}Extra columns: {:?}",
        ctx.model().name(),
        order.len(),
        columns,
        lo,
        hi,
        ranges,
        ctx.settings().extra_columns
    )
}

pub fn run_inspect(config: &ChurnConfig) -> Result<()> {
    let ctx = ChurnContext::load(config).context("Failed to load model artifacts")?;
    println!("{}", describe(&ctx));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use churn_classifiers::config::{ExtraColumnPolicy, PipelineSettings};
    use churn_classifiers::models::ClassifierModel;
    use churn_classifiers::preprocessing::MinMaxScaler;
    use ndarray::Array2;

    struct Constant {
        names: Vec<String>,
    }

    impl ClassifierModel for Constant {
        fn feature_names(&self) -> &[String] {
            &self.names
        }

        fn predict_proba(&self, x: &Array2<f32>) -> churn_classifiers::Result<Vec<f32>> {
            Ok(vec![0.5; x.nrows()])
        }

        fn name(&self) -> &str {
            "constant"
        }
    }

    #[test]
    fn lists_backend_columns_and_ranges() {
        let scaler = MinMaxScaler::from_ranges(
            vec!["Age".to_string()],
            vec![18.0],
            vec![92.0],
            (0.0, 1.0),
            false,
        )
        .unwrap();
        let model = Constant {
            names: vec!["Age".to_string(), "Gender_Male".to_string()],
        };
        let settings = PipelineSettings {
            extra_columns: ExtraColumnPolicy::Drop,
            ..PipelineSettings::default()
        };
        let text = describe(&ChurnContext::new(Box::new(model), scaler, settings));

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Model backend: constant");
        assert_eq!(lines[1], "Feature order (2 columns):");
        assert_eq!(lines[3], "   1  Gender_Male");
        assert_eq!(lines[4], "Scaler (feature range [0, 1]):");
        assert!(lines[5].contains("[18, 92]"), "{}", lines[5]);
        assert_eq!(lines[6], "Extra columns: Drop");
    }
}
