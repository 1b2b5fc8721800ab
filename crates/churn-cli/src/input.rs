use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::ArgMatches;

use churn_classifiers::config::{ChurnConfig, ExtraColumnPolicy, ModelType};

/// Read a configuration file field by field. Missing or invalid fields keep
/// their defaults, with a warning.
pub fn load_config_file<P: AsRef<Path>>(config_path: P) -> Result<ChurnConfig> {
    let config_path = config_path.as_ref();
    let config_json = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

    let partial: serde_json::Value = serde_json::from_str(&config_json)
        .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;
    let mut config = ChurnConfig::default();

    macro_rules! load_or_default {
        ($field:ident) => {
            if let Some(val) = partial.get(stringify!($field)) {
                if let Ok(parsed) = serde_json::from_value(val.clone()) {
                    config.$field = parsed;
                } else {
                    log::warn!(
                        "Config Invalid value for '{}', using default: {:?}",
                        stringify!($field), config.$field
                    );
                }
            } else {
                log::warn!(
                    "Config Missing field '{}', using default: {:?}",
                    stringify!($field), config.$field
                );
            }
        };
    }

    load_or_default!(model);
    load_or_default!(scaler_path);
    load_or_default!(bounds);
    load_or_default!(validate_input);
    load_or_default!(extra_columns);

    Ok(config)
}

/// Build the effective configuration: the optional `--config` file, then
/// command line overrides.
pub fn from_arguments(matches: &ArgMatches) -> Result<ChurnConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(config_path) => {
            log::info!("[Churn] Using config: {:?}", config_path);
            load_config_file(config_path)?
        }
        None => {
            log::warn!("[Churn] No config file provided; using defaults.");
            ChurnConfig::default()
        }
    };

    if let Some(model_path) = matches.get_one::<PathBuf>("model_path") {
        config.model.model_path = model_path.clone();
    }
    if let Some(scaler_path) = matches.get_one::<PathBuf>("scaler_path") {
        config.scaler_path = scaler_path.clone();
    }
    if let Some(model_type) = matches.get_one::<String>("model_type") {
        config.model.model_type = ModelType::from_str(model_type).map_err(anyhow::Error::msg)?;
    }
    if let Some(names) = matches.get_many::<String>("feature_names") {
        config.model.feature_names = Some(names.cloned().collect());
    }
    if let Some(policy) = matches.get_one::<String>("extra_columns") {
        config.extra_columns =
            ExtraColumnPolicy::from_str(policy).map_err(anyhow::Error::msg)?;
    }
    if matches.get_flag("no_validate") {
        config.validate_input = false;
    }

    Ok(config)
}
