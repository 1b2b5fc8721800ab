use std::path::PathBuf;

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;

use churn_classifiers::config::ChurnConfig;
use churn_cli::commands::{batch, inspect, predict};
use churn_cli::input::from_arguments;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Warn)
        .parse_env(env_logger::Env::default().filter_or("CHURN_LOG", "warn,churn=info"))
        .init();

    let matches = Command::new("churn")
        .version(clap::crate_version!())
        .about("\u{1F3E6} Churn CLI - Bank customer churn prediction from a frozen model")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(predict_command())
        .subcommand(
            artifact_args(
                Command::new("batch").about("Score every customer in a CSV/TSV file"),
            )
            .arg(
                Arg::new("input")
                    .help("Path to the customer file (*.csv or *.tsv)")
                    .required(true)
                    .value_parser(clap::value_parser!(PathBuf))
                    .value_hint(ValueHint::FilePath),
            )
            .arg(
                Arg::new("output_file")
                    .short('o')
                    .long("output")
                    .help("Path to write the predictions (*.csv or *.tsv). Defaults to stdout.")
                    .value_parser(clap::value_parser!(PathBuf))
                    .value_hint(ValueHint::FilePath),
            ),
        )
        .subcommand(artifact_args(
            Command::new("inspect")
                .about("Show the model's column order and the scaler's fitted ranges"),
        ))
        .subcommand(
            Command::new("config").about("Print the default configuration as JSON"),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("predict", sub_m)) => handle_predict(sub_m),
        Some(("batch", sub_m)) => handle_batch(sub_m),
        Some(("inspect", sub_m)) => handle_inspect(sub_m),
        Some(("config", _)) => {
            println!("{}", serde_json::to_string_pretty(&ChurnConfig::default())?);
            Ok(())
        }
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

/// Arguments shared by every command that loads the model artifacts.
fn artifact_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to a JSON configuration file")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("model_path")
                .short('m')
                .long("model")
                .help("Path to the trained model. Overrides the configuration file.")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("scaler_path")
                .short('s')
                .long("scaler")
                .help("Path to the fitted scaler (JSON). Overrides the configuration file.")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("model_type")
                .long("model-type")
                .help("Override the model type from the JSON config.")
                .value_parser(["xgboost", "gbdt"])
                .value_hint(ValueHint::Other),
        )
        .arg(
            Arg::new("feature_names")
                .long("feature-names")
                .help("Comma separated column order for models that do not store one (gbdt).")
                .value_delimiter(',')
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .value_hint(ValueHint::Other),
        )
        .arg(
            Arg::new("extra_columns")
                .long("extra-columns")
                .help("What to do with encoded columns the model does not know.")
                .value_parser(["reject", "drop"])
                .value_hint(ValueHint::Other),
        )
        .arg(
            Arg::new("no_validate")
                .long("no-validate")
                .help("Skip the numeric range checks on the input.")
                .action(ArgAction::SetTrue),
        )
}

fn predict_command() -> Command {
    let number = |id: &'static str, long: &'static str, help: &'static str, default: &'static str| {
        Arg::new(id)
            .long(long)
            .help(help)
            .default_value(default)
            .value_hint(ValueHint::Other)
    };
    let choice = |id: &'static str,
                  long: &'static str,
                  help: &'static str,
                  values: [&'static str; 2],
                  default: &'static str| {
        Arg::new(id)
            .long(long)
            .help(help)
            .ignore_case(true)
            .value_parser(values)
            .default_value(default)
    };

    artifact_args(Command::new("predict").about("Predict churn for a single customer"))
        .arg(
            number("credit_score", "credit-score", "Credit score", "600")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(number("age", "age", "Age in years", "35").value_parser(clap::value_parser!(u32)))
        .arg(
            number("tenure", "tenure", "Years as a customer", "3")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            number("balance", "balance", "Account balance", "50000")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            number("num_products", "num-products", "Number of bank products held", "2")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            number("estimated_salary", "estimated-salary", "Estimated yearly salary", "60000")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("geography")
                .long("geography")
                .help("Country of residence")
                .ignore_case(true)
                .value_parser(["France", "Germany", "Spain"])
                .default_value("France"),
        )
        .arg(choice("gender", "gender", "Gender", ["Male", "Female"], "Male"))
        .arg(choice(
            "has_credit_card",
            "has-credit-card",
            "Whether the customer holds a credit card",
            ["Yes", "No"],
            "Yes",
        ))
        .arg(choice(
            "is_active_member",
            "is-active-member",
            "Whether the customer is an active member",
            ["Yes", "No"],
            "Yes",
        ))
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the prediction as JSON.")
                .action(ArgAction::SetTrue),
        )
}

fn handle_predict(matches: &ArgMatches) -> Result<()> {
    let config = from_arguments(matches)?;
    let raw = predict::raw_input_from_matches(matches)?;
    log::debug!("[Churn] Input: {:?}", raw);

    match predict::run_predict(&config, &raw, matches.get_flag("json")) {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Prediction failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_batch(matches: &ArgMatches) -> Result<()> {
    let config = from_arguments(matches)?;
    let input_path: &PathBuf = matches
        .get_one("input")
        .ok_or_else(|| anyhow::anyhow!("Missing input file"))?;
    let output_path: Option<&PathBuf> = matches.get_one("output_file");
    log::info!("[Churn] Scoring customers from: {:?}", input_path);

    match batch::run_batch(&config, input_path, output_path.map(PathBuf::as_path)) {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Batch prediction failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_inspect(matches: &ArgMatches) -> Result<()> {
    let config = from_arguments(matches)?;
    match inspect::run_inspect(&config) {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Inspect failed: {:#}", e);
            std::process::exit(1)
        }
    }
}
