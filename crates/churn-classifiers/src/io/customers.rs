//! CSV/TSV reader for customer batches and writer for their predictions.
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{ensure, Context, Result};
use csv::StringRecord;

use crate::features::RawInput;
use crate::prediction::PredictionResult;

const CUSTOMER_ID_COLUMN: &str = "CustomerId";

/// One row of a batch file.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord {
    /// Value of the `CustomerId` column when the file has one.
    pub customer_id: Option<String>,
    pub input: RawInput,
}

fn delimiter_for(path: &Path) -> u8 {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        Some("tsv") | Some("tab") => b'\t',
        _ => b',',
    }
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

/// Read customer records using the dataset's column names, matched exactly.
///
/// Columns the encoder does not use (`RowNumber`, `Surname`, `Exited`, ...)
/// are ignored.
pub fn read_customers<P: AsRef<Path>>(path: P) -> Result<Vec<CustomerRecord>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_for(path))
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open customer file: {}", path.display()))?;

    let headers = reader
        .headers()
        .context("Failed to read customer header row")?
        .clone();
    let id_idx = find_column(&headers, CUSTOMER_ID_COLUMN);

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        // +2: one for the header, one for 1-based numbering
        let line = i + 2;
        let row = row.with_context(|| format!("Failed to read line {}", line))?;
        let input: RawInput = row
            .deserialize(Some(&headers))
            .with_context(|| format!("Invalid customer record on line {}", line))?;
        let customer_id = id_idx
            .and_then(|idx| row.get(idx))
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        records.push(CustomerRecord { customer_id, input });
    }

    log::info!("Read {} customer records from {}", records.len(), path.display());
    Ok(records)
}

/// Write one prediction row per customer to `output`, or stdout when `None`.
pub fn write_predictions(
    records: &[CustomerRecord],
    results: &[PredictionResult],
    output: Option<&Path>,
) -> Result<()> {
    ensure!(
        records.len() == results.len(),
        "{} customer records but {} predictions",
        records.len(),
        results.len()
    );

    let (sink, delimiter): (Box<dyn Write>, u8) = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            (Box::new(BufWriter::new(file)), delimiter_for(path))
        }
        None => (Box::new(io::stdout().lock()), b','),
    };
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(sink);

    writer.write_record([
        CUSTOMER_ID_COLUMN,
        "prediction",
        "churn_probability",
        "retention_probability",
    ])?;
    for (i, (record, result)) in records.iter().zip(results).enumerate() {
        let id = record
            .customer_id
            .clone()
            .unwrap_or_else(|| (i + 1).to_string());
        writer.write_record([
            id,
            result.label.to_string(),
            format!("{:.6}", result.churn_probability()),
            format!("{:.6}", result.retention_probability()),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
