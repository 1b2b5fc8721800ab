use anyhow::Result;
use std::path::Path;

pub fn validate_tsv_or_csv_file<P: AsRef<Path>>(path: P) -> Result<()> {
    let pb = path.as_ref();

    let ext = pb
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("tsv") | Some("csv") => {}
        _ => anyhow::bail!("File must have a .tsv or .csv extension: {}", pb.display()),
    }

    if !pb.exists() {
        anyhow::bail!("File does not exist: {}", pb.display());
    }

    Ok(())
}
