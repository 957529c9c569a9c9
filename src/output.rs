use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use crate::error::HarvestError;
use crate::product::OutputRecord;

pub const PRODUCTS_FILE: &str = "products.json";
pub const LAST_UPDATED_FILE: &str = "last_updated.txt";

/// Ascending by (product_name, product_code), ordinal comparison.
pub fn sort_records(records: &mut [OutputRecord]) {
    records.sort_by(|a, b| {
        (a.product_name.as_str(), a.product_code.as_str())
            .cmp(&(b.product_name.as_str(), b.product_code.as_str()))
    });
}

/// Sort and write `products.json` under `dir`. Returns the sorted records.
pub fn write_products(
    dir: &Path,
    mut records: Vec<OutputRecord>,
) -> Result<Vec<OutputRecord>, HarvestError> {
    sort_records(&mut records);
    let path = dir.join(PRODUCTS_FILE);
    let json = serde_json::to_string_pretty(&records).map_err(|e| HarvestError::Output {
        path: path.clone(),
        source: e.into(),
    })?;
    write_file(dir, &path, json.as_bytes())?;
    info!("[DONE] Saved {} ({} products)", path.display(), records.len());
    Ok(records)
}

/// Write `date` as YYYY-MM-DD to `last_updated.txt` under `dir`.
pub fn write_last_updated(dir: &Path, date: NaiveDate) -> Result<String, HarvestError> {
    let iso = date.format("%Y-%m-%d").to_string();
    let path = dir.join(LAST_UPDATED_FILE);
    write_file(dir, &path, iso.as_bytes())?;
    info!("[DONE] Saved {} ({})", path.display(), iso);
    Ok(iso)
}

fn write_file(dir: &Path, path: &Path, contents: &[u8]) -> Result<(), HarvestError> {
    fs::create_dir_all(dir)
        .and_then(|_| fs::write(path, contents))
        .map_err(|source| HarvestError::Output {
            path: path.to_path_buf(),
            source,
        })
}
