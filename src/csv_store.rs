// Read access to the flat CSV datasets produced by the offline scraping script

use crate::{error::StoreError, models::Record};
use std::{collections::HashMap, path::Path};

// Loads every row of a CSV file; the header row supplies the keys.
// A missing file is reported as StoreError::Missing, never as a partial list.
pub fn load_records(path: &Path) -> Result<Vec<Record>, StoreError> {
    if !path.exists() {
        return Err(StoreError::Missing { path: path.to_path_buf() });
    }

    let read_error = |source: csv::Error| StoreError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(read_error)?;
    let headers = unique_headers(reader.headers().map_err(read_error)?);

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(read_error)?;
        records.push(
            headers
                .iter()
                .zip(row.iter())
                .collect::<Record>(),
        );
    }

    tracing::debug!(path = %path.display(), count = records.len(), "Loaded CSV records");
    Ok(records)
}

// Repeated column names get a numeric suffix (name, name.1, name.2, ...)
// so every column keeps its own key
fn unique_headers(headers: &csv::StringRecord) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    headers
        .iter()
        .map(|header| {
            let mut name = header.to_string();
            let mut count = counts.get(&name).copied().unwrap_or(0);
            while count > 0 {
                counts.insert(name.clone(), count + 1);
                name = format!("{}.{}", name, count);
                count = counts.get(&name).copied().unwrap_or(0);
            }
            counts.insert(name.clone(), count + 1);
            name
        })
        .collect()
}

// Blocking file read moved off the async runtime
pub async fn load_records_async(path: &Path) -> Result<Vec<Record>, StoreError> {
    let owned = path.to_path_buf();
    match tokio::task::spawn_blocking(move || load_records(&owned)).await {
        Ok(result) => result,
        Err(e) => Err(StoreError::Read {
            path: path.to_path_buf(),
            source: csv::Error::from(std::io::Error::other(e)),
        }),
    }
}

// Route-facing load: every failure becomes an empty list, logged by kind
pub async fn load_or_empty(path: &Path) -> Vec<Record> {
    match load_records_async(path).await {
        Ok(records) => records,
        Err(StoreError::Missing { path }) => {
            tracing::debug!(path = %path.display(), "CSV file not present, rendering empty list");
            Vec::new()
        }
        Err(e @ StoreError::Read { .. }) => {
            tracing::error!(error = %e, "Failed to read CSV, rendering empty list");
            Vec::new()
        }
    }
}
