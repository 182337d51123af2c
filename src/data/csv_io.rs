//! CSV reading and writing for benchmark tables

use super::table::Dataset;
use super::value::Value;
use anyhow::{Context, Result};
use std::io::{Read, Write};
use std::path::Path;

/// Cell spellings treated as missing when reading. `None` is deliberately
/// absent: it is a real quantization label.
const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "<NA>"];

/// Convert one raw CSV cell into a [`Value`].
pub fn parse_cell(cell: &str) -> Value {
    if MISSING_MARKERS.contains(&cell.trim()) {
        Value::Missing
    } else {
        Value::Text(cell.to_string())
    }
}

/// Read a headed CSV file into a [`Dataset`].
pub fn read_dataset(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open CSV file {}", path.display()))?;
    read_dataset_from(file).with_context(|| format!("Failed to read CSV file {}", path.display()))
}

pub fn read_dataset_from<R: Read>(reader: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let columns: Vec<String> = reader
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut dataset = Dataset::new(columns);
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Malformed CSV record {}", line + 1))?;
        dataset.push_row(record.iter().map(parse_cell).collect())?;
    }

    Ok(dataset)
}

/// Write a [`Dataset`] as a headed CSV file.
pub fn write_dataset(path: impl AsRef<Path>, dataset: &Dataset) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create CSV file {}", path.display()))?;
    write_dataset_to(file, dataset)
        .with_context(|| format!("Failed to write CSV file {}", path.display()))
}

pub fn write_dataset_to<W: Write>(writer: W, dataset: &Dataset) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(dataset.columns())?;
    for row in dataset.rows() {
        writer.write_record(row.iter().map(|value| value.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}
