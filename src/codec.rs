//! Reversible ordinal encoding of categorical benchmark fields
//!
//! Each categorical column (backend, precision, quantization, ...) is fitted
//! to the labels present in the dataset. Labels are assigned dense codes
//! `0..k-1` in sorted byte order, so the same label set always produces the
//! same codes regardless of row order. The resulting [`CodecTable`] is the
//! only way back from codes to labels and is passed explicitly between stages.

use crate::data::{Dataset, Value};
use crate::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Label/code bijection for one categorical field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecEntry {
    field: String,
    /// Sorted, unique. A label's position is its code.
    labels: Vec<String>,
}

impl CodecEntry {
    /// Fit an entry to the labels observed for `field`.
    pub fn fit<I, S>(field: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: BTreeSet<String> = labels.into_iter().map(Into::into).collect();
        Self {
            field: field.into(),
            labels: labels.into_iter().collect(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn encode(&self, label: &str) -> PipelineResult<usize> {
        self.labels
            .binary_search_by(|probe| probe.as_str().cmp(label))
            .map_err(|_| PipelineError::UnknownLabel {
                field: self.field.clone(),
                label: label.to_string(),
            })
    }

    pub fn decode(&self, code: usize) -> PipelineResult<&str> {
        self.labels
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| PipelineError::UnknownCode {
                field: self.field.clone(),
                code,
                len: self.labels.len(),
            })
    }

    /// Encode one cell. Missing cells carry no label and stay missing.
    fn encode_value(&self, value: &Value) -> PipelineResult<Value> {
        match value.label() {
            Some(label) => self.encode(&label).map(Value::Code),
            None => Ok(Value::Missing),
        }
    }

    fn decode_value(&self, row: usize, value: &Value) -> PipelineResult<Value> {
        match value {
            Value::Missing => Ok(Value::Missing),
            Value::Code(code) => self.decode(*code).map(Value::from),
            other => Err(PipelineError::parse(&self.field, row, other.to_string())),
        }
    }
}

/// Codec entries for every encoded field, keyed by column name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecTable {
    entries: BTreeMap<String, CodecEntry>,
}

impl CodecTable {
    pub fn get(&self, field: &str) -> Option<&CodecEntry> {
        self.entries.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decode every coded cell of one row. Columns without an entry pass
    /// through unchanged.
    pub fn decode_row(&self, columns: &[String], values: &[Value], row: usize) -> PipelineResult<Vec<Value>> {
        columns
            .iter()
            .zip(values)
            .map(|(column, value)| match self.entries.get(column) {
                Some(entry) => entry.decode_value(row, value),
                None => Ok(value.clone()),
            })
            .collect()
    }

    /// Decode a whole encoded dataset back to label form.
    pub fn decode_dataset(&self, dataset: &Dataset) -> PipelineResult<Dataset> {
        let rows = dataset
            .rows()
            .iter()
            .enumerate()
            .map(|(row, values)| self.decode_row(dataset.columns(), values, row))
            .collect::<PipelineResult<Vec<_>>>()?;
        Dataset::from_rows(dataset.columns().to_vec(), rows)
    }
}

/// Fit one codec entry per categorical field and replace every label with its
/// code.
///
/// Fails with [`PipelineError::Schema`] if a listed field is not a column of
/// the dataset.
pub fn fit_encode<S: AsRef<str>>(
    mut dataset: Dataset,
    categorical_fields: &[S],
) -> PipelineResult<(Dataset, CodecTable)> {
    let mut table = CodecTable::default();

    for field in categorical_fields {
        let field = field.as_ref();
        let index = dataset.require_column(field)?;

        let entry = CodecEntry::fit(
            field,
            dataset.rows().iter().filter_map(|row| row[index].label()),
        );
        dataset.map_column(index, |_, value| entry.encode_value(value))?;

        tracing::debug!(field, labels = entry.len(), "fitted categorical codec");
        table.entries.insert(field.to_string(), entry);
    }

    Ok((dataset, table))
}

/// Map an encoded column back to its labels.
pub fn decode(encoded: &[Value], entry: &CodecEntry) -> PipelineResult<Vec<Value>> {
    encoded
        .iter()
        .enumerate()
        .map(|(row, value)| entry.decode_value(row, value))
        .collect()
}
