//! Column-ordered in-memory table

use super::value::{Record, Value};
use crate::error::{PipelineError, PipelineResult};

/// Ordered column names plus rows of cells aligned with them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a dataset, checking that every row has one cell per column.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> PipelineResult<Self> {
        let mut dataset = Self::new(columns);
        for row in rows {
            dataset.push_row(row)?;
        }
        Ok(dataset)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> PipelineResult<()> {
        if row.len() != self.columns.len() {
            return Err(PipelineError::Internal(format!(
                "row {} has {} cells, expected {}",
                self.rows.len(),
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of a column the caller cannot work without.
    pub fn require_column(&self, name: &str) -> PipelineResult<usize> {
        self.column_index(name)
            .ok_or_else(|| PipelineError::schema(name))
    }

    /// Append a column; `values` must hold one cell per row.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Value>) -> PipelineResult<()> {
        let name = name.into();
        if values.len() != self.rows.len() {
            return Err(PipelineError::Internal(format!(
                "column '{}' has {} cells for {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        self.columns.push(name);
        Ok(())
    }

    /// Append a column the caller has already sized to the row count.
    pub(crate) fn extend_column(&mut self, name: impl Into<String>, values: impl IntoIterator<Item = Value>) {
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        self.columns.push(name.into());
    }

    /// Replace every cell of one column in place.
    pub fn map_column<F>(&mut self, index: usize, mut f: F) -> PipelineResult<()>
    where
        F: FnMut(usize, &Value) -> PipelineResult<Value>,
    {
        for (row_idx, row) in self.rows.iter_mut().enumerate() {
            let cell = row.get_mut(index).ok_or_else(|| {
                PipelineError::Internal(format!("column index {} out of range", index))
            })?;
            *cell = f(row_idx, cell)?;
        }
        Ok(())
    }

    /// Remove rows whose cells are all missing. Returns how many were dropped.
    pub fn drop_empty_rows(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| !is_empty_row(row));
        before - self.rows.len()
    }

    /// Owned copy of one row with its column names.
    pub fn record(&self, index: usize) -> Option<Record> {
        let row = self.rows.get(index)?;
        Some(
            self.columns
                .iter()
                .zip(row)
                .fold(Record::new(), |record, (name, value)| {
                    record.with(name.clone(), value.clone())
                }),
        )
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<Value>>) {
        (self.columns, self.rows)
    }
}

pub(crate) fn is_empty_row(row: &[Value]) -> bool {
    row.iter().all(Value::is_missing)
}
