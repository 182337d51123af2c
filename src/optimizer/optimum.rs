//! Per-bucket optimum selection and the persisted optimum table

use super::bucket::Buckets;
use crate::codec::CodecTable;
use crate::data::{Dataset, Record, Value};
use crate::error::{PipelineError, PipelineResult};
use crate::scorer::{ScoredRecord, NORM_ENERGY, SCORE_COLUMN};

/// Bucket key column of the optimum table
pub const MEMORY_GROUP_COLUMN: &str = "Memory Group";

/// Best configuration of one memory bucket
#[derive(Debug, Clone, PartialEq)]
pub struct OptimumRow {
    memory_group: i64,
    score: f64,
    /// Aligned with [`OptimumTable::columns`]
    values: Vec<Value>,
}

impl OptimumRow {
    pub fn new(memory_group: i64, score: f64, values: Vec<Value>) -> Self {
        Self {
            memory_group,
            score,
            values,
        }
    }

    pub fn memory_group(&self) -> i64 {
        self.memory_group
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// One optimum row per observed memory bucket, sorted by bucket key.
///
/// Immutable once built. Queries only borrow it, so a single table can serve
/// any number of concurrent lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimumTable {
    /// Input columns preceding the normalization block
    columns: Vec<String>,
    rows: Vec<OptimumRow>,
}

impl OptimumTable {
    /// Build a table, sorting rows by bucket key.
    ///
    /// Fails if two rows share a bucket or a row does not match the columns.
    pub fn new(columns: Vec<String>, mut rows: Vec<OptimumRow>) -> PipelineResult<Self> {
        if let Some(row) = rows.iter().find(|r| r.values.len() != columns.len()) {
            return Err(PipelineError::Internal(format!(
                "optimum row for bucket {} has {} cells, expected {}",
                row.memory_group,
                row.values.len(),
                columns.len()
            )));
        }

        rows.sort_by_key(|r| r.memory_group);
        if let Some(pair) = rows.windows(2).find(|w| w[0].memory_group == w[1].memory_group) {
            return Err(PipelineError::schema_with(
                MEMORY_GROUP_COLUMN,
                format!("duplicate memory group {}", pair[0].memory_group),
            ));
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[OptimumRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn memory_groups(&self) -> impl Iterator<Item = i64> + '_ {
        self.rows.iter().map(|r| r.memory_group)
    }

    pub fn get(&self, memory_group: i64) -> Option<&OptimumRow> {
        self.rows
            .binary_search_by_key(&memory_group, |r| r.memory_group)
            .ok()
            .map(|i| &self.rows[i])
    }

    /// A row as a named record in persisted column order, ending with
    /// `Memory Group` and `Energy_Performance_Score`.
    pub fn record(&self, row: &OptimumRow) -> Record {
        let record = self
            .columns
            .iter()
            .zip(&row.values)
            .fold(Record::new(), |record, (name, value)| {
                record.with(name.clone(), value.clone())
            });
        record
            .with(MEMORY_GROUP_COLUMN, Value::Number(row.memory_group as f64))
            .with(SCORE_COLUMN, Value::Number(row.score))
    }

    /// Persisted layout: passthrough columns, `Memory Group`, score.
    pub fn to_dataset(&self) -> PipelineResult<Dataset> {
        let mut columns = self.columns.clone();
        columns.push(MEMORY_GROUP_COLUMN.to_string());
        columns.push(SCORE_COLUMN.to_string());

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut values = row.values.clone();
                values.push(Value::Number(row.memory_group as f64));
                values.push(Value::Number(row.score));
                values
            })
            .collect();
        Dataset::from_rows(columns, rows)
    }

    /// Load a persisted table.
    ///
    /// Every column named `Memory Group` or `Energy_Performance_Score` is
    /// treated as table metadata, so files whose bucket index was written
    /// twice still load. The first occurrence of each is authoritative.
    pub fn from_dataset(dataset: Dataset) -> PipelineResult<Self> {
        let group_idx = dataset.require_column(MEMORY_GROUP_COLUMN)?;
        let score_idx = dataset.require_column(SCORE_COLUMN)?;

        let keep: Vec<usize> = dataset
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, name)| *name != MEMORY_GROUP_COLUMN && *name != SCORE_COLUMN)
            .map(|(i, _)| i)
            .collect();
        let columns = keep.iter().map(|&i| dataset.columns()[i].clone()).collect();

        let mut rows = Vec::with_capacity(dataset.len());
        for (row, values) in dataset.rows().iter().enumerate() {
            let group = &values[group_idx];
            let memory_group = group
                .to_f64()
                .filter(|g| g.fract() == 0.0 && g.abs() < i64::MAX as f64)
                .ok_or_else(|| PipelineError::parse(MEMORY_GROUP_COLUMN, row, group.to_string()))?
                as i64;
            let score = values[score_idx]
                .to_f64()
                .ok_or_else(|| PipelineError::parse(SCORE_COLUMN, row, values[score_idx].to_string()))?;
            let kept = keep.iter().map(|&i| values[i].clone()).collect();
            rows.push(OptimumRow::new(memory_group, score, kept));
        }

        Self::new(columns, rows)
    }
}

/// Pick the highest-scoring row of every bucket and decode it to labels.
///
/// Ties go to the row seen first in input order: a later row only replaces
/// the current best when its score is strictly greater. Output columns are
/// the input columns up to `Norm_Energy`.
pub fn select_optima(buckets: &Buckets<'_>, codec: &CodecTable) -> PipelineResult<OptimumTable> {
    let columns = buckets.columns();
    let cutoff = columns
        .iter()
        .position(|c| c == NORM_ENERGY)
        .ok_or_else(|| PipelineError::schema(NORM_ENERGY))?;
    let kept_columns = &columns[..cutoff];

    let mut rows = Vec::with_capacity(buckets.len());
    for (memory_group, records) in buckets.iter() {
        let best = best_record(records).ok_or_else(|| {
            PipelineError::Internal(format!("memory group {} has no rows", memory_group))
        })?;
        let values = codec.decode_row(kept_columns, &best.values[..cutoff], best.position)?;

        tracing::debug!(memory_group, score = best.score, row = best.position, "selected bucket optimum");
        rows.push(OptimumRow::new(memory_group, best.score, values));
    }

    OptimumTable::new(kept_columns.to_vec(), rows)
}

fn best_record<'r, 'a>(records: &'r [ScoredRecord<'a>]) -> Option<&'r ScoredRecord<'a>> {
    records.iter().fold(None, |best, candidate| match best {
        Some(current) if candidate.score <= current.score => Some(current),
        _ => Some(candidate),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record(position: usize, score: f64, values: &[Value]) -> ScoredRecord<'_> {
        ScoredRecord {
            position,
            memory_mb: 0.0,
            score,
            values,
        }
    }

    #[test]
    fn test_best_record_prefers_first_on_tie() {
        let cells = [Value::Missing];
        let records = [
            record(0, 0.5, &cells),
            record(1, 0.7, &cells),
            record(2, 0.7, &cells),
            record(3, 0.2, &cells),
        ];
        assert_eq!(best_record(&records).unwrap().position, 1);

        let flat = [record(0, 0.4, &cells), record(1, 0.4, &cells), record(2, 0.4, &cells)];
        assert_eq!(best_record(&flat).unwrap().position, 0);
    }

    #[test]
    fn test_empty_bucket_is_internal_error() {
        let columns = vec!["Backend".to_string(), NORM_ENERGY.to_string()];
        let mut groups = BTreeMap::new();
        groups.insert(2000, Vec::new());
        let buckets = Buckets {
            columns: &columns,
            groups,
        };

        assert!(matches!(
            select_optima(&buckets, &CodecTable::default()),
            Err(PipelineError::Internal(_))
        ));
    }

    #[test]
    fn test_duplicate_groups_rejected() {
        let rows = vec![
            OptimumRow::new(1000, 0.5, vec![]),
            OptimumRow::new(1000, 0.6, vec![]),
        ];
        assert!(matches!(
            OptimumTable::new(vec![], rows),
            Err(PipelineError::Schema { .. })
        ));
    }

    #[test]
    fn test_rows_sorted_by_group() {
        let rows = vec![
            OptimumRow::new(3000, 0.1, vec![Value::from("c")]),
            OptimumRow::new(0, 0.2, vec![Value::from("a")]),
            OptimumRow::new(1000, 0.3, vec![Value::from("b")]),
        ];
        let table = OptimumTable::new(vec!["Backend".to_string()], rows).unwrap();
        assert_eq!(table.memory_groups().collect::<Vec<_>>(), vec![0, 1000, 3000]);
        assert_eq!(table.get(1000).unwrap().values(), [Value::from("b")]);
        assert!(table.get(2000).is_none());
    }

    #[test]
    fn test_dataset_layout_round_trip() {
        let table = OptimumTable::new(
            vec!["Memory (MB)".to_string(), "Backend".to_string()],
            vec![OptimumRow::new(1000, 0.42, vec![Value::from("1500"), Value::from("pytorch")])],
        )
        .unwrap();

        let dataset = table.to_dataset().unwrap();
        assert_eq!(
            dataset.columns(),
            ["Memory (MB)", "Backend", MEMORY_GROUP_COLUMN, SCORE_COLUMN]
        );
        assert_eq!(OptimumTable::from_dataset(dataset).unwrap(), table);
    }

    #[test]
    fn test_from_dataset_tolerates_repeated_group_column() {
        let dataset = Dataset::from_rows(
            vec![
                MEMORY_GROUP_COLUMN.to_string(),
                "Backend".to_string(),
                MEMORY_GROUP_COLUMN.to_string(),
                SCORE_COLUMN.to_string(),
            ],
            vec![vec![
                Value::from("2000.0"),
                Value::from("onnxruntime"),
                Value::from("2000.0"),
                Value::from("0.61"),
            ]],
        )
        .unwrap();

        let table = OptimumTable::from_dataset(dataset).unwrap();
        assert_eq!(table.columns(), ["Backend"]);
        assert_eq!(table.rows()[0].memory_group(), 2000);
        assert_eq!(table.rows()[0].score(), 0.61);
    }

    #[test]
    fn test_from_dataset_rejects_fractional_group() {
        let dataset = Dataset::from_rows(
            vec![MEMORY_GROUP_COLUMN.to_string(), SCORE_COLUMN.to_string()],
            vec![vec![Value::from("1500.5"), Value::from("0.3")]],
        )
        .unwrap();
        assert!(matches!(
            OptimumTable::from_dataset(dataset),
            Err(PipelineError::Parse { .. })
        ));
    }
}
