//! Recommendation lookup against a precomputed optimum table
//!
//! A query is mapped to its memory bucket with the same formula the optimizer
//! used. If that bucket has an optimum it is returned as-is; otherwise the
//! bucket closest to the query's bucket wins, with equidistant buckets
//! resolved toward the smaller key.

use crate::config::ColumnConfig;
use crate::data::{Dataset, Record};
use crate::error::{PipelineError, PipelineResult};
use crate::optimizer::{bucket_key, OptimumRow, OptimumTable};
use serde::Serialize;
use serde_json::json;

/// How a recommendation was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// The query's own bucket had an optimum
    Exact,
    /// Fallback to the nearest populated bucket
    Nearest,
}

/// Result of a recommendation query
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub query_memory_group: i64,
    pub memory_group: i64,
    pub match_kind: MatchKind,
    /// The optimum table row, unchanged
    pub record: Record,
}

impl Recommendation {
    pub fn is_exact(&self) -> bool {
        self.match_kind == MatchKind::Exact
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "query_memory_group": self.query_memory_group,
            "memory_group": self.memory_group,
            "match": self.match_kind,
            "recommendation": self.record,
        })
    }

    /// The matched row as a one-row table in the optimum-table layout.
    pub fn to_dataset(&self) -> PipelineResult<Dataset> {
        let (columns, values) = self.record.fields().iter().cloned().unzip();
        Dataset::from_rows(columns, vec![values])
    }
}

/// Looks up recommendations in one optimum table
#[derive(Debug, Clone)]
pub struct Recommender<'a> {
    table: &'a OptimumTable,
    memory_column: String,
}

impl<'a> Recommender<'a> {
    /// Reads the memory column named by [`ColumnConfig::default`].
    pub fn new(table: &'a OptimumTable) -> Self {
        Self {
            table,
            memory_column: ColumnConfig::default().memory,
        }
    }

    pub fn with_memory_column(mut self, memory_column: impl Into<String>) -> Self {
        self.memory_column = memory_column.into();
        self
    }

    /// Recommend the optimum for the query's memory bucket.
    pub fn recommend(&self, query: &Record) -> PipelineResult<Recommendation> {
        let memory = query
            .get(&self.memory_column)
            .ok_or_else(|| PipelineError::schema(self.memory_column.as_str()))?;
        let memory_mb = memory
            .to_f64()
            .ok_or_else(|| PipelineError::parse(self.memory_column.as_str(), 0, memory.to_string()))?;

        self.recommend_for_memory(memory_mb)
    }

    /// Recommend directly from a memory footprint in MB.
    ///
    /// A footprint whose bucket key does not fit in an `i64` is a
    /// [`PipelineError::Parse`] on the memory column.
    pub fn recommend_for_memory(&self, memory_mb: f64) -> PipelineResult<Recommendation> {
        let query_memory_group = bucket_key(memory_mb)
            .ok_or_else(|| PipelineError::parse(self.memory_column.as_str(), 0, memory_mb.to_string()))?;

        let (row, match_kind) = match self.table.get(query_memory_group) {
            Some(row) => (row, MatchKind::Exact),
            None => (
                nearest_row(self.table.rows(), query_memory_group).ok_or(PipelineError::EmptyTable)?,
                MatchKind::Nearest,
            ),
        };

        tracing::debug!(
            memory_mb,
            query_memory_group,
            memory_group = row.memory_group(),
            ?match_kind,
            "resolved recommendation"
        );

        Ok(Recommendation {
            query_memory_group,
            memory_group: row.memory_group(),
            match_kind,
            record: self.table.record(row),
        })
    }
}

/// Recommend using the default memory column.
pub fn recommend(query: &Record, table: &OptimumTable) -> PipelineResult<Recommendation> {
    Recommender::new(table).recommend(query)
}

/// Row whose bucket is closest to `target`; ties go to the smaller bucket.
fn nearest_row(rows: &[OptimumRow], target: i64) -> Option<&OptimumRow> {
    rows.iter()
        .min_by_key(|row| (row.memory_group().abs_diff(target), row.memory_group()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;

    fn table(groups: &[i64]) -> OptimumTable {
        let rows = groups
            .iter()
            .map(|&g| OptimumRow::new(g, 0.5, vec![Value::from(format!("config-{}", g))]))
            .collect();
        OptimumTable::new(vec!["Backend".to_string()], rows).unwrap()
    }

    #[test]
    fn test_nearest_prefers_smaller_key_on_tie() {
        let t = table(&[0, 2000]);
        assert_eq!(nearest_row(t.rows(), 1000).unwrap().memory_group(), 0);
        assert_eq!(nearest_row(t.rows(), 3000).unwrap().memory_group(), 2000);
        assert!(nearest_row(&[], 1000).is_none());
    }

    #[test]
    fn test_exact_match_from_memory() {
        let t = table(&[0, 1000, 5000]);
        let rec = Recommender::new(&t).recommend_for_memory(1999.0).unwrap();
        assert!(rec.is_exact());
        assert_eq!(rec.memory_group, 1000);
        assert_eq!(rec.record.get("Backend"), Some(&Value::from("config-1000")));
    }

    #[test]
    fn test_custom_memory_column() {
        let t = table(&[3000]);
        let query = Record::new().with("mem_mb", 3500.0);
        let rec = Recommender::new(&t)
            .with_memory_column("mem_mb")
            .recommend(&query)
            .unwrap();
        assert_eq!(rec.memory_group, 3000);
    }

    #[test]
    fn test_default_memory_column_follows_config() {
        let t = table(&[2000]);
        let query = Record::new().with(ColumnConfig::default().memory, 2400.0);
        assert_eq!(recommend(&query, &t).unwrap().memory_group, 2000);
    }

    #[test]
    fn test_query_without_memory_is_schema_error() {
        let t = table(&[0]);
        let query = Record::new().with("Backend", "pytorch");
        assert!(matches!(
            recommend(&query, &t),
            Err(PipelineError::Schema { .. })
        ));

        let query = Record::new().with("Memory (MB)", "lots");
        assert!(matches!(recommend(&query, &t), Err(PipelineError::Parse { .. })));
    }

    #[test]
    fn test_json_shape() {
        let t = table(&[0, 2000]);
        let rec = Recommender::new(&t).recommend_for_memory(1500.0).unwrap();
        let json = rec.to_json();
        assert_eq!(json["match"], "nearest");
        assert_eq!(json["query_memory_group"], 1000);
        assert_eq!(json["memory_group"], 0);
        assert_eq!(json["recommendation"]["Backend"], "config-0");
        assert_eq!(json["recommendation"]["Memory Group"], 0.0);
    }

    #[test]
    fn test_flat_row_matches_optimum_layout() {
        let t = table(&[0, 2000]);
        let rec = Recommender::new(&t).recommend_for_memory(2500.0).unwrap();
        let row = rec.to_dataset().unwrap();

        assert_eq!(row.columns(), t.to_dataset().unwrap().columns());
        assert_eq!(row.len(), 1);
        assert_eq!(
            row.rows()[0],
            [Value::from("config-2000"), Value::Number(2000.0), Value::Number(0.5)]
        );
    }
}
