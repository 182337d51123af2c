//! Energy-Performance scoring
//!
//! Rescales energy efficiency, accuracy, parameter count and memory footprint
//! to [0, 1] over the current dataset, then combines three of them into the
//! composite score:
//!
//! ```text
//! score = 0.34 * norm_energy + 0.33 * norm_llm_score + 0.33 * norm_memory
//! ```
//!
//! Memory is a cost, so its normalized value is inverted (`1 - x`): the
//! smallest footprint in the dataset scores 1.0.

use crate::config::{ColumnConfig, ScoringConfig};
use crate::data::table::is_empty_row;
use crate::data::{Dataset, Value};
use crate::error::{PipelineError, PipelineResult};
use crate::optimizer::bucket_key;

pub const ENERGY_WEIGHT: f64 = 0.34;
pub const LLM_SCORE_WEIGHT: f64 = 0.33;
pub const MEMORY_WEIGHT: f64 = 0.33;

pub const NORM_ENERGY: &str = "Norm_Energy";
pub const NORM_LLM_SCORE: &str = "Norm_LLM_Score";
pub const NORM_PARAMS: &str = "Norm_Params";
pub const NORM_MEMORY: &str = "Norm_Memory";
pub const SCORE_COLUMN: &str = "Energy_Performance_Score";

/// Marker some leaderboard exports append to estimated accuracy scores
pub const SCORE_MARKER: char = '*';

/// Normalized scoring inputs for one row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedFeatures {
    /// Raw memory footprint, kept for bucketing
    pub memory_mb: f64,
    pub norm_energy: f64,
    pub norm_llm_score: f64,
    pub norm_params: f64,
    /// Already inverted: 1.0 is the smallest footprint
    pub norm_memory: f64,
}

impl NormalizedFeatures {
    pub fn energy_performance_score(&self) -> f64 {
        self.norm_energy * ENERGY_WEIGHT
            + self.norm_llm_score * LLM_SCORE_WEIGHT
            + self.norm_memory * MEMORY_WEIGHT
    }
}

/// Dataset with the four `Norm_*` columns appended
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDataset {
    table: Dataset,
    features: Vec<NormalizedFeatures>,
}

impl NormalizedDataset {
    pub fn table(&self) -> &Dataset {
        &self.table
    }

    pub fn features(&self) -> &[NormalizedFeatures] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// One scored row, borrowed from a [`ScoredDataset`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredRecord<'a> {
    /// Row position in the scored dataset
    pub position: usize,
    pub memory_mb: f64,
    pub score: f64,
    pub values: &'a [Value],
}

/// Dataset with the normalization block and `Energy_Performance_Score`
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDataset {
    table: Dataset,
    memory_mb: Vec<f64>,
    scores: Vec<f64>,
}

impl ScoredDataset {
    /// Rebuild a scored dataset from a table written by an earlier run.
    ///
    /// The table must carry the normalization block and the score column.
    /// All-empty rows are dropped the same way [`Scorer::normalize`] does.
    pub fn from_dataset(mut table: Dataset, columns: &ColumnConfig) -> PipelineResult<Self> {
        table.require_column(NORM_ENERGY)?;
        let score_idx = table.require_column(SCORE_COLUMN)?;
        let memory_idx = table.require_column(&columns.memory)?;
        table.drop_empty_rows();

        let mut memory_mb = Vec::with_capacity(table.len());
        let mut scores = Vec::with_capacity(table.len());
        for (row, values) in table.rows().iter().enumerate() {
            memory_mb.push(parse_memory(&values[memory_idx], &columns.memory, row)?);
            scores.push(parse_number(&values[score_idx], SCORE_COLUMN, row)?);
        }

        Ok(Self {
            table,
            memory_mb,
            scores,
        })
    }

    pub fn table(&self) -> &Dataset {
        &self.table
    }

    pub fn into_table(self) -> Dataset {
        self.table
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn memory_mb(&self) -> &[f64] {
        &self.memory_mb
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Rows in input order
    pub fn records(&self) -> impl Iterator<Item = ScoredRecord<'_>> {
        self.table
            .rows()
            .iter()
            .zip(self.memory_mb.iter().zip(&self.scores))
            .enumerate()
            .map(|(position, (values, (&memory_mb, &score)))| ScoredRecord {
                position,
                memory_mb,
                score,
                values,
            })
    }
}

#[derive(Debug, Clone, Copy)]
struct MinMax {
    min: f64,
    max: f64,
}

impl MinMax {
    fn fit(values: impl Iterator<Item = f64>) -> Option<Self> {
        values.fold(None, |acc, v| match acc {
            None => Some(Self { min: v, max: v }),
            Some(m) => Some(Self {
                min: m.min.min(v),
                max: m.max.max(v),
            }),
        })
    }

    /// Map `value` into [0, 1]; a constant column maps to `constant`.
    fn scale(&self, value: f64, constant: f64) -> f64 {
        let range = self.max - self.min;
        if range > 0.0 {
            (value - self.min) / range
        } else {
            constant
        }
    }
}

/// Parsed numeric inputs of one row, before normalization
#[derive(Debug, Clone, Copy)]
struct RawFeatures {
    memory_mb: f64,
    energy: f64,
    llm_score: f64,
    params: f64,
}

/// Normalizes and scores benchmark datasets
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    columns: ColumnConfig,
    scoring: ScoringConfig,
}

impl Scorer {
    pub fn new(columns: ColumnConfig, scoring: ScoringConfig) -> Self {
        Self { columns, scoring }
    }

    /// Drop all-empty rows, parse the four numeric source columns and append
    /// their min-max normalized values.
    ///
    /// The accuracy column may carry a trailing `*`, which is stripped before
    /// parsing. Any other non-numeric or missing value in a kept row is a
    /// [`PipelineError::Parse`]. Rows are reported by their position in the
    /// incoming dataset.
    pub fn normalize(&self, dataset: Dataset) -> PipelineResult<NormalizedDataset> {
        let cols = &self.columns;
        let memory_idx = dataset.require_column(&cols.memory)?;
        let energy_idx = dataset.require_column(&cols.energy)?;
        let llm_idx = dataset.require_column(&cols.llm_score)?;
        let params_idx = dataset.require_column(&cols.params)?;

        let mut raw = Vec::with_capacity(dataset.len());
        for (row, values) in dataset.rows().iter().enumerate() {
            if is_empty_row(values) {
                continue;
            }
            raw.push(RawFeatures {
                memory_mb: parse_memory(&values[memory_idx], &cols.memory, row)?,
                energy: parse_number(&values[energy_idx], &cols.energy, row)?,
                llm_score: parse_marked_score(&values[llm_idx], &cols.llm_score, row)?,
                params: parse_number(&values[params_idx], &cols.params, row)?,
            });
        }

        let mut table = dataset;
        let dropped = table.drop_empty_rows();
        if dropped > 0 {
            tracing::info!(dropped, "dropped all-empty rows");
        }
        if raw.len() != table.len() {
            return Err(PipelineError::Internal(format!(
                "parsed {} rows but kept {}",
                raw.len(),
                table.len()
            )));
        }

        let constant = self.scoring.constant_column_value;
        let energy = MinMax::fit(raw.iter().map(|r| r.energy));
        let llm = MinMax::fit(raw.iter().map(|r| r.llm_score));
        let params = MinMax::fit(raw.iter().map(|r| r.params));
        let memory = MinMax::fit(raw.iter().map(|r| r.memory_mb));

        for (name, range) in [
            (&cols.energy, energy),
            (&cols.llm_score, llm),
            (&cols.params, params),
            (&cols.memory, memory),
        ] {
            if let Some(r) = range.filter(|r| r.max == r.min) {
                tracing::warn!(
                    column = name.as_str(),
                    value = r.min,
                    constant,
                    "constant column, using fixed normalized value"
                );
            }
        }

        let features: Vec<NormalizedFeatures> = match (energy, llm, params, memory) {
            (Some(energy), Some(llm), Some(params), Some(memory)) => raw
                .iter()
                .map(|r| NormalizedFeatures {
                    memory_mb: r.memory_mb,
                    norm_energy: energy.scale(r.energy, constant),
                    norm_llm_score: llm.scale(r.llm_score, constant),
                    norm_params: params.scale(r.params, constant),
                    norm_memory: 1.0 - memory.scale(r.memory_mb, constant),
                })
                .collect(),
            _ => Vec::new(),
        };

        let column = |f: fn(&NormalizedFeatures) -> f64| -> Vec<Value> {
            features.iter().map(|n| Value::Number(f(n))).collect()
        };
        table.push_column(NORM_ENERGY, column(|n| n.norm_energy))?;
        table.push_column(NORM_LLM_SCORE, column(|n| n.norm_llm_score))?;
        table.push_column(NORM_PARAMS, column(|n| n.norm_params))?;
        table.push_column(NORM_MEMORY, column(|n| n.norm_memory))?;

        tracing::debug!(rows = features.len(), "normalized dataset");
        Ok(NormalizedDataset { table, features })
    }
}

/// Normalize with the default column names and constant-column policy.
pub fn normalize(dataset: Dataset) -> PipelineResult<NormalizedDataset> {
    Scorer::default().normalize(dataset)
}

/// Append `Energy_Performance_Score` to a normalized dataset.
pub fn score(normalized: NormalizedDataset) -> ScoredDataset {
    let NormalizedDataset {
        mut table,
        features,
    } = normalized;

    let scores: Vec<f64> = features
        .iter()
        .map(NormalizedFeatures::energy_performance_score)
        .collect();
    let memory_mb = features.iter().map(|f| f.memory_mb).collect();

    table.extend_column(SCORE_COLUMN, scores.iter().map(|&s| Value::Number(s)));

    ScoredDataset {
        table,
        memory_mb,
        scores,
    }
}

fn parse_number(value: &Value, column: &str, row: usize) -> PipelineResult<f64> {
    value
        .to_f64()
        .ok_or_else(|| PipelineError::parse(column, row, value.to_string()))
}

/// A memory footprint must map to a representable bucket key.
fn parse_memory(value: &Value, column: &str, row: usize) -> PipelineResult<f64> {
    let memory_mb = parse_number(value, column, row)?;
    match bucket_key(memory_mb) {
        Some(_) => Ok(memory_mb),
        None => Err(PipelineError::parse(column, row, value.to_string())),
    }
}

/// Strip the trailing estimate marker, then parse.
fn parse_marked_score(value: &Value, column: &str, row: usize) -> PipelineResult<f64> {
    match value {
        Value::Text(text) => {
            let cleaned = text.trim().trim_end_matches(SCORE_MARKER).trim_end();
            cleaned
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| PipelineError::parse(column, row, text.clone()))
        }
        other => parse_number(other, column, row),
    }
}
