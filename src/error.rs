//! Error taxonomy for the scoring pipeline
//!
//! Every core operation returns [`PipelineError`] so callers can match on the
//! exact failure. The CLI wraps these in `anyhow` with file-level context.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("column '{column}': {reason}")]
    Schema { column: String, reason: String },

    #[error("invalid value '{value}' in column '{column}' (row {row})")]
    Parse {
        column: String,
        row: usize,
        value: String,
    },

    #[error("code {code} is out of range for '{field}' ({len} labels)")]
    UnknownCode {
        field: String,
        code: usize,
        len: usize,
    },

    #[error("label '{label}' was not seen while fitting '{field}'")]
    UnknownLabel { field: String, label: String },

    #[error("optimum table is empty, no bucket to recommend from")]
    EmptyTable,

    #[error("internal invariant violated: {0}")]
    Internal(String),
}

impl PipelineError {
    /// A required column is absent.
    pub(crate) fn schema(column: impl Into<String>) -> Self {
        Self::schema_with(column, "required column is missing")
    }

    pub(crate) fn schema_with(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Schema {
            column: column.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn parse(column: impl Into<String>, row: usize, value: impl Into<String>) -> Self {
        Self::Parse {
            column: column.into(),
            row,
            value: value.into(),
        }
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
