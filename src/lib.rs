//! Energy-Performance optimization for LLM inference configurations
//!
//! Scores benchmarked inference configurations (backend, precision,
//! quantization, attention, kernel) by a composite Energy-Performance metric,
//! keeps the best configuration of every 1000 MB memory bucket, and recommends
//! that optimum for new configurations.
//!
//! ## Main Components
//!
//! - `codec`: Reversible ordinal encoding of categorical fields
//! - `scorer`: Min-max normalization and the weighted composite score
//! - `optimizer`: Memory bucketing and per-bucket optimum selection
//! - `recommender`: Bucket lookup with nearest-bucket fallback
//! - `pipeline`: All stages in one call
//! - `data`: Tabular model and CSV boundary
//! - `config`: Configuration management

pub mod codec;
pub mod config;
pub mod data;
pub mod error;
pub mod optimizer;
pub mod pipeline;
pub mod recommender;
pub mod scorer;

pub use codec::{decode, fit_encode, CodecEntry, CodecTable};
pub use config::Config;
pub use data::{Dataset, Record, Value};
pub use error::{PipelineError, PipelineResult};
pub use optimizer::{bucket_key, bucketize, select_optima, OptimumTable};
pub use pipeline::{Pipeline, PipelineOutput};
pub use recommender::{recommend, MatchKind, Recommendation, Recommender};
pub use scorer::{normalize, score, NormalizedDataset, ScoredDataset, Scorer};

/// Library errors
pub use anyhow::{Error, Result};
