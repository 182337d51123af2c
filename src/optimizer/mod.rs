//! Memory-bucketed optimum selection
//!
//! Scored configurations are grouped into 1000 MB memory buckets and the
//! best-scoring configuration of each bucket is kept as that bucket's
//! reference answer.

pub mod bucket;
pub mod optimum;

pub use bucket::{bucket_key, bucketize, Buckets, BUCKET_WIDTH_MB};
pub use optimum::{select_optima, OptimumRow, OptimumTable, MEMORY_GROUP_COLUMN};
